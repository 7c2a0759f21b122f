//! Typed access to the gateway admin routes.

use std::sync::Arc;

use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::api::Envelope;
use crate::api::models::api_keys::{ApiKey, ApiKeyRequest, ApiKeyStatus, ApiKeyStatusUpdate};
use crate::api::models::instances::{Instance, InstanceFilter};
use crate::api::models::monitoring::{
    InstanceMetrics, ObservationFilter, ObservationOverview, TimeRange, TimeSeries,
};
use crate::api::models::projects::{Project, ProjectOption};
use crate::errors::{Error, Result};
use crate::http::{HttpClient, HttpRequest};

/// Which generation of monitoring routes the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringApi {
    /// `/admin/observation/*`, filtered by time window
    #[default]
    Observation,
    /// `/admin/monitoring/*`, filtered by project and status only
    Monitoring,
}

impl MonitoringApi {
    pub fn overview_path(&self) -> &'static str {
        match self {
            MonitoringApi::Observation => "/admin/observation/overview",
            MonitoringApi::Monitoring => "/admin/monitoring/overview",
        }
    }

    pub fn instances_path(&self) -> &'static str {
        match self {
            MonitoringApi::Observation => "/admin/observation/instances",
            MonitoringApi::Monitoring => "/admin/monitoring/instances",
        }
    }
}

pub const TIMESERIES_PATH: &str = "/admin/monitoring/timeseries";

/// Client for the admin API.
///
/// Every method issues exactly one request and unwraps the response envelope. A `null`
/// payload on success becomes the type's empty value.
pub struct AdminClient<H: HttpClient> {
    http: Arc<H>,
    monitoring_api: MonitoringApi,
}

impl<H: HttpClient> Clone for AdminClient<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            monitoring_api: self.monitoring_api,
        }
    }
}

impl<H: HttpClient> AdminClient<H> {
    pub fn new(http: Arc<H>, monitoring_api: MonitoringApi) -> Self {
        Self { http, monitoring_api }
    }

    pub fn monitoring_api(&self) -> MonitoringApi {
        self.monitoring_api
    }

    async fn call<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<Option<T>> {
        let response = self.http.execute(&request).await?;

        if !response.is_success() {
            return Err(Error::Http {
                status: response.status,
                body: response.body,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&response.body)?;
        envelope.into_result()
    }

    async fn fetch<T: DeserializeOwned + Default>(&self, request: HttpRequest) -> Result<T> {
        Ok(self.call::<T>(request).await?.unwrap_or_default())
    }

    async fn command(&self, request: HttpRequest) -> Result<()> {
        self.call::<IgnoredAny>(request).await.map(|_| ())
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.fetch(HttpRequest::get("/admin/projects")).await
    }

    pub async fn list_project_options(&self) -> Result<Vec<ProjectOption>> {
        self.fetch(HttpRequest::get("/admin/projects/simple")).await
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.command(HttpRequest::new(Method::DELETE, format!("/admin/projects/{project_id}")))
            .await
    }

    pub async fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        self.fetch(HttpRequest::get("/admin/apikeys")).await
    }

    pub async fn create_api_key(&self, body: &ApiKeyRequest) -> Result<()> {
        let request =
            HttpRequest::new(Method::POST, "/admin/apikeys").with_body(serde_json::to_value(body)?);
        self.command(request).await
    }

    pub async fn update_api_key(&self, api_key_id: &str, body: &ApiKeyRequest) -> Result<()> {
        let request = HttpRequest::new(Method::PUT, format!("/admin/apikeys/{api_key_id}"))
            .with_body(serde_json::to_value(body)?);
        self.command(request).await
    }

    pub async fn set_api_key_status(&self, api_key_id: &str, status: ApiKeyStatus) -> Result<()> {
        let body = serde_json::to_value(ApiKeyStatusUpdate { status })?;
        let request = HttpRequest::new(Method::PUT, format!("/admin/apikeys/{api_key_id}/status"))
            .with_body(body);
        self.command(request).await
    }

    pub async fn delete_api_key(&self, api_key_id: &str) -> Result<()> {
        self.command(HttpRequest::new(Method::DELETE, format!("/admin/apikeys/{api_key_id}")))
            .await
    }

    pub async fn list_instances(&self, filter: &InstanceFilter) -> Result<Vec<Instance>> {
        self.fetch(HttpRequest::get("/admin/instances/with-projects").with_query(filter.query()))
            .await
    }

    pub async fn observation_overview(
        &self,
        filter: &ObservationFilter,
    ) -> Result<ObservationOverview> {
        let query = match self.monitoring_api {
            MonitoringApi::Observation => filter.observation_query(),
            MonitoringApi::Monitoring => filter.monitoring_query(false),
        };
        self.fetch(HttpRequest::get(self.monitoring_api.overview_path()).with_query(query))
            .await
    }

    pub async fn observation_instances(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<InstanceMetrics>> {
        let query = match self.monitoring_api {
            MonitoringApi::Observation => filter.observation_query(),
            MonitoringApi::Monitoring => filter.monitoring_query(true),
        };
        self.fetch(HttpRequest::get(self.monitoring_api.instances_path()).with_query(query))
            .await
    }

    pub async fn time_series(
        &self,
        range: TimeRange,
        project_id: Option<&str>,
    ) -> Result<TimeSeries> {
        let mut query = vec![("timeRange", range.as_str().to_string())];
        if let Some(project_id) = project_id.filter(|id| !id.is_empty()) {
            query.push(("projectId", project_id.to_string()));
        }
        self.fetch(HttpRequest::get(TIMESERIES_PATH).with_query(query)).await
    }
}
