//! Read loaders: one per resource, plus the dashboard and monitoring joins.

use std::future::Future;

use chrono::Local;

use super::state::{DashboardStats, Notice, ViewState};
use super::ViewModel;
use crate::charts::ChartSurface;
use crate::errors::Result;
use crate::fallback::{FallbackData, Resource};
use crate::http::HttpClient;

impl<H: HttpClient + 'static, S: ChartSurface + 'static> ViewModel<H, S> {
    /// Run one read request for `resource`.
    ///
    /// On success the payload replaces the field. On failure the error is logged and
    /// surfaced as a notice, and the fallback dataset is applied instead. Responses that
    /// were overtaken by a newer request for the same resource are dropped without a trace.
    /// Returns whether the request succeeded and was applied.
    async fn load<T, Fut>(
        &self,
        resource: Resource,
        fetch: Fut,
        fallback: impl FnOnce(&dyn FallbackData) -> T,
        apply: impl FnOnce(&mut ViewState, T),
    ) -> Result<bool>
    where
        Fut: Future<Output = Result<T>>,
    {
        let ticket = self.update(|store| {
            store.view.set_loading(resource, true);
            store.tickets.issue(resource)
        });

        let outcome = fetch.await;

        self.update(|store| {
            if !store.tickets.is_current(&ticket) {
                tracing::debug!(
                    resource = ticket.resource().as_str(),
                    "Discarding superseded response"
                );
                return Ok(false);
            }

            store.view.set_loading(resource, false);
            match outcome {
                Ok(data) => {
                    apply(&mut store.view, data);
                    Ok(true)
                }
                Err(error) => {
                    error.log(resource.as_str());
                    let message = error.user_message(resource.failure_message());
                    store.push_notice(Notice::error(message));
                    apply(&mut store.view, fallback(self.inner.fallback.as_ref()));
                    Err(error)
                }
            }
        })
    }

    pub async fn load_projects(&self) -> Result<bool> {
        self.load(
            Resource::Projects,
            self.inner.client.list_projects(),
            |fallback| fallback.projects(),
            |view, projects| view.projects = projects,
        )
        .await
    }

    pub async fn load_project_options(&self) -> Result<bool> {
        self.load(
            Resource::ProjectOptions,
            self.inner.client.list_project_options(),
            |fallback| fallback.project_options(),
            |view, options| view.project_options = options,
        )
        .await
    }

    pub async fn load_api_keys(&self) -> Result<bool> {
        self.load(
            Resource::ApiKeys,
            self.inner.client.list_api_keys(),
            |fallback| fallback.api_keys(),
            |view, api_keys| view.api_keys = api_keys,
        )
        .await
    }

    pub async fn load_instances(&self) -> Result<bool> {
        let filter = self.read(|view| view.instance_filter.clone());
        self.load(
            Resource::Instances,
            self.inner.client.list_instances(&filter),
            |fallback| fallback.instances(),
            |view, instances| view.instances = instances,
        )
        .await
    }

    pub async fn load_observation_overview(&self) -> Result<bool> {
        let filter = self.read(|view| view.observation_filter.clone());
        self.load(
            Resource::ObservationOverview,
            self.inner.client.observation_overview(&filter),
            |fallback| fallback.observation_overview(),
            |view, overview| view.observation_overview = overview,
        )
        .await
    }

    pub async fn load_observation_instances(&self) -> Result<bool> {
        let filter = self.read(|view| view.observation_filter.clone());
        self.load(
            Resource::ObservationInstances,
            self.inner.client.observation_instances(&filter),
            |fallback| fallback.observation_instances(),
            |view, rows| view.observation_instances = rows,
        )
        .await
    }

    /// Load the chart series and redraw all three charts from whatever was applied, the
    /// fallback series included. Superseded responses leave the charts alone.
    pub async fn load_time_series(&self) -> Result<bool> {
        let (range, project_id) =
            self.read(|view| (view.time_range, view.observation_filter.project_id.clone()));
        let outcome = self
            .load(
                Resource::TimeSeries,
                self.inner.client.time_series(range, project_id.as_deref()),
                |fallback| fallback.time_series(),
                |view, series| view.time_series = series,
            )
            .await;

        // `load` only errors after applying the fallback
        if !matches!(outcome, Ok(false)) {
            self.render_charts();
        }
        outcome
    }

    fn render_charts(&self) {
        let series = self.read(|view| view.time_series.clone());
        let drawn = self.inner.charts.render_all(&series);
        tracing::debug!(drawn, points = series.call_volume.len(), "Charts rendered");
    }

    /// Overview, instance rows and chart series, loaded concurrently.
    pub async fn load_monitoring(&self) -> Result<()> {
        let (overview, rows, series) = futures::join!(
            self.load_observation_overview(),
            self.load_observation_instances(),
            self.load_time_series()
        );

        overview?;
        rows?;
        series?;

        self.update(|store| store.view.last_refreshed_at = Some(Local::now().naive_local()));
        Ok(())
    }

    /// Projects, API keys and instances, loaded concurrently, then the dashboard counters.
    ///
    /// The counters are only recomputed when all three loads succeeded; otherwise whatever
    /// partial data arrived stays visible and a single dashboard notice is added.
    pub async fn load_dashboard(&self) -> Result<()> {
        let epoch = self.inner.store.lock().tickets.epoch();

        let (projects, api_keys, instances) =
            futures::join!(self.load_projects(), self.load_api_keys(), self.load_instances());

        let outcome = projects.and(api_keys).and(instances);
        self.update(|store| {
            if store.tickets.epoch() != epoch {
                tracing::debug!("View changed during dashboard load, skipping counters");
                return;
            }
            match &outcome {
                Ok(_) => {
                    let view = &mut store.view;
                    view.dashboard_stats =
                        DashboardStats::from_lists(&view.projects, &view.api_keys, &view.instances);
                }
                Err(_) => store.push_notice(Notice::error("Failed to load dashboard data")),
            }
        });

        outcome.map(|_| ())
    }
}
