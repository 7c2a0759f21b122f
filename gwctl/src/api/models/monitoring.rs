//! Monitoring and observation records.
//!
//! The backend exposes two generations of monitoring routes (`/admin/observation/*` and
//! `/admin/monitoring/*`) with slightly different field names. The records here accept both
//! spellings so the rest of the console deals with a single shape.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::instances::InstanceStatus;
use super::{lenient_datetime, null_as_default};
use crate::types::{BusinessId, ProjectId};

/// Health of an instance as derived by the gateway from reported call results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayStatus {
    Healthy,
    Degraded,
    Faulty,
    CircuitBreakerOpen,
    #[default]
    #[serde(other)]
    Unknown,
}

impl GatewayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayStatus::Healthy => "HEALTHY",
            GatewayStatus::Degraded => "DEGRADED",
            GatewayStatus::Faulty => "FAULTY",
            GatewayStatus::CircuitBreakerOpen => "CIRCUIT_BREAKER_OPEN",
            GatewayStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Aggregation window of the observation routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::OneMinute => "1m",
            TimeWindow::TenMinutes => "10m",
            TimeWindow::ThirtyMinutes => "30m",
            TimeWindow::OneHour => "1h",
            TimeWindow::SixHours => "6h",
            TimeWindow::OneDay => "24h",
        }
    }
}

/// Span covered by the time-series charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::OneDay => "24h",
            TimeRange::SevenDays => "7d",
        }
    }
}

/// Aggregate counters for the monitoring header cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationOverview {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_instances: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub healthy_instances: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_instances: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub faulty_instances: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub circuit_breaker_instances: u64,
    #[serde(default, alias = "totalCalls", deserialize_with = "null_as_default")]
    pub total_call_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_success_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_latency: f64,
}

/// One row of the monitoring table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetrics {
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_id: BusinessId,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub api_identifier: Option<String>,
    #[serde(default)]
    pub api_type: Option<String>,
    #[serde(default, alias = "instanceStatus", deserialize_with = "null_as_default")]
    pub status: InstanceStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gateway_status: GatewayStatus,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub average_latency: Option<f64>,
    #[serde(default)]
    pub concurrency: Option<i64>,
    #[serde(default, alias = "callCount")]
    pub recent_calls: Option<i64>,
    #[serde(default, alias = "lastActiveTime", with = "lenient_datetime")]
    pub last_reported_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub cost_per_unit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

/// The three parallel series behind the monitoring charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default, deserialize_with = "null_as_default")]
    pub call_volume: Vec<TimePoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub success_rate: Vec<TimePoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latency: Vec<TimePoint>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.call_volume.is_empty() && self.success_rate.is_empty() && self.latency.is_empty()
    }
}

/// Filter form of the monitoring view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    pub time_window: TimeWindow,
    pub project_id: Option<ProjectId>,
    pub instance_status: Option<InstanceStatus>,
    pub gateway_status: Option<GatewayStatus>,
}

impl ObservationFilter {
    fn project(&self) -> Option<&str> {
        self.project_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Parameters for `/admin/observation/*`. `timeWindow` is always sent.
    pub fn observation_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("timeWindow", self.time_window.as_str().to_string())];
        if let Some(project_id) = self.project() {
            query.push(("projectId", project_id.to_string()));
        }
        if let Some(status) = self.instance_status {
            query.push(("instanceStatus", status.as_str().to_string()));
        }
        if let Some(status) = self.gateway_status {
            query.push(("gatewayStatus", status.as_str().to_string()));
        }
        query
    }

    /// Parameters for `/admin/monitoring/*`. The overview route only understands
    /// `projectId`; the instance route also filters on both statuses.
    pub fn monitoring_query(&self, include_status: bool) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(project_id) = self.project() {
            query.push(("projectId", project_id.to_string()));
        }
        if include_status {
            if let Some(status) = self.instance_status {
                query.push(("status", status.as_str().to_string()));
            }
            if let Some(status) = self.gateway_status {
                query.push(("gatewayStatus", status.as_str().to_string()));
            }
        }
        query
    }
}
