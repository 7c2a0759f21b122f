//! Plain data behind the console views.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::api::models::api_keys::{ApiKey, ApiKeyDraft, ApiKeyEdit, ApiKeyStatus};
use crate::api::models::instances::{Instance, InstanceFilter};
use crate::api::models::monitoring::{
    InstanceMetrics, ObservationFilter, ObservationOverview, TimeRange, TimeSeries,
};
use crate::api::models::projects::{Project, ProjectOption};
use crate::fallback::Resource;
use crate::navigation::{Menu, NavigationState};

/// Most notices kept before the oldest are dropped.
pub const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Counters on the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_projects: usize,
    /// Only keys currently `ACTIVE`
    pub total_api_keys: usize,
    pub total_instances: usize,
}

impl DashboardStats {
    pub fn from_lists(projects: &[Project], api_keys: &[ApiKey], instances: &[Instance]) -> Self {
        Self {
            total_projects: projects.len(),
            total_api_keys: api_keys
                .iter()
                .filter(|key| key.status == ApiKeyStatus::Active)
                .count(),
            total_instances: instances.len(),
        }
    }
}

/// Columns the monitoring table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    BusinessId,
    ProjectName,
    SuccessRate,
    Latency,
    RecentCalls,
    Concurrency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationSort {
    pub key: SortKey,
    pub order: SortOrder,
}

/// Rows missing the value sort last in either direction.
fn compare_present<T>(
    a: Option<T>,
    b: Option<T>,
    order: SortOrder,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Ascending => cmp(&a, &b),
            SortOrder::Descending => cmp(&a, &b).reverse(),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl ObservationSort {
    fn compare(&self, a: &InstanceMetrics, b: &InstanceMetrics) -> Ordering {
        let order = self.order;
        match self.key {
            SortKey::BusinessId => {
                compare_present(Some(&a.business_id), Some(&b.business_id), order, |a, b| a.cmp(b))
            }
            SortKey::ProjectName => compare_present(
                a.project_name.as_ref(),
                b.project_name.as_ref(),
                order,
                |a, b| a.cmp(b),
            ),
            SortKey::SuccessRate => {
                compare_present(a.success_rate, b.success_rate, order, f64::total_cmp)
            }
            SortKey::Latency => {
                compare_present(a.average_latency, b.average_latency, order, f64::total_cmp)
            }
            SortKey::RecentCalls => {
                compare_present(a.recent_calls, b.recent_calls, order, i64::cmp)
            }
            SortKey::Concurrency => compare_present(a.concurrency, b.concurrency, order, i64::cmp),
        }
    }
}

/// Everything the views render.
///
/// List fields are only ever replaced as a whole. Loading flags are indexed by
/// [`Resource`] and are owned by the loaders.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub(crate) navigation: NavigationState,

    pub dashboard_stats: DashboardStats,

    pub projects: Vec<Project>,
    pub project_search: String,
    pub project_options: Vec<ProjectOption>,

    pub api_keys: Vec<ApiKey>,
    pub create_dialog_open: bool,
    pub new_api_key: ApiKeyDraft,
    pub edit_dialog_open: bool,
    pub editing_api_key: ApiKeyEdit,

    pub instances: Vec<Instance>,
    pub instance_filter: InstanceFilter,

    pub observation_overview: ObservationOverview,
    pub observation_instances: Vec<InstanceMetrics>,
    pub observation_filter: ObservationFilter,
    pub observation_sort: Option<ObservationSort>,
    pub time_series: TimeSeries,
    pub time_range: TimeRange,
    pub auto_refresh_paused: bool,
    pub last_refreshed_at: Option<NaiveDateTime>,

    loading: [bool; Resource::COUNT],
}

impl ViewState {
    pub fn active_menu(&self) -> Menu {
        self.navigation.active()
    }

    pub fn is_loading(&self, resource: Resource) -> bool {
        self.loading[resource.index()]
    }

    pub fn project_loading(&self) -> bool {
        self.is_loading(Resource::Projects)
    }

    pub fn api_key_loading(&self) -> bool {
        self.is_loading(Resource::ApiKeys)
    }

    pub fn instance_loading(&self) -> bool {
        self.is_loading(Resource::Instances)
    }

    pub fn observation_loading(&self) -> bool {
        self.is_loading(Resource::ObservationInstances)
    }

    pub(crate) fn set_loading(&mut self, resource: Resource, loading: bool) {
        self.loading[resource.index()] = loading;
    }

    pub(crate) fn clear_loading(&mut self) {
        self.loading = Default::default();
    }

    /// Drop the data of every view. Filters, dialogs and the active menu are kept.
    pub(crate) fn clear_view_data(&mut self) {
        self.projects = Vec::new();
        self.api_keys = Vec::new();
        self.instances = Vec::new();
        self.observation_instances = Vec::new();
        self.observation_overview = ObservationOverview::default();
        self.time_series = TimeSeries::default();
    }

    /// Projects whose name contains the search text, ignoring case.
    pub fn filtered_projects(&self) -> Vec<&Project> {
        let needle = self.project_search.trim().to_lowercase();
        self.projects
            .iter()
            .filter(|project| needle.is_empty() || project.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Monitoring rows in the current sort order, or in backend order when unsorted.
    pub fn sorted_observation_instances(&self) -> Vec<&InstanceMetrics> {
        let mut rows: Vec<&InstanceMetrics> = self.observation_instances.iter().collect();
        if let Some(sort) = self.observation_sort {
            rows.sort_by(|a, b| sort.compare(a, b));
        }
        rows
    }
}
