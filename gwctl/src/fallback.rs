//! Datasets shown when a list load fails.
//!
//! The console keeps rendering something useful when the backend is unreachable: a read
//! loader that fails substitutes the provider's data for its resource. The provider is
//! injected into the view-model, so strict hosts can use [`EmptyFallback`] and tests can
//! supply their own.

use crate::api::models::api_keys::{ApiKey, ApiKeyStatus};
use crate::api::models::instances::{Instance, InstanceStatus};
use crate::api::models::monitoring::{InstanceMetrics, ObservationOverview, TimeSeries};
use crate::api::models::parse_timestamp;
use crate::api::models::projects::{Project, ProjectOption, ProjectStatus};

/// The resource types the console loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Projects,
    ProjectOptions,
    ApiKeys,
    Instances,
    ObservationOverview,
    ObservationInstances,
    TimeSeries,
}

impl Resource {
    pub const COUNT: usize = 7;

    pub const ALL: [Resource; Self::COUNT] = [
        Resource::Projects,
        Resource::ProjectOptions,
        Resource::ApiKeys,
        Resource::Instances,
        Resource::ObservationOverview,
        Resource::ObservationInstances,
        Resource::TimeSeries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Projects => "projects",
            Resource::ProjectOptions => "project_options",
            Resource::ApiKeys => "api_keys",
            Resource::Instances => "instances",
            Resource::ObservationOverview => "observation_overview",
            Resource::ObservationInstances => "observation_instances",
            Resource::TimeSeries => "time_series",
        }
    }

    /// Position in [`Resource::ALL`], used to index per-resource tables.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Generic message shown when loading this resource fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Resource::Projects => "Failed to load projects",
            Resource::ProjectOptions => "Failed to load project list",
            Resource::ApiKeys => "Failed to load API keys",
            Resource::Instances => "Failed to load instances",
            Resource::ObservationOverview => "Failed to load monitoring overview",
            Resource::ObservationInstances => "Failed to load monitoring data",
            Resource::TimeSeries => "Failed to load chart data",
        }
    }
}

/// Source of substitute data for failed read loads.
///
/// Every method defaults to an empty dataset.
pub trait FallbackData: Send + Sync {
    fn projects(&self) -> Vec<Project> {
        Vec::new()
    }

    fn project_options(&self) -> Vec<ProjectOption> {
        self.projects().iter().map(ProjectOption::from).collect()
    }

    fn api_keys(&self) -> Vec<ApiKey> {
        Vec::new()
    }

    fn instances(&self) -> Vec<Instance> {
        Vec::new()
    }

    fn observation_overview(&self) -> ObservationOverview {
        ObservationOverview::default()
    }

    fn observation_instances(&self) -> Vec<InstanceMetrics> {
        Vec::new()
    }

    fn time_series(&self) -> TimeSeries {
        TimeSeries::default()
    }
}

/// Provider that substitutes nothing: failed loads leave empty lists behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyFallback;

impl FallbackData for EmptyFallback {}

/// Fixed demo dataset: two projects, two API keys and two instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFallback;

impl FallbackData for StaticFallback {
    fn projects(&self) -> Vec<Project> {
        vec![
            Project {
                id: "proj_001".to_string(),
                name: "Demo Project".to_string(),
                description: Some("Demo project".to_string()),
                status: ProjectStatus::Active,
                created_at: parse_timestamp("2024-01-15 10:00:00"),
            },
            Project {
                id: "proj_002".to_string(),
                name: "Test Project".to_string(),
                description: Some("Test project".to_string()),
                status: ProjectStatus::Inactive,
                created_at: parse_timestamp("2024-01-14 15:30:00"),
            },
        ]
    }

    fn api_keys(&self) -> Vec<ApiKey> {
        vec![
            ApiKey {
                id: "key_001".to_string(),
                api_key_value: "ak_test_1234567890abcdef1234567890abcdef".to_string(),
                description: Some("Test API key".to_string()),
                status: ApiKeyStatus::Active,
                expires_at: parse_timestamp("2024-12-31 23:59:59"),
                last_used_at: None,
                created_at: parse_timestamp("2024-01-15 10:00:00"),
            },
            ApiKey {
                id: "key_002".to_string(),
                api_key_value: "ak_demo_abcdef1234567890abcdef1234567890".to_string(),
                description: Some("Demo API key".to_string()),
                status: ApiKeyStatus::Revoked,
                expires_at: parse_timestamp("2024-06-30 23:59:59"),
                last_used_at: None,
                created_at: parse_timestamp("2024-01-14 15:30:00"),
            },
        ]
    }

    fn instances(&self) -> Vec<Instance> {
        let instance = |business_id: &str, api_type: &str, status| Instance {
            id: None,
            business_id: business_id.to_string(),
            project_id: Some("proj_001".to_string()),
            project_name: Some("Demo Project".to_string()),
            api_identifier: None,
            api_type: api_type.to_string(),
            status,
        };

        vec![
            instance("biz_001", "REST", InstanceStatus::Active),
            instance("biz_002", "GraphQL", InstanceStatus::Inactive),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_dataset_has_two_of_each() {
        let fallback = StaticFallback;
        assert_eq!(fallback.projects().len(), 2);
        assert_eq!(fallback.api_keys().len(), 2);
        assert_eq!(fallback.instances().len(), 2);
        assert_eq!(
            fallback.api_keys().iter().filter(|key| key.status == ApiKeyStatus::Active).count(),
            1
        );
    }

    #[test]
    fn project_options_follow_projects() {
        let options = StaticFallback.project_options();
        assert_eq!(options[0].id, "proj_001");
        assert_eq!(options[1].name, "Test Project");
    }

    #[test]
    fn empty_fallback_is_empty() {
        let fallback = EmptyFallback;
        assert!(fallback.projects().is_empty());
        assert!(fallback.project_options().is_empty());
        assert!(fallback.time_series().is_empty());
        assert_eq!(fallback.observation_overview(), ObservationOverview::default());
    }

    #[test]
    fn resource_indices_match_table_order() {
        for (i, resource) in Resource::ALL.iter().enumerate() {
            assert_eq!(resource.index(), i);
        }
    }
}
