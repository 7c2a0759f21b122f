//! API instance records as listed by `/admin/instances/with-projects`.

use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::types::{BusinessId, ProjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Active,
    Inactive,
    Maintenance,
    Deprecated,
    #[default]
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Active => "ACTIVE",
            InstanceStatus::Inactive => "INACTIVE",
            InstanceStatus::Maintenance => "MAINTENANCE",
            InstanceStatus::Deprecated => "DEPRECATED",
            InstanceStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub business_id: BusinessId,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub api_identifier: Option<String>,
    /// Free text: the backend enum (`MODEL`, `PAYMENT_GATEWAY`, ...) is not closed from the
    /// console's point of view.
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: InstanceStatus,
}

/// Filter form of the instances view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceFilter {
    pub project_id: Option<ProjectId>,
    pub status: Option<InstanceStatus>,
}

impl InstanceFilter {
    /// Query parameters for `/admin/instances/with-projects`. Unset fields are omitted.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(project_id) = self.project_id.as_deref().filter(|id| !id.is_empty()) {
            query.push(("projectId", project_id.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }
}
