//! Status labels, severity styles and health classification.

use serde::{Deserialize, Serialize};

use crate::api::models::api_keys::ApiKeyStatus;
use crate::api::models::instances::InstanceStatus;
use crate::api::models::monitoring::{GatewayStatus, InstanceMetrics};
use crate::api::models::projects::ProjectStatus;

/// Tag style of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Warning,
    Danger,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Info => "info",
        }
    }
}

/// Display mapping of a backend status enum.
pub trait StatusDisplay {
    fn label(&self) -> &'static str;
    fn severity(&self) -> Severity;
}

impl StatusDisplay for ProjectStatus {
    fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::Inactive => "Inactive",
            ProjectStatus::Unknown => "Unknown",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            ProjectStatus::Active => Severity::Success,
            ProjectStatus::Inactive => Severity::Danger,
            ProjectStatus::Unknown => Severity::Info,
        }
    }
}

impl StatusDisplay for ApiKeyStatus {
    fn label(&self) -> &'static str {
        match self {
            ApiKeyStatus::Active => "Active",
            ApiKeyStatus::Revoked => "Revoked",
            ApiKeyStatus::Expired => "Expired",
            ApiKeyStatus::Unused => "Unused",
            ApiKeyStatus::Unknown => "Unknown",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            ApiKeyStatus::Active => Severity::Success,
            ApiKeyStatus::Revoked => Severity::Danger,
            ApiKeyStatus::Expired => Severity::Warning,
            ApiKeyStatus::Unused | ApiKeyStatus::Unknown => Severity::Info,
        }
    }
}

impl StatusDisplay for InstanceStatus {
    fn label(&self) -> &'static str {
        match self {
            InstanceStatus::Active => "Active",
            InstanceStatus::Inactive => "Inactive",
            InstanceStatus::Maintenance => "Maintenance",
            InstanceStatus::Deprecated => "Deprecated",
            InstanceStatus::Unknown => "Unknown",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            InstanceStatus::Active => Severity::Success,
            InstanceStatus::Inactive | InstanceStatus::Maintenance => Severity::Warning,
            InstanceStatus::Deprecated => Severity::Danger,
            InstanceStatus::Unknown => Severity::Info,
        }
    }
}

impl StatusDisplay for GatewayStatus {
    fn label(&self) -> &'static str {
        match self {
            GatewayStatus::Healthy => "Healthy",
            GatewayStatus::Degraded => "Degraded",
            GatewayStatus::Faulty => "Faulty",
            GatewayStatus::CircuitBreakerOpen => "Circuit open",
            GatewayStatus::Unknown => "Unknown",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            GatewayStatus::Healthy => Severity::Success,
            GatewayStatus::Degraded => Severity::Warning,
            GatewayStatus::Faulty | GatewayStatus::CircuitBreakerOpen => Severity::Danger,
            GatewayStatus::Unknown => Severity::Info,
        }
    }
}

/// Three-level health used for metric colouring and instance cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Health {
    Healthy,
    Degraded,
    Critical,
}

impl Health {
    pub fn css_class(&self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::Degraded => "warning",
            Health::Critical => "critical",
        }
    }

    pub fn text_class(&self) -> &'static str {
        match self {
            Health::Healthy => "text-success",
            Health::Degraded => "text-warning",
            Health::Critical => "text-danger",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Health::Healthy => "#67c23a",
            Health::Degraded => "#e6a23c",
            Health::Critical => "#f56c6c",
        }
    }
}

/// Cut-offs between healthy, degraded and critical metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    /// Success rate (percent) at or above which an instance is healthy
    pub success_healthy: f64,
    /// Success rate (percent) at or above which an instance is degraded rather than critical
    pub success_degraded: f64,
    /// Latency (ms) at or below which an instance is healthy
    pub latency_healthy_ms: f64,
    /// Latency (ms) at or below which an instance is degraded rather than critical
    pub latency_degraded_ms: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            success_healthy: 95.0,
            success_degraded: 85.0,
            latency_healthy_ms: 500.0,
            latency_degraded_ms: 2000.0,
        }
    }
}

impl SeverityThresholds {
    pub fn classify_success_rate(&self, rate: f64) -> Health {
        if rate >= self.success_healthy {
            Health::Healthy
        } else if rate >= self.success_degraded {
            Health::Degraded
        } else {
            Health::Critical
        }
    }

    pub fn classify_latency(&self, latency_ms: f64) -> Health {
        if latency_ms <= self.latency_healthy_ms {
            Health::Healthy
        } else if latency_ms <= self.latency_degraded_ms {
            Health::Degraded
        } else {
            Health::Critical
        }
    }

    /// Overall health of a monitoring row. An open circuit breaker is always critical;
    /// otherwise the worse of the two metrics wins. Missing metrics do not count against
    /// the instance.
    pub fn classify_instance(&self, instance: &InstanceMetrics) -> Health {
        if instance.gateway_status == GatewayStatus::CircuitBreakerOpen {
            return Health::Critical;
        }

        let success = instance
            .success_rate
            .map(|rate| self.classify_success_rate(rate))
            .unwrap_or(Health::Healthy);
        let latency = instance
            .average_latency
            .map(|latency| self.classify_latency(latency))
            .unwrap_or(Health::Healthy);

        success.max(latency)
    }
}
