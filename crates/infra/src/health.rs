//! Process health checking: environment, store reachability, control plane.

use serde::Serialize;

use crate::control_plane::ControlPlaneClient;
use crate::store::StorePing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    pub environment: bool,
    pub database: bool,
    pub control_plane: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checks: HealthChecks,
    pub errors: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Run all health checks and fold them into one report.
///
/// `missing_env` comes from [`crate::AppConfig::missing_env`]; the store and
/// control-plane probes are best-effort with their own short timeouts.
pub async fn run_health_check(
    missing_env: &[&str],
    store: &dyn StorePing,
    control_plane: &ControlPlaneClient,
) -> HealthReport {
    let mut errors = Vec::new();

    let environment = missing_env.is_empty();
    if !environment {
        errors.push(format!(
            "Missing environment variables: {}",
            missing_env.join(", ")
        ));
    }

    let database = match store.ping().await {
        Ok(()) => true,
        Err(err) => {
            errors.push(format!("Database connection failed: {err}"));
            false
        }
    };

    let control_plane = match control_plane.health().await {
        Ok(()) => true,
        Err(err) => {
            errors.push(format!("Control plane connection failed: {err}"));
            false
        }
    };

    HealthReport {
        status: if errors.is_empty() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        },
        checks: HealthChecks {
            environment,
            database,
            control_plane,
        },
        errors,
    }
}
