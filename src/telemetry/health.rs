//! Component readiness aggregation (spec §4.9: "healthy only if Store
//! reports the vector index online and Vectorizer passes a self-test
//! embedding"), grounded on `graph_vector_service.py::health_check`'s
//! healthy/degraded/unhealthy triage.

use crate::app::AppState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: Status,
    pub store_online: bool,
    pub vector_index_online: bool,
    pub vectorizer_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Run the vectorizer self-test embed and ask the store for its health,
/// then triage: both ok → `Healthy`; store reachable but vector index
/// offline, or vectorizer failing → `Degraded`; store unreachable →
/// `Unhealthy`.
pub async fn check(state: &AppState) -> HealthReport {
    let vectorizer_ready = state.vectorizer.encode("health check probe").await.is_ok();

    match state.store.health().await {
        Ok(store_health) => {
            let status = if vectorizer_ready && store_health.vector_index_online {
                Status::Healthy
            } else {
                Status::Degraded
            };
            HealthReport {
                status,
                store_online: store_health.online,
                vector_index_online: store_health.vector_index_online,
                vectorizer_ready,
                detail: None,
            }
        }
        Err(e) => HealthReport {
            status: Status::Unhealthy,
            store_online: false,
            vector_index_online: false,
            vectorizer_ready,
            detail: Some(e.to_string()),
        },
    }
}
