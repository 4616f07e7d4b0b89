// src/actuator.rs

//! HTTP probes for orchestrators: liveness backed by a store round-trip, and
//! static build info.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::store::LedgerStore;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct Info {
    name: &'static str,
    version: &'static str,
}

pub fn actuator_router(store: Arc<dyn LedgerStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .with_state(store)
}

async fn health(State(store): State<Arc<dyn LedgerStore>>) -> (StatusCode, Json<Health>) {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health { status: "UP" })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health { status: "DOWN" }))
        }
    }
}

async fn info() -> Json<Info> {
    Json(Info {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
