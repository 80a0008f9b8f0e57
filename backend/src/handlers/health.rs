//! Liveness endpoint for deploy checks and load balancers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Health report; `status` degrades when the database cannot be reached
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "reachable",
        Err(_) => "unreachable",
    };

    Json(HealthResponse {
        status: if database == "reachable" {
            "ok"
        } else {
            "degraded"
        },
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
