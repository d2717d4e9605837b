//! Health check endpoint for service monitoring.

use crate::{db::DbPool, error::AppError, realtime::EventHub};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,

    /// Database connection status
    pub database: String,

    /// Clients currently attached to the realtime feed
    pub realtime_subscribers: usize,

    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "realtime_subscribers": 3,
///   "version": "0.1.0",
///   "timestamp": "2026-10-19T19:00:00Z"
/// }
/// ```
///
/// If the database is unreachable the standard 500 error body is returned.
pub async fn health_check(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        realtime_subscribers: events.subscriber_count(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    }))
}
