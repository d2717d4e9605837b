//! Manual gig and calendar handlers (artist only).
//!
//! - POST /api/v1/manual-gigs
//! - GET /api/v1/manual-gigs
//! - PUT /api/v1/manual-gigs/{id}
//! - DELETE /api/v1/manual-gigs/{id}
//! - GET /api/v1/calendar - Platform bookings and manual gigs merged by date

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        manual_gig::{CalendarEntry, CalendarQuery, ManualGig, ManualGigRequest},
        user::Role,
    },
    services::manual_gig_service,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Record a gig booked outside the platform. Its date becomes unavailable.
pub async fn create_manual_gig(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ManualGigRequest>,
) -> Result<(StatusCode, Json<ManualGig>), AppError> {
    auth.require_role(Role::Artist)?;
    let gig = manual_gig_service::create_gig(&pool, auth.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(gig)))
}

pub async fn list_manual_gigs(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ManualGig>>, AppError> {
    auth.require_role(Role::Artist)?;

    Ok(Json(manual_gig_service::list_gigs(&pool, auth.user_id).await?))
}

pub async fn update_manual_gig(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(gig_id): Path<Uuid>,
    Json(request): Json<ManualGigRequest>,
) -> Result<Json<ManualGig>, AppError> {
    auth.require_role(Role::Artist)?;
    let gig = manual_gig_service::update_gig(&pool, auth.user_id, gig_id, request).await?;

    Ok(Json(gig))
}

pub async fn delete_manual_gig(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(gig_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_role(Role::Artist)?;
    manual_gig_service::delete_gig(&pool, auth.user_id, gig_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// The caller's calendar.
///
/// # Endpoint
///
/// `GET /api/v1/calendar?from=2026-11-01&to=2026-11-30`
///
/// # Response
///
/// ```json
/// [
///   { "source": "platform", "event_date": "2026-11-20", "venue_name": "The Brudenell", "status": "confirmed", ... },
///   { "source": "manual", "event_date": "2026-11-28", "venue_name": "Village Hall", "status": "manual", ... }
/// ]
/// ```
///
/// Cancelled bookings are left out.
pub async fn get_calendar(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarEntry>>, AppError> {
    auth.require_role(Role::Artist)?;

    Ok(Json(
        manual_gig_service::calendar(&pool, auth.user_id, &query).await?,
    ))
}
