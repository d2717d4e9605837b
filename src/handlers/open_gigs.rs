//! Open gig board handlers.
//!
//! - POST /api/v1/gigs - Venue posts a gig
//! - GET /api/v1/gigs - Browse open gigs (`genre`, `from`)
//! - GET /api/v1/gigs/{id}
//! - POST /api/v1/gigs/{id}/applications - Artist applies
//! - GET /api/v1/gigs/{id}/applications - Venue reviews applicants
//! - POST /api/v1/gigs/{id}/applications/{application_id}/accept - Venue picks an artist
//! - POST /api/v1/gigs/{id}/close - Venue closes the gig unfilled
//! - GET /api/v1/applications - The calling artist's applications

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        booking::BookingResponse,
        offer::{ApplyToGigRequest, CreateOpenGigRequest, GigApplication, OpenGig, OpenGigFilter},
        user::Role,
    },
    realtime::EventHub,
    services::offer_service,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Result of accepting an application: the filled gig and its booking.
#[derive(Debug, Serialize)]
pub struct FilledGigResponse {
    pub gig: OpenGig,
    pub booking: BookingResponse,
}

pub async fn create_gig(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateOpenGigRequest>,
) -> Result<(StatusCode, Json<OpenGig>), AppError> {
    let gig = offer_service::create_open_gig(&pool, &auth, request).await?;

    Ok((StatusCode::CREATED, Json(gig)))
}

/// Open gigs from `from` (default today), soonest first.
pub async fn list_gigs(
    State(pool): State<DbPool>,
    Query(filter): Query<OpenGigFilter>,
) -> Result<Json<Vec<OpenGig>>, AppError> {
    Ok(Json(offer_service::list_open_gigs(&pool, &filter).await?))
}

pub async fn get_gig(
    State(pool): State<DbPool>,
    Path(gig_id): Path<Uuid>,
) -> Result<Json<OpenGig>, AppError> {
    Ok(Json(offer_service::get_open_gig(&pool, gig_id).await?))
}

pub async fn apply(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Path(gig_id): Path<Uuid>,
    Json(request): Json<ApplyToGigRequest>,
) -> Result<(StatusCode, Json<GigApplication>), AppError> {
    let application = offer_service::apply_to_gig(&pool, &events, &auth, gig_id, request).await?;

    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn list_applications(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(gig_id): Path<Uuid>,
) -> Result<Json<Vec<GigApplication>>, AppError> {
    Ok(Json(
        offer_service::list_applications(&pool, &auth, gig_id).await?,
    ))
}

/// Accept one application.
///
/// # Endpoint
///
/// `POST /api/v1/gigs/{id}/applications/{application_id}/accept`
///
/// Books the artist at the proposed fee (or the gig budget), marks the gig
/// filled and rejects every other pending application, all in one transaction.
pub async fn accept_application(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    Path((gig_id, application_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FilledGigResponse>, AppError> {
    let (gig, booking) = offer_service::accept_application(
        &pool,
        &events,
        &auth,
        gig_id,
        application_id,
        config.platform_fee_percent,
    )
    .await?;

    Ok(Json(FilledGigResponse {
        gig,
        booking: BookingResponse::for_viewer(booking, auth.user_id),
    }))
}

pub async fn close_gig(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Path(gig_id): Path<Uuid>,
) -> Result<Json<OpenGig>, AppError> {
    Ok(Json(
        offer_service::close_gig(&pool, &events, &auth, gig_id).await?,
    ))
}

pub async fn my_applications(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<GigApplication>>, AppError> {
    auth.require_role(Role::Artist)?;

    Ok(Json(
        offer_service::list_my_applications(&pool, auth.user_id).await?,
    ))
}
