//! Direct offer handlers.
//!
//! - POST /api/v1/offers - Venue sends an offer to an artist
//! - GET /api/v1/offers - Offers sent or received by the caller
//! - POST /api/v1/offers/{id}/accept - Artist accepts; a booking is created
//! - POST /api/v1/offers/{id}/decline - Artist declines
//! - POST /api/v1/offers/{id}/withdraw - Venue withdraws

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        booking::BookingResponse,
        offer::{CreateOfferRequest, Offer},
    },
    realtime::EventHub,
    services::offer_service::{self, OfferResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Result of accepting an offer: the updated offer and the booking it produced.
#[derive(Debug, Serialize)]
pub struct AcceptedOfferResponse {
    pub offer: Offer,
    pub booking: BookingResponse,
}

pub async fn create_offer(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<Offer>), AppError> {
    let offer = offer_service::create_offer(&pool, &events, &auth, request).await?;

    Ok((StatusCode::CREATED, Json(offer)))
}

pub async fn list_offers(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Offer>>, AppError> {
    Ok(Json(offer_service::list_offers(&pool, auth.user_id).await?))
}

/// Accept a pending offer.
///
/// The booking is created at the offered fee, in the same transaction that
/// marks the offer accepted. If the date was taken in the meantime the offer
/// stays pending and **409** `date_unavailable` is returned.
pub async fn accept_offer(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<AcceptedOfferResponse>, AppError> {
    let (offer, booking) = offer_service::accept_offer(
        &pool,
        &events,
        &auth,
        offer_id,
        config.platform_fee_percent,
    )
    .await?;

    Ok(Json(AcceptedOfferResponse {
        offer,
        booking: BookingResponse::for_viewer(booking, auth.user_id),
    }))
}

pub async fn decline_offer(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<Offer>, AppError> {
    let offer =
        offer_service::respond_to_offer(&pool, &events, &auth, offer_id, OfferResponse::Decline)
            .await?;

    Ok(Json(offer))
}

pub async fn withdraw_offer(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<Offer>, AppError> {
    let offer =
        offer_service::respond_to_offer(&pool, &events, &auth, offer_id, OfferResponse::Withdraw)
            .await?;

    Ok(Json(offer))
}
