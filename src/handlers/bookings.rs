//! Booking HTTP handlers.
//!
//! - POST /api/v1/bookings - Book one or more dates (venue)
//! - GET /api/v1/bookings - The caller's bookings (all bookings for admins)
//! - GET /api/v1/bookings/{id} - One booking
//! - POST /api/v1/bookings/{id}/check-in - Confirm presence with the PIN (artist)
//! - POST /api/v1/bookings/{id}/cancel - Cancel and free the date
//! - POST /api/v1/bookings/{id}/payout - Mark the artist as paid (admin)
//!
//! The confirmation PIN is included only in responses to the booking's venue.

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::booking::{BookingFilter, BookingResponse, CheckInRequest, CreateBookingRequest},
    realtime::EventHub,
    services::booking_service,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

/// Book an artist for one or more dates.
///
/// # Endpoint
///
/// `POST /api/v1/bookings`
///
/// # Request Body
///
/// ```json
/// {
///   "artist_id": "550e8400-...",
///   "dates": ["2026-11-20", "2026-11-21"],
///   "notes": "Two sets, 45 minutes each"
/// }
/// ```
///
/// # Response (201 Created)
///
/// One booking per date, each with its own PIN and fee.
///
/// # Errors
///
/// - **403**: caller is not a venue
/// - **404**: artist or venue profile missing
/// - **409** `date_unavailable`: any requested date is taken; nothing is booked
pub async fn create_bookings(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Vec<BookingResponse>>), AppError> {
    let bookings = booking_service::create_bookings(
        &pool,
        &events,
        &auth,
        request,
        config.platform_fee_percent,
    )
    .await?;

    let responses = bookings
        .into_iter()
        .map(|booking| BookingResponse::for_viewer(booking, auth.user_id))
        .collect();

    Ok((StatusCode::CREATED, Json(responses)))
}

/// List bookings, by event date. Supports `status`, `from` and `to` filters.
pub async fn list_bookings(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let rows = booking_service::list_enriched_bookings(&pool, &auth, &filter).await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| BookingResponse::enriched_for_viewer(row, auth.user_id))
            .collect(),
    ))
}

pub async fn get_booking(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let row = booking_service::get_enriched_booking(&pool, &auth, booking_id).await?;

    Ok(Json(BookingResponse::enriched_for_viewer(row, auth.user_id)))
}

/// Confirm the artist's presence at the event.
///
/// # Endpoint
///
/// `POST /api/v1/bookings/{id}/check-in`
///
/// ```json
/// { "pin": "4821" }
/// ```
///
/// # Errors
///
/// - **400**: PIN is not four digits
/// - **422** `invalid_pin`: PIN does not match
/// - **422** `invalid_state`: booking is cancelled
pub async fn check_in(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = booking_service::confirm_presence(
        &pool,
        &events,
        &auth,
        booking_id,
        &request.pin,
        config.referral_reward_cents,
    )
    .await?;

    Ok(Json(BookingResponse::for_viewer(booking, auth.user_id)))
}

pub async fn cancel_booking(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = booking_service::cancel_booking(&pool, &events, &auth, booking_id).await?;

    Ok(Json(BookingResponse::for_viewer(booking, auth.user_id)))
}

/// Record the artist payout for a checked-in booking (admin).
pub async fn mark_payout(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = booking_service::mark_payout(
        &pool,
        &events,
        &auth,
        booking_id,
        config.platform_fee_percent,
    )
    .await?;

    Ok(Json(BookingResponse::for_viewer(booking, auth.user_id)))
}
