//! Venue profile HTTP handlers.
//!
//! - PUT /api/v1/venues/me - Create or update the caller's venue profile
//! - GET /api/v1/venues - List venues (optional `city`, `venue_type` filters)
//! - GET /api/v1/venues/{id} - Get one venue

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        profile::{validate_name, validate_profile_url, validate_socials},
        user::Role,
        venue::{UpsertVenueRequest, Venue, VenueFilter},
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use uuid::Uuid;

/// Create or update the caller's venue profile.
///
/// # Endpoint
///
/// `PUT /api/v1/venues/me`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "The Brudenell",
///   "city": "Leeds",
///   "capacity": 400,
///   "venue_type": "club",
///   "socials": { "instagram": "https://instagram.com/brudenell" }
/// }
/// ```
///
/// # Errors
///
/// - **403**: caller is not a venue
/// - **400**: empty name, bad URL, negative capacity
pub async fn upsert_me(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpsertVenueRequest>,
) -> Result<Json<Venue>, AppError> {
    auth.require_role(Role::Venue)?;
    validate_name(&request.name)?;
    validate_profile_url("image_url", &request.image_url)?;
    validate_profile_url("website_url", &request.website_url)?;
    validate_socials(&request.socials)?;
    if request.capacity.is_some_and(|c| c < 0) {
        return Err(AppError::InvalidRequest(
            "capacity must not be negative".to_string(),
        ));
    }

    let completeness = request.completeness();

    let venue = sqlx::query_as::<_, Venue>(
        r#"
        INSERT INTO venues (
            id, name, city, address, capacity, venue_type, description,
            image_url, website_url, socials, profile_completeness
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            city = EXCLUDED.city,
            address = EXCLUDED.address,
            capacity = EXCLUDED.capacity,
            venue_type = EXCLUDED.venue_type,
            description = EXCLUDED.description,
            image_url = EXCLUDED.image_url,
            website_url = EXCLUDED.website_url,
            socials = EXCLUDED.socials,
            profile_completeness = EXCLUDED.profile_completeness,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(request.name.trim())
    .bind(&request.city)
    .bind(&request.address)
    .bind(request.capacity)
    .bind(&request.venue_type)
    .bind(&request.description)
    .bind(&request.image_url)
    .bind(&request.website_url)
    .bind(request.socials.clone().unwrap_or_else(|| json!({})))
    .bind(completeness.to_json())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Venue profile {} saved ({}% complete)",
        venue.id,
        completeness.percent
    );

    Ok(Json(venue))
}

pub async fn list_venues(
    State(pool): State<DbPool>,
    Query(filter): Query<VenueFilter>,
) -> Result<Json<Vec<Venue>>, AppError> {
    let venues = sqlx::query_as::<_, Venue>(
        r#"
        SELECT * FROM venues
        WHERE ($1::text IS NULL OR city ILIKE $1)
          AND ($2::text IS NULL OR venue_type ILIKE $2)
        ORDER BY name
        "#,
    )
    .bind(&filter.city)
    .bind(&filter.venue_type)
    .fetch_all(&pool)
    .await?;

    Ok(Json(venues))
}

pub async fn get_venue(
    State(pool): State<DbPool>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<Venue>, AppError> {
    let venue = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
        .bind(venue_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::VenueNotFound)?;

    Ok(Json(venue))
}
