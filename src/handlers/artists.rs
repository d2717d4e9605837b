//! Artist profile HTTP handlers.
//!
//! - PUT /api/v1/artists/me - Create or update the caller's artist profile
//! - GET /api/v1/artists - List artists (optional `city`, `genre` filters)
//! - GET /api/v1/artists/{id} - Get one artist
//! - GET /api/v1/artists/{id}/availability - Booked dates and special prices in a range

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        artist::{Artist, ArtistFilter, AvailabilityQuery, AvailabilityResponse, PricedDate, UpsertArtistRequest},
        profile::{validate_name, validate_profile_url, validate_socials},
        user::Role,
    },
    services::booking_service,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

/// Longest range an availability lookup may cover.
const MAX_AVAILABILITY_DAYS: i64 = 366;

/// Create or update the caller's artist profile.
///
/// # Endpoint
///
/// `PUT /api/v1/artists/me`
///
/// The profile id is the caller's user id. `profile_completeness` is recomputed
/// on every write. `booked_dates` is never written here.
pub async fn upsert_me(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpsertArtistRequest>,
) -> Result<Json<Artist>, AppError> {
    auth.require_role(Role::Artist)?;
    validate_name(&request.name)?;
    validate_profile_url("image_url", &request.image_url)?;
    validate_profile_url("website_url", &request.website_url)?;
    validate_socials(&request.socials)?;
    booking_service::validate_fee_cents(request.base_fee_cents, "base_fee_cents")?;

    let completeness = request.completeness();

    let artist = sqlx::query_as::<_, Artist>(
        r#"
        INSERT INTO artists (
            id, name, genre, bio, city, base_fee_cents, image_url, website_url,
            socials, technical_requirements, profile_completeness
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            genre = EXCLUDED.genre,
            bio = EXCLUDED.bio,
            city = EXCLUDED.city,
            base_fee_cents = EXCLUDED.base_fee_cents,
            image_url = EXCLUDED.image_url,
            website_url = EXCLUDED.website_url,
            socials = EXCLUDED.socials,
            technical_requirements = EXCLUDED.technical_requirements,
            profile_completeness = EXCLUDED.profile_completeness,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(request.name.trim())
    .bind(&request.genre)
    .bind(&request.bio)
    .bind(&request.city)
    .bind(request.base_fee_cents)
    .bind(&request.image_url)
    .bind(&request.website_url)
    .bind(request.socials.clone().unwrap_or_else(|| json!({})))
    .bind(request.technical_requirements.clone().unwrap_or_else(|| json!({})))
    .bind(completeness.to_json())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Artist profile {} saved ({}% complete)",
        artist.id,
        completeness.percent
    );

    Ok(Json(artist))
}

/// List artists, alphabetically. Filters match case-insensitively.
pub async fn list_artists(
    State(pool): State<DbPool>,
    Query(filter): Query<ArtistFilter>,
) -> Result<Json<Vec<Artist>>, AppError> {
    let artists = sqlx::query_as::<_, Artist>(
        r#"
        SELECT * FROM artists
        WHERE ($1::text IS NULL OR city ILIKE $1)
          AND ($2::text IS NULL OR genre ILIKE $2)
        ORDER BY name
        "#,
    )
    .bind(&filter.city)
    .bind(&filter.genre)
    .fetch_all(&pool)
    .await?;

    Ok(Json(artists))
}

pub async fn get_artist(
    State(pool): State<DbPool>,
    Path(artist_id): Path<Uuid>,
) -> Result<Json<Artist>, AppError> {
    let artist = sqlx::query_as::<_, Artist>("SELECT * FROM artists WHERE id = $1")
        .bind(artist_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::ArtistNotFound)?;

    Ok(Json(artist))
}

/// Availability of an artist between `from` and `to` (inclusive).
///
/// # Endpoint
///
/// `GET /api/v1/artists/{id}/availability?from=2026-11-01&to=2026-11-30`
///
/// # Response
///
/// ```json
/// {
///   "artist_id": "550e8400-...",
///   "base_fee_cents": 45000,
///   "booked_dates": ["2026-11-12", "2026-11-20"],
///   "special_prices": [{ "date": "2026-11-28", "price_cents": 60000 }]
/// }
/// ```
pub async fn get_availability(
    State(pool): State<DbPool>,
    Path(artist_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if query.to < query.from {
        return Err(AppError::InvalidRequest(
            "`to` must not be before `from`".to_string(),
        ));
    }
    if (query.to - query.from).num_days() > MAX_AVAILABILITY_DAYS {
        return Err(AppError::InvalidRequest(format!(
            "Range must not exceed {MAX_AVAILABILITY_DAYS} days"
        )));
    }

    let (base_fee_cents, booked_dates): (i64, Vec<String>) =
        sqlx::query_as("SELECT base_fee_cents, booked_dates FROM artists WHERE id = $1")
            .bind(artist_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::ArtistNotFound)?;

    let special_prices = sqlx::query_as::<_, (NaiveDate, i64)>(
        r#"
        SELECT price_date, price_cents FROM special_prices
        WHERE artist_id = $1 AND price_date BETWEEN $2 AND $3
        ORDER BY price_date
        "#,
    )
    .bind(artist_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .map(|(date, price_cents)| PricedDate { date, price_cents })
    .collect();

    Ok(Json(AvailabilityResponse {
        artist_id,
        base_fee_cents,
        booked_dates: booked_dates_in_range(&booked_dates, query.from, query.to),
        special_prices,
    }))
}

/// Parse stored booked dates, keep those in `from..=to`, sorted.
///
/// Entries that do not parse as `YYYY-MM-DD` are skipped.
fn booked_dates_in_range(booked: &[String], from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = booked
        .iter()
        .filter_map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .filter(|date| *date >= from && *date <= to)
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booked_dates_are_filtered_to_range() {
        let booked = vec![
            "2026-11-30".to_string(),
            "2026-10-31".to_string(),
            "2026-11-01".to_string(),
            "garbage".to_string(),
            "2026-12-01".to_string(),
        ];
        let from = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 11, 30).unwrap();

        assert_eq!(
            booked_dates_in_range(&booked, from, to),
            vec![from, to]
        );
    }
}
