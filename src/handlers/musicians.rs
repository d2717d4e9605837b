//! Freelance musician directory.
//!
//! - PUT /api/v1/musicians/me
//! - GET /api/v1/musicians (`city`, `instrument`, `available_only`)
//! - GET /api/v1/musicians/{id}

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        musician::{Musician, MusicianFilter, UpsertMusicianRequest},
        profile::{validate_name, validate_profile_url, validate_socials},
        user::Role,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use uuid::Uuid;

/// Create or update the caller's musician profile. Instruments are stored lowercased.
pub async fn upsert_me(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpsertMusicianRequest>,
) -> Result<Json<Musician>, AppError> {
    auth.require_role(Role::Musician)?;
    validate_name(&request.name)?;
    validate_profile_url("image_url", &request.image_url)?;
    validate_socials(&request.socials)?;
    if request.hourly_rate_cents.is_some_and(|r| r < 0) {
        return Err(AppError::InvalidRequest(
            "hourly_rate_cents must not be negative".to_string(),
        ));
    }

    let completeness = request.completeness();

    let musician = sqlx::query_as::<_, Musician>(
        r#"
        INSERT INTO musicians (
            id, name, instruments, city, hourly_rate_cents, bio,
            image_url, socials, is_available, profile_completeness
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            instruments = EXCLUDED.instruments,
            city = EXCLUDED.city,
            hourly_rate_cents = EXCLUDED.hourly_rate_cents,
            bio = EXCLUDED.bio,
            image_url = EXCLUDED.image_url,
            socials = EXCLUDED.socials,
            is_available = EXCLUDED.is_available,
            profile_completeness = EXCLUDED.profile_completeness,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(request.name.trim())
    .bind(request.normalized_instruments())
    .bind(&request.city)
    .bind(request.hourly_rate_cents)
    .bind(&request.bio)
    .bind(&request.image_url)
    .bind(request.socials.clone().unwrap_or_else(|| json!({})))
    .bind(request.is_available)
    .bind(completeness.to_json())
    .fetch_one(&pool)
    .await?;

    tracing::info!("Musician profile {} saved", musician.id);

    Ok(Json(musician))
}

pub async fn list_musicians(
    State(pool): State<DbPool>,
    Query(filter): Query<MusicianFilter>,
) -> Result<Json<Vec<Musician>>, AppError> {
    let instrument = filter
        .instrument
        .as_deref()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty());

    let musicians = sqlx::query_as::<_, Musician>(
        r#"
        SELECT * FROM musicians
        WHERE ($1::text IS NULL OR city ILIKE $1)
          AND ($2::text IS NULL OR $2 = ANY(instruments))
          AND (NOT $3 OR is_available)
        ORDER BY name
        "#,
    )
    .bind(&filter.city)
    .bind(instrument)
    .bind(filter.available_only)
    .fetch_all(&pool)
    .await?;

    Ok(Json(musicians))
}

pub async fn get_musician(
    State(pool): State<DbPool>,
    Path(musician_id): Path<Uuid>,
) -> Result<Json<Musician>, AppError> {
    let musician = sqlx::query_as::<_, Musician>("SELECT * FROM musicians WHERE id = $1")
        .bind(musician_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::MusicianNotFound)?;

    Ok(Json(musician))
}
