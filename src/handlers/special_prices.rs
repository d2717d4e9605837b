//! Special price handlers. Artists only; prices apply to their own profile.
//!
//! - GET /api/v1/special-prices
//! - PUT /api/v1/special-prices
//! - DELETE /api/v1/special-prices/{date}

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        special_price::{SetSpecialPriceRequest, SpecialPrice},
        user::Role,
    },
    services::booking_service,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;

pub async fn list_special_prices(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<SpecialPrice>>, AppError> {
    auth.require_role(Role::Artist)?;

    let prices = sqlx::query_as::<_, SpecialPrice>(
        "SELECT * FROM special_prices WHERE artist_id = $1 ORDER BY price_date",
    )
    .bind(auth.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(prices))
}

/// Set the price for one date, replacing any earlier price for it.
///
/// Bookings already made keep the fee they were created with.
pub async fn set_special_price(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<SetSpecialPriceRequest>,
) -> Result<Json<SpecialPrice>, AppError> {
    auth.require_role(Role::Artist)?;
    booking_service::validate_fee_cents(request.price_cents, "price_cents")?;

    let artist_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM artists WHERE id = $1)")
        .bind(auth.user_id)
        .fetch_one(&pool)
        .await?;
    if !artist_exists {
        return Err(AppError::ArtistNotFound);
    }

    let price = sqlx::query_as::<_, SpecialPrice>(
        r#"
        INSERT INTO special_prices (artist_id, price_date, price_cents, note)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (artist_id, price_date) DO UPDATE SET
            price_cents = EXCLUDED.price_cents,
            note = EXCLUDED.note
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(request.price_date)
    .bind(request.price_cents)
    .bind(&request.note)
    .fetch_one(&pool)
    .await?;

    Ok(Json(price))
}

pub async fn delete_special_price(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(price_date): Path<NaiveDate>,
) -> Result<StatusCode, AppError> {
    auth.require_role(Role::Artist)?;

    let result = sqlx::query("DELETE FROM special_prices WHERE artist_id = $1 AND price_date = $2")
        .bind(auth.user_id)
        .bind(price_date)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::SpecialPriceNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
