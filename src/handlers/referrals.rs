//! Referral handlers.
//!
//! - GET /api/v1/referrals - The caller's code and the users who joined with it
//! - POST /api/v1/referrals/redeem - Redeem someone else's code (once per user)

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::referral::{RedeemReferralRequest, Referral, ReferralOverview},
    services::referral_service,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

pub async fn overview(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ReferralOverview>, AppError> {
    Ok(Json(referral_service::overview(&pool, auth.user_id).await?))
}

/// Redeem a referral code after registration.
///
/// The reward is paid to the referrer when the caller's first booking is
/// checked in.
pub async fn redeem(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<RedeemReferralRequest>,
) -> Result<(StatusCode, Json<Referral>), AppError> {
    let mut tx = pool.begin().await?;
    let referral = referral_service::redeem_code(&mut tx, auth.user_id, &request.code).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(referral)))
}
