//! Admin-only views.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::finance::PlatformTransaction,
    services::finance_service,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PlatformTransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// `GET /api/v1/admin/platform-transactions?limit=100`
///
/// Booking payments, artist payouts and referral rewards, newest first.
pub async fn list_platform_transactions(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PlatformTransactionQuery>,
) -> Result<Json<Vec<PlatformTransaction>>, AppError> {
    auth.require_admin()?;

    Ok(Json(
        finance_service::list_platform_transactions(&pool, query.limit).await?,
    ))
}
