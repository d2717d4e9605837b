//! Personal finance handlers (artist only).
//!
//! - POST /api/v1/finance/transactions
//! - GET /api/v1/finance/transactions (`from`, `to`)
//! - PUT /api/v1/finance/transactions/{id}
//! - DELETE /api/v1/finance/transactions/{id}
//! - GET /api/v1/finance/summary (`from`, `to`)

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        finance::{DateRange, FinancialSummary, PersonalTransaction, PersonalTransactionRequest},
        user::Role,
    },
    services::finance_service,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Add a ledger entry.
///
/// # Request Body
///
/// ```json
/// {
///   "kind": "expense",
///   "amount_cents": 8500,
///   "category": "transport",
///   "occurred_on": "2026-11-20",
///   "booking_id": "550e8400-..."
/// }
/// ```
///
/// A linked booking or manual gig must belong to the caller.
pub async fn create_transaction(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<PersonalTransactionRequest>,
) -> Result<(StatusCode, Json<PersonalTransaction>), AppError> {
    auth.require_role(Role::Artist)?;
    let transaction = finance_service::create_transaction(&pool, auth.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn list_transactions(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<PersonalTransaction>>, AppError> {
    auth.require_role(Role::Artist)?;

    Ok(Json(
        finance_service::list_transactions(&pool, auth.user_id, &range).await?,
    ))
}

pub async fn update_transaction(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<PersonalTransactionRequest>,
) -> Result<Json<PersonalTransaction>, AppError> {
    auth.require_role(Role::Artist)?;
    let transaction =
        finance_service::update_transaction(&pool, auth.user_id, transaction_id, request).await?;

    Ok(Json(transaction))
}

pub async fn delete_transaction(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_role(Role::Artist)?;
    finance_service::delete_transaction(&pool, auth.user_id, transaction_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Income, expenses and earnings over the range.
///
/// # Response
///
/// ```json
/// {
///   "income_cents": 60000,
///   "expense_cents": 10000,
///   "net_cents": 50000,
///   "platform_earnings_cents": 45000,
///   "manual_gig_earnings_cents": 20000,
///   "transaction_count": 4
/// }
/// ```
pub async fn summary(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(range): Query<DateRange>,
) -> Result<Json<FinancialSummary>, AppError> {
    auth.require_role(Role::Artist)?;

    Ok(Json(
        finance_service::summary(&pool, auth.user_id, &range).await?,
    ))
}
