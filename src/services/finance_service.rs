//! Financial service - the artist's personal ledger and earnings summary.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        booking::status,
        finance::{
            DateRange, FinancialSummary, PersonalTransaction, PersonalTransactionRequest,
            PlatformTransaction, kind,
        },
    },
    services::booking_service::MAX_FEE_CENTS,
};
use uuid::Uuid;

fn validate_request(request: &PersonalTransactionRequest) -> Result<(), AppError> {
    if request.kind != kind::INCOME && request.kind != kind::EXPENSE {
        return Err(AppError::InvalidRequest(
            "kind must be \"income\" or \"expense\"".to_string(),
        ));
    }
    if request.amount_cents <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }
    if request.amount_cents > MAX_FEE_CENTS {
        return Err(AppError::InvalidRequest(format!(
            "Amount must be at most {MAX_FEE_CENTS}"
        )));
    }
    Ok(())
}

/// Linked booking and manual gig must belong to the artist.
async fn verify_links(
    pool: &DbPool,
    artist_id: Uuid,
    request: &PersonalTransactionRequest,
) -> Result<(), AppError> {
    if let Some(booking_id) = request.booking_id {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1 AND artist_id = $2)",
        )
        .bind(booking_id)
        .bind(artist_id)
        .fetch_one(pool)
        .await?;
        if !owned {
            return Err(AppError::BookingNotFound);
        }
    }

    if let Some(gig_id) = request.manual_gig_id {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM manual_gigs WHERE id = $1 AND artist_id = $2)",
        )
        .bind(gig_id)
        .bind(artist_id)
        .fetch_one(pool)
        .await?;
        if !owned {
            return Err(AppError::GigNotFound);
        }
    }

    Ok(())
}

pub async fn create_transaction(
    pool: &DbPool,
    artist_id: Uuid,
    request: PersonalTransactionRequest,
) -> Result<PersonalTransaction, AppError> {
    validate_request(&request)?;
    verify_links(pool, artist_id, &request).await?;

    let transaction = sqlx::query_as::<_, PersonalTransaction>(
        r#"
        INSERT INTO personal_transactions (
            artist_id,
            kind,
            amount_cents,
            category,
            description,
            occurred_on,
            booking_id,
            manual_gig_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(artist_id)
    .bind(&request.kind)
    .bind(request.amount_cents)
    .bind(&request.category)
    .bind(&request.description)
    .bind(request.occurred_on)
    .bind(request.booking_id)
    .bind(request.manual_gig_id)
    .fetch_one(pool)
    .await?;

    Ok(transaction)
}

pub async fn update_transaction(
    pool: &DbPool,
    artist_id: Uuid,
    transaction_id: Uuid,
    request: PersonalTransactionRequest,
) -> Result<PersonalTransaction, AppError> {
    validate_request(&request)?;
    verify_links(pool, artist_id, &request).await?;

    let transaction = sqlx::query_as::<_, PersonalTransaction>(
        r#"
        UPDATE personal_transactions
        SET kind = $3,
            amount_cents = $4,
            category = $5,
            description = $6,
            occurred_on = $7,
            booking_id = $8,
            manual_gig_id = $9
        WHERE id = $1 AND artist_id = $2
        RETURNING *
        "#,
    )
    .bind(transaction_id)
    .bind(artist_id)
    .bind(&request.kind)
    .bind(request.amount_cents)
    .bind(&request.category)
    .bind(&request.description)
    .bind(request.occurred_on)
    .bind(request.booking_id)
    .bind(request.manual_gig_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::TransactionNotFound)?;

    Ok(transaction)
}

pub async fn delete_transaction(
    pool: &DbPool,
    artist_id: Uuid,
    transaction_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM personal_transactions WHERE id = $1 AND artist_id = $2")
        .bind(transaction_id)
        .bind(artist_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::TransactionNotFound);
    }

    Ok(())
}

/// Ledger entries in the range, newest first.
pub async fn list_transactions(
    pool: &DbPool,
    artist_id: Uuid,
    range: &DateRange,
) -> Result<Vec<PersonalTransaction>, AppError> {
    let transactions = sqlx::query_as::<_, PersonalTransaction>(
        r#"
        SELECT * FROM personal_transactions
        WHERE artist_id = $1
          AND ($2::date IS NULL OR occurred_on >= $2)
          AND ($3::date IS NULL OR occurred_on <= $3)
        ORDER BY occurred_on DESC, created_at DESC
        "#,
    )
    .bind(artist_id)
    .bind(range.from)
    .bind(range.to)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

/// Summarize the artist's finances in the range.
pub async fn summary(
    pool: &DbPool,
    artist_id: Uuid,
    range: &DateRange,
) -> Result<FinancialSummary, AppError> {
    let transactions = list_transactions(pool, artist_id, range).await?;

    let platform_earnings: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(fee_cents), 0)::BIGINT
        FROM bookings
        WHERE artist_id = $1
          AND checked_in = true
          AND status <> $2
          AND ($3::date IS NULL OR event_date >= $3)
          AND ($4::date IS NULL OR event_date <= $4)
        "#,
    )
    .bind(artist_id)
    .bind(status::CANCELLED)
    .bind(range.from)
    .bind(range.to)
    .fetch_one(pool)
    .await?;

    let manual_earnings: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(fee_cents), 0)::BIGINT
        FROM manual_gigs
        WHERE artist_id = $1
          AND ($2::date IS NULL OR event_date >= $2)
          AND ($3::date IS NULL OR event_date <= $3)
        "#,
    )
    .bind(artist_id)
    .bind(range.from)
    .bind(range.to)
    .fetch_one(pool)
    .await?;

    summarize(&transactions, platform_earnings, manual_earnings)
}

/// Fold ledger entries and earnings into a summary.
///
/// # Errors
///
/// `InvalidState` when the totals do not fit in 64-bit cents.
pub fn summarize(
    transactions: &[PersonalTransaction],
    platform_earnings_cents: i64,
    manual_gig_earnings_cents: i64,
) -> Result<FinancialSummary, AppError> {
    let overflow = || AppError::InvalidState("Ledger totals are too large to summarize".to_string());

    let mut income_cents = 0i64;
    let mut expense_cents = 0i64;
    for t in transactions {
        match t.kind.as_str() {
            kind::INCOME => {
                income_cents = income_cents.checked_add(t.amount_cents).ok_or_else(overflow)?
            }
            kind::EXPENSE => {
                expense_cents = expense_cents.checked_add(t.amount_cents).ok_or_else(overflow)?
            }
            _ => {}
        }
    }

    Ok(FinancialSummary {
        income_cents,
        expense_cents,
        net_cents: income_cents.checked_sub(expense_cents).ok_or_else(overflow)?,
        platform_earnings_cents,
        manual_gig_earnings_cents,
        transaction_count: transactions.len(),
    })
}

/// Platform money movements, newest first (admin view).
pub async fn list_platform_transactions(
    pool: &DbPool,
    limit: i64,
) -> Result<Vec<PlatformTransaction>, AppError> {
    let transactions = sqlx::query_as::<_, PlatformTransaction>(
        "SELECT * FROM platform_transactions ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn entry(entry_kind: &str, amount_cents: i64) -> PersonalTransaction {
        PersonalTransaction {
            id: Uuid::new_v4(),
            artist_id: Uuid::nil(),
            kind: entry_kind.into(),
            amount_cents,
            category: None,
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            booking_id: None,
            manual_gig_id: None,
            created_at: Utc::now(),
        }
    }

    fn request(entry_kind: &str, amount_cents: i64) -> PersonalTransactionRequest {
        PersonalTransactionRequest {
            kind: entry_kind.into(),
            amount_cents,
            category: None,
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            booking_id: None,
            manual_gig_id: None,
        }
    }

    #[test]
    fn summary_nets_income_against_expenses() {
        let ledger = vec![
            entry(kind::INCOME, 50000),
            entry(kind::EXPENSE, 8500),
            entry(kind::EXPENSE, 1500),
            entry(kind::INCOME, 10000),
        ];

        let summary = summarize(&ledger, 45000, 20000).unwrap();

        assert_eq!(
            summary,
            FinancialSummary {
                income_cents: 60000,
                expense_cents: 10000,
                net_cents: 50000,
                platform_earnings_cents: 45000,
                manual_gig_earnings_cents: 20000,
                transaction_count: 4,
            }
        );
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        assert_eq!(summarize(&[], 0, 0).unwrap(), FinancialSummary::default());
    }

    #[test]
    fn oversized_totals_are_reported_instead_of_overflowing() {
        let huge = i64::MAX / 2 + 1;
        let ledger = vec![entry(kind::INCOME, huge), entry(kind::INCOME, huge)];
        assert!(matches!(
            summarize(&ledger, 0, 0),
            Err(AppError::InvalidState(_))
        ));

        let ledger = vec![entry(kind::EXPENSE, huge), entry(kind::EXPENSE, huge)];
        assert!(summarize(&ledger, 0, 0).is_err());
    }

    #[test]
    fn requests_need_known_kind_and_positive_amount() {
        assert!(validate_request(&request(kind::INCOME, 100)).is_ok());
        assert!(validate_request(&request("refund", 100)).is_err());
        assert!(validate_request(&request(kind::EXPENSE, 0)).is_err());
        assert!(validate_request(&request(kind::EXPENSE, -5)).is_err());
        assert!(validate_request(&request(kind::INCOME, MAX_FEE_CENTS)).is_ok());
        assert!(validate_request(&request(kind::INCOME, MAX_FEE_CENTS + 1)).is_err());
    }
}
