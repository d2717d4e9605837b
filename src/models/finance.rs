//! Financial models: the artist's personal ledger and platform-side money movements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger entry kinds stored in `personal_transactions.kind`.
pub mod kind {
    pub const INCOME: &str = "income";
    pub const EXPENSE: &str = "expense";
}

/// Platform money movements stored in `platform_transactions.kind`.
pub mod platform_kind {
    pub const BOOKING_PAYMENT: &str = "booking_payment";
    pub const ARTIST_PAYOUT: &str = "artist_payout";
    pub const REFERRAL_REWARD: &str = "referral_reward";
}

/// Represents an entry in an artist's own income/expense ledger.
///
/// Amounts are always positive; `kind` carries the direction.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PersonalTransaction {
    pub id: Uuid,
    pub artist_id: Uuid,

    /// "income" or "expense"
    pub kind: String,

    pub amount_cents: i64,

    /// e.g. "gig fee", "travel", "equipment"
    pub category: Option<String>,

    pub description: Option<String>,
    pub occurred_on: NaiveDate,
    pub booking_id: Option<Uuid>,
    pub manual_gig_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating or replacing a ledger entry.
///
/// ```json
/// {
///   "kind": "expense",
///   "amount_cents": 8500,
///   "category": "travel",
///   "description": "Van hire",
///   "occurred_on": "2026-11-20"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct PersonalTransactionRequest {
    pub kind: String,
    pub amount_cents: i64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
    pub booking_id: Option<Uuid>,
    pub manual_gig_id: Option<Uuid>,
}

/// Inclusive date range used by ledger listings and summaries.
#[derive(Debug, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Totals of an artist's finances over a date range.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub income_cents: i64,
    pub expense_cents: i64,

    /// `income_cents - expense_cents`
    pub net_cents: i64,

    /// Fees of checked-in platform bookings
    pub platform_earnings_cents: i64,

    /// Fees of manual gigs
    pub manual_gig_earnings_cents: i64,

    pub transaction_count: usize,
}

/// Represents a platform-side money movement from `platform_transactions`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PlatformTransaction {
    pub id: Uuid,
    pub kind: String,
    pub booking_id: Option<Uuid>,

    /// Venue paying, artist paid out, or referrer rewarded
    pub user_id: Uuid,

    pub amount_cents: i64,
    pub platform_fee_cents: i64,
    pub created_at: DateTime<Utc>,
}
