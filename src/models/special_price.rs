//! Per-date price overrides set by artists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a special price from the `special_prices` table.
///
/// A booking on `price_date` is charged `price_cents` instead of the artist's base fee.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SpecialPrice {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub price_date: NaiveDate,
    pub price_cents: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for setting a special price. Setting the same date again replaces it.
///
/// ```json
/// { "price_date": "2026-12-31", "price_cents": 120000, "note": "New Year's Eve" }
/// ```
#[derive(Debug, Deserialize)]
pub struct SetSpecialPriceRequest {
    pub price_date: NaiveDate,
    pub price_cents: i64,
    pub note: Option<String>,
}
