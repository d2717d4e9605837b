//! Manual gig models and the merged calendar view.
//!
//! Manual gigs are performances booked outside the platform. They exist so the
//! artist's calendar and earnings are complete; they never have a PIN or payout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a manual gig record from the `manual_gigs` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ManualGig {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub event_date: NaiveDate,
    pub venue_name: String,
    pub city: Option<String>,
    pub fee_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a manual gig.
///
/// ```json
/// {
///   "event_date": "2026-11-28",
///   "venue_name": "Village Hall",
///   "city": "Otley",
///   "fee_cents": 20000
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct ManualGigRequest {
    pub event_date: NaiveDate,
    pub venue_name: String,
    pub city: Option<String>,

    #[serde(default)]
    pub fee_cents: i64,

    pub notes: Option<String>,
}

/// Where a calendar entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSource {
    Platform,
    Manual,
}

/// One row of an artist's calendar.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEntry {
    pub id: Uuid,
    pub source: CalendarSource,
    pub event_date: NaiveDate,
    pub venue_name: String,
    pub city: Option<String>,
    pub fee_cents: i64,

    /// Booking status for platform entries; always "manual" for manual gigs
    pub status: String,

    pub checked_in: bool,
}

/// Calendar query parameters. Both bounds are inclusive and optional.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
