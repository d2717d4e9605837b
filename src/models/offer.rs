//! Direct offers and open gig postings.
//!
//! Two ways a venue can find an artist besides booking one outright:
//! - an **offer** is sent to a single artist, who accepts or declines;
//! - an **open gig** is posted publicly, artists apply, and the venue picks one.
//!
//! Both end in a regular booking when accepted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Offer values stored in `offers.status`.
pub mod offer_status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const DECLINED: &str = "declined";
    pub const WITHDRAWN: &str = "withdrawn";
}

/// Open gig values stored in `open_gigs.status`.
pub mod gig_status {
    pub const OPEN: &str = "open";
    pub const FILLED: &str = "filled";
    pub const CLOSED: &str = "closed";
}

/// Application values stored in `gig_applications.status`.
pub mod application_status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
}

/// Represents a direct offer from the `offers` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Offer {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub artist_id: Uuid,
    pub event_date: NaiveDate,
    pub fee_cents: i64,
    pub message: Option<String>,
    pub status: String,

    /// Booking created when the offer was accepted
    pub booking_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Request body for sending a direct offer.
///
/// ```json
/// {
///   "artist_id": "550e8400-...",
///   "event_date": "2026-12-05",
///   "fee_cents": 50000,
///   "message": "Headline slot, 90 minutes"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub artist_id: Uuid,
    pub event_date: NaiveDate,
    pub fee_cents: i64,
    pub message: Option<String>,
}

/// Represents an open gig posting from the `open_gigs` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OpenGig {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub budget_cents: i64,
    pub genre: Option<String>,
    pub status: String,
    pub booking_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request body for posting an open gig.
#[derive(Debug, Deserialize)]
pub struct CreateOpenGigRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub budget_cents: i64,
    pub genre: Option<String>,
}

/// Query parameters for browsing open gigs.
#[derive(Debug, Deserialize)]
pub struct OpenGigFilter {
    pub genre: Option<String>,
    pub from: Option<NaiveDate>,
}

/// Represents an artist's application from the `gig_applications` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct GigApplication {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub artist_id: Uuid,
    pub message: Option<String>,

    /// Fee the artist asks for; the gig budget applies when absent
    pub proposed_fee_cents: Option<i64>,

    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for applying to an open gig.
#[derive(Debug, Deserialize)]
pub struct ApplyToGigRequest {
    pub message: Option<String>,
    pub proposed_fee_cents: Option<i64>,
}
