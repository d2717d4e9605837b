//! Booking data models and API request/response types.
//!
//! This module defines:
//! - `Booking`: Database entity for a platform-mediated reservation
//! - `EnrichedBooking`: Booking joined with artist and venue display data
//! - Request types for creating bookings and checking in

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle values stored in `bookings.status`.
pub mod status {
    pub const CONFIRMED: &str = "confirmed";
    pub const COMPLETED: &str = "completed";
    pub const CANCELLED: &str = "cancelled";
}

/// Payout values stored in `bookings.payout_status`.
pub mod payout {
    pub const PENDING: &str = "pending";
    pub const PAID: &str = "paid";
}

/// Represents a booking record from the `bookings` table.
///
/// One row per booked date: a request covering three dates produces three bookings,
/// each with its own confirmation PIN. Not serializable: responses go through
/// [`BookingResponse`], which hides the PIN from everyone but the venue.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub venue_id: Uuid,
    pub event_date: NaiveDate,

    /// Fee agreed for this date, in cents
    pub fee_cents: i64,

    /// "confirmed", "completed" or "cancelled"
    pub status: String,

    /// 4-digit code the venue hands to the artist on site
    pub confirmation_pin: String,

    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,

    /// "pending" or "paid"
    pub payout_status: String,

    pub paid_out_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,

    /// Set when the booking came from an accepted direct offer
    pub offer_id: Option<Uuid>,

    /// Set when the booking came from an accepted open-gig application
    pub gig_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking joined with the display fields of its artist and venue.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnrichedBookingRow {
    #[sqlx(flatten)]
    pub booking: Booking,
    pub artist_name: String,
    pub artist_image_url: Option<String>,
    pub venue_name: String,
    pub venue_city: Option<String>,
    pub venue_image_url: Option<String>,
}

/// Request to book an artist on one or more dates.
///
/// # JSON Example
///
/// ```json
/// {
///   "artist_id": "550e8400-e29b-41d4-a716-446655440000",
///   "dates": ["2026-11-20", "2026-11-21"],
///   "notes": "Two 45-minute sets"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub artist_id: Uuid,
    pub dates: Vec<NaiveDate>,
    pub notes: Option<String>,
}

/// Request to confirm artist presence at the venue.
///
/// ```json
/// { "pin": "4821" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub pin: String,
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
pub struct BookingFilter {
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Response body for booking endpoints.
///
/// `confirmation_pin` is only populated when the viewer is the booking's venue.
///
/// ```json
/// {
///   "id": "770e8400-...",
///   "artist_id": "550e8400-...",
///   "artist_name": "The Midnight Owls",
///   "venue_id": "660e8400-...",
///   "venue_name": "The Brudenell",
///   "event_date": "2026-11-20",
///   "fee_cents": 45000,
///   "status": "confirmed",
///   "confirmation_pin": "4821",
///   "checked_in": false,
///   "payout_status": "pending"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub artist_name: Option<String>,
    pub artist_image_url: Option<String>,
    pub venue_id: Uuid,
    pub venue_name: Option<String>,
    pub venue_city: Option<String>,
    pub venue_image_url: Option<String>,
    pub event_date: NaiveDate,
    pub fee_cents: i64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_pin: Option<String>,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub payout_status: String,
    pub paid_out_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub offer_id: Option<Uuid>,
    pub gig_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    /// Build a response for `viewer`, hiding the PIN from anyone but the venue.
    pub fn for_viewer(booking: Booking, viewer: Uuid) -> Self {
        let confirmation_pin =
            (booking.venue_id == viewer).then(|| booking.confirmation_pin.clone());

        Self {
            id: booking.id,
            artist_id: booking.artist_id,
            artist_name: None,
            artist_image_url: None,
            venue_id: booking.venue_id,
            venue_name: None,
            venue_city: None,
            venue_image_url: None,
            event_date: booking.event_date,
            fee_cents: booking.fee_cents,
            status: booking.status,
            confirmation_pin,
            checked_in: booking.checked_in,
            checked_in_at: booking.checked_in_at,
            payout_status: booking.payout_status,
            paid_out_at: booking.paid_out_at,
            notes: booking.notes,
            offer_id: booking.offer_id,
            gig_id: booking.gig_id,
            created_at: booking.created_at,
        }
    }

    pub fn enriched_for_viewer(row: EnrichedBookingRow, viewer: Uuid) -> Self {
        let mut response = Self::for_viewer(row.booking, viewer);
        response.artist_name = Some(row.artist_name);
        response.artist_image_url = row.artist_image_url;
        response.venue_name = Some(row.venue_name);
        response.venue_city = row.venue_city;
        response.venue_image_url = row.venue_image_url;
        response
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_booking(artist_id: Uuid, venue_id: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            artist_id,
            venue_id,
            event_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            fee_cents: 45000,
            status: status::CONFIRMED.to_string(),
            confirmation_pin: "4821".to_string(),
            checked_in: false,
            checked_in_at: None,
            payout_status: payout::PENDING.to_string(),
            paid_out_at: None,
            notes: None,
            offer_id: None,
            gig_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pin_is_visible_to_venue_only() {
        let artist = Uuid::new_v4();
        let venue = Uuid::new_v4();

        let for_venue = BookingResponse::for_viewer(sample_booking(artist, venue), venue);
        assert_eq!(for_venue.confirmation_pin.as_deref(), Some("4821"));
        let json = serde_json::to_value(&for_venue).unwrap();
        assert_eq!(json["confirmation_pin"], "4821");

        let for_artist = BookingResponse::for_viewer(sample_booking(artist, venue), artist);
        assert!(for_artist.confirmation_pin.is_none());

        let json = serde_json::to_value(&for_artist).unwrap();
        assert!(json.get("confirmation_pin").is_none());

        let stranger = BookingResponse::for_viewer(sample_booking(artist, venue), Uuid::new_v4());
        let json = serde_json::to_value(&stranger).unwrap();
        assert!(json.get("confirmation_pin").is_none());
    }
}
