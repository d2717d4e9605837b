//! Artist profile models.
//!
//! An artist (performer or band) is the bookable side of the marketplace.
//! The profile id equals the owning user's id.

use crate::models::profile::{ProfileCompleteness, is_filled, json_is_filled};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an artist record from the `artists` table.
///
/// # Booked Dates
///
/// `booked_dates` is a denormalized list of `YYYY-MM-DD` strings covering every
/// platform booking and manual gig. It is rewritten in the same database
/// transaction as the booking or gig it mirrors.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,

    /// Default fee per performance, used when no special price is set for the date
    pub base_fee_cents: i64,

    pub image_url: Option<String>,
    pub website_url: Option<String>,

    /// Social links keyed by network name
    pub socials: serde_json::Value,

    /// Free-form stage/backline requirements
    pub technical_requirements: serde_json::Value,

    pub profile_completeness: serde_json::Value,
    pub booked_dates: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating the caller's artist profile.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "The Midnight Owls",
///   "genre": "indie rock",
///   "city": "Leeds",
///   "base_fee_cents": 45000,
///   "socials": { "instagram": "https://instagram.com/midnightowls" },
///   "technical_requirements": { "stage": "4x3m", "inputs": 12 }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct UpsertArtistRequest {
    pub name: String,
    pub genre: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,

    #[serde(default)]
    pub base_fee_cents: i64,

    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub socials: Option<serde_json::Value>,
    pub technical_requirements: Option<serde_json::Value>,
}

impl UpsertArtistRequest {
    pub fn completeness(&self) -> ProfileCompleteness {
        ProfileCompleteness::from_fields(&[
            ("name", !self.name.trim().is_empty()),
            ("genre", is_filled(&self.genre)),
            ("bio", is_filled(&self.bio)),
            ("city", is_filled(&self.city)),
            ("base_fee_cents", self.base_fee_cents > 0),
            ("image_url", is_filled(&self.image_url)),
            ("socials", json_is_filled(&self.socials)),
            (
                "technical_requirements",
                json_is_filled(&self.technical_requirements),
            ),
        ])
    }
}

/// Query parameters for listing artists.
#[derive(Debug, Deserialize)]
pub struct ArtistFilter {
    pub city: Option<String>,
    pub genre: Option<String>,
}

/// Query parameters for an availability lookup.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// A date with a price other than the artist's base fee.
#[derive(Debug, Clone, Serialize)]
pub struct PricedDate {
    pub date: NaiveDate,
    pub price_cents: i64,
}

/// Availability of an artist within a date range.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub artist_id: Uuid,
    pub base_fee_cents: i64,
    pub booked_dates: Vec<NaiveDate>,
    pub special_prices: Vec<PricedDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_artist_profile_is_complete() {
        let request = UpsertArtistRequest {
            name: "The Owls".into(),
            genre: Some("folk".into()),
            bio: Some("Four-piece from Leeds".into()),
            city: Some("Leeds".into()),
            base_fee_cents: 30000,
            image_url: Some("https://cdn.example.com/owls.jpg".into()),
            website_url: None,
            socials: Some(json!({"instagram": "https://instagram.com/owls"})),
            technical_requirements: Some(json!({"inputs": 8})),
        };

        let score = request.completeness();
        assert_eq!(score.percent, 100);
        assert!(score.missing.is_empty());
    }

    #[test]
    fn free_artist_reports_missing_fee() {
        let request = UpsertArtistRequest {
            name: "Solo".into(),
            genre: None,
            bio: None,
            city: None,
            base_fee_cents: 0,
            image_url: None,
            website_url: None,
            socials: None,
            technical_requirements: None,
        };

        let score = request.completeness();
        assert_eq!(score.percent, 12);
        assert!(score.missing.contains(&"base_fee_cents".to_string()));
    }
}
