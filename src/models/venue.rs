//! Venue profile models.

use crate::models::profile::{ProfileCompleteness, is_filled, json_is_filled};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a venue (event space or contractor) from the `venues` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<i32>,

    /// e.g. "club", "bar", "festival", "private"
    pub venue_type: Option<String>,

    pub description: Option<String>,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub socials: serde_json::Value,
    pub profile_completeness: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating the caller's venue profile.
#[derive(Debug, Deserialize)]
pub struct UpsertVenueRequest {
    pub name: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub venue_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub socials: Option<serde_json::Value>,
}

impl UpsertVenueRequest {
    pub fn completeness(&self) -> ProfileCompleteness {
        ProfileCompleteness::from_fields(&[
            ("name", !self.name.trim().is_empty()),
            ("city", is_filled(&self.city)),
            ("address", is_filled(&self.address)),
            ("capacity", self.capacity.is_some_and(|c| c > 0)),
            ("venue_type", is_filled(&self.venue_type)),
            ("description", is_filled(&self.description)),
            ("image_url", is_filled(&self.image_url)),
            ("socials", json_is_filled(&self.socials)),
        ])
    }
}

/// Query parameters for listing venues.
#[derive(Debug, Deserialize)]
pub struct VenueFilter {
    pub city: Option<String>,
    pub venue_type: Option<String>,
}
