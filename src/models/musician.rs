//! Freelance musician profile models.

use crate::models::profile::{ProfileCompleteness, is_filled, json_is_filled};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a freelance musician from the `musicians` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Musician {
    pub id: Uuid,
    pub name: String,
    pub instruments: Vec<String>,
    pub city: Option<String>,
    pub hourly_rate_cents: Option<i64>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub socials: serde_json::Value,

    /// Whether the musician is currently taking work
    pub is_available: bool,

    pub profile_completeness: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating the caller's musician profile.
#[derive(Debug, Deserialize)]
pub struct UpsertMusicianRequest {
    pub name: String,

    #[serde(default)]
    pub instruments: Vec<String>,

    pub city: Option<String>,
    pub hourly_rate_cents: Option<i64>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub socials: Option<serde_json::Value>,

    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl UpsertMusicianRequest {
    /// Instruments trimmed, lowercased and deduplicated, preserving first occurrence.
    pub fn normalized_instruments(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for instrument in &self.instruments {
            let name = instrument.trim().to_lowercase();
            if !name.is_empty() && !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    pub fn completeness(&self) -> ProfileCompleteness {
        ProfileCompleteness::from_fields(&[
            ("name", !self.name.trim().is_empty()),
            ("instruments", !self.normalized_instruments().is_empty()),
            ("city", is_filled(&self.city)),
            ("hourly_rate_cents", self.hourly_rate_cents.is_some()),
            ("bio", is_filled(&self.bio)),
            ("image_url", is_filled(&self.image_url)),
            ("socials", json_is_filled(&self.socials)),
        ])
    }
}

/// Query parameters for listing musicians.
#[derive(Debug, Deserialize)]
pub struct MusicianFilter {
    pub city: Option<String>,
    pub instrument: Option<String>,

    /// When true, only musicians currently taking work
    #[serde(default)]
    pub available_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruments_are_normalized() {
        let request = UpsertMusicianRequest {
            name: "Sam".into(),
            instruments: vec![" Bass ".into(), "bass".into(), "".into(), "Drums".into()],
            city: None,
            hourly_rate_cents: None,
            bio: None,
            image_url: None,
            socials: None,
            is_available: true,
        };
        assert_eq!(request.normalized_instruments(), vec!["bass", "drums"]);
    }
}
