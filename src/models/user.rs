//! User accounts and marketplace roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Marketplace role of a user. Stored as lowercase text in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Artist,
    Venue,
    Musician,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Artist => "artist",
            Role::Venue => "venue",
            Role::Musician => "musician",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(Role::Artist),
            "venue" => Ok(Role::Venue),
            "musician" => Ok(Role::Musician),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Represents a user record from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,

    /// Code other users redeem to register as this user's referral
    pub referral_code: String,

    pub created_at: DateTime<Utc>,
}

/// Request body for registering a new user.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "band@example.com",
///   "display_name": "The Midnight Owls",
///   "role": "artist",
///   "referral_code": "K3X9PQ2M"
/// }
/// ```
///
/// Admins cannot self-register.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub role: Role,

    /// Optional code of the user who referred this one
    pub referral_code: Option<String>,
}

/// Registration response. The raw `api_key` is only ever returned here.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::Artist, Role::Venue, Role::Musician, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("promoter".parse::<Role>().is_err());
    }
}
