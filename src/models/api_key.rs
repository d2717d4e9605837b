//! API Key model for authentication.
//!
//! API keys authenticate marketplace users (artists, venues, musicians, admins).
//! They are stored in the database as SHA-256 hashes; the raw key is shown once at registration.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// An active API key joined with the user it belongs to.
///
/// # Database Tables
///
/// Built from `api_keys` joined to `users`:
/// - `id`: API key identifier
/// - `user_id`: owner of the key
/// - `key_hash`: SHA-256 hash of the actual API key
/// - `role`: the owner's marketplace role
/// - `display_name`: the owner's display name
/// - `created_at`: when the key was created
/// - `is_active`: whether the key is currently valid
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,

    pub user_id: Uuid,

    /// SHA-256 hash of the actual API key (64 hex characters)
    pub key_hash: String,

    pub role: String,

    pub display_name: String,

    pub created_at: DateTime<Utc>,

    /// Inactive keys are rejected during authentication.
    pub is_active: bool,
}

/// Hash a raw API key the way it is stored in `api_keys.key_hash`.
pub fn hash_api_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a new raw API key (32 random bytes, hex encoded).
pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex_sha256() {
        let hash = hash_api_key("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn generated_keys_are_unique_and_64_chars() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
