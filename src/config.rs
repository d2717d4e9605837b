//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `PLATFORM_FEE_PERCENT` (optional): commission taken on each booking, defaults to 10
/// - `REFERRAL_REWARD_CENTS` (optional): reward paid per successful referral, defaults to 2500
/// - `REALTIME_CAPACITY` (optional): buffered realtime events per subscriber, defaults to 256
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_platform_fee_percent")]
    pub platform_fee_percent: i64,

    #[serde(default = "default_referral_reward_cents")]
    pub referral_reward_cents: i64,

    #[serde(default = "default_realtime_capacity")]
    pub realtime_capacity: usize,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_platform_fee_percent() -> i64 {
    10
}

fn default_referral_reward_cents() -> i64 {
    2500
}

fn default_realtime_capacity() -> usize {
    256
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    /// - The platform fee is outside 0..=100
    pub fn from_env() -> anyhow::Result<Self> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0..=100).contains(&self.platform_fee_percent) {
            anyhow::bail!(
                "PLATFORM_FEE_PERCENT must be between 0 and 100, got {}",
                self.platform_fee_percent
            );
        }
        if self.referral_reward_cents < 0 {
            anyhow::bail!("REFERRAL_REWARD_CENTS must not be negative");
        }
        if self.realtime_capacity == 0 {
            anyhow::bail!("REALTIME_CAPACITY must be at least 1");
        }
        Ok(())
    }

    /// Configuration used by router tests; the database is never contacted.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/gig_marketplace_test".to_string(),
            server_port: default_port(),
            database_max_connections: 1,
            platform_fee_percent: default_platform_fee_percent(),
            referral_reward_cents: default_referral_reward_cents(),
            realtime_capacity: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let vars = vec![(
            "DATABASE_URL".to_string(),
            "postgres://localhost/gigs".to_string(),
        )];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.platform_fee_percent, 10);
        assert_eq!(config.referral_reward_cents, 2500);
        assert_eq!(config.realtime_capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let vars: Vec<(String, String)> = vec![("SERVER_PORT".to_string(), "8080".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }

    #[test]
    fn fee_above_one_hundred_percent_is_rejected() {
        let mut config = Config::for_tests();
        config.platform_fee_percent = 150;
        assert!(config.validate().is_err());
    }
}
