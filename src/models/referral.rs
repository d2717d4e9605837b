//! Referral models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Referral values stored in `referrals.status`.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const REWARDED: &str = "rewarded";
}

/// Represents a referral from the `referrals` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Referral {
    pub id: Uuid,
    pub referrer_id: Uuid,

    /// Each user can be referred at most once
    pub referred_id: Uuid,

    /// Code that was redeemed
    pub code: String,

    pub status: String,
    pub reward_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub rewarded_at: Option<DateTime<Utc>>,
}

/// Request body for redeeming someone's referral code.
#[derive(Debug, Deserialize)]
pub struct RedeemReferralRequest {
    pub code: String,
}

/// The caller's own code and referral statistics.
#[derive(Debug, Serialize)]
pub struct ReferralOverview {
    pub referral_code: String,
    pub referrals: Vec<Referral>,
    pub pending_count: usize,
    pub rewarded_count: usize,
    pub total_reward_cents: i64,
}
