//! Referral service - codes, redemption and rewards.
//!
//! Every user has a referral code. A new user may redeem one code; the referral
//! stays pending until the referred user takes part in a checked-in booking, at
//! which point the referrer is rewarded.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        finance::platform_kind,
        referral::{Referral, ReferralOverview, status},
    },
};
use rand::Rng;
use sqlx::PgConnection;
use uuid::Uuid;

/// Characters used in referral codes. Omits 0/O and 1/I to avoid misreads.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 8;

/// Generate a random referral code.
pub fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Codes are matched case-insensitively and ignoring surrounding whitespace.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Record that `referred_id` signed up with `code`.
///
/// # Errors
///
/// - `ReferralCodeNotFound`: no user owns the code
/// - `InvalidRequest`: the code is the caller's own
/// - `Conflict`: the caller has already redeemed a code
pub async fn redeem_code(
    conn: &mut PgConnection,
    referred_id: Uuid,
    code: &str,
) -> Result<Referral, AppError> {
    let code = normalize_code(code);

    let referrer_id: Uuid = sqlx::query_scalar("SELECT id FROM users WHERE referral_code = $1")
        .bind(&code)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::ReferralCodeNotFound)?;

    if referrer_id == referred_id {
        return Err(AppError::InvalidRequest(
            "You cannot redeem your own referral code".to_string(),
        ));
    }

    let already_referred: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM referrals WHERE referred_id = $1)")
            .bind(referred_id)
            .fetch_one(&mut *conn)
            .await?;
    if already_referred {
        return Err(AppError::Conflict(
            "A referral code has already been redeemed for this account".to_string(),
        ));
    }

    let referral = sqlx::query_as::<_, Referral>(
        r#"
        INSERT INTO referrals (referrer_id, referred_id, code, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(referrer_id)
    .bind(referred_id)
    .bind(&code)
    .bind(status::PENDING)
    .fetch_one(&mut *conn)
    .await?;

    tracing::info!("User {} redeemed referral code of {}", referred_id, referrer_id);

    Ok(referral)
}

/// Reward the referrer of `user_id`, if that referral is still pending.
///
/// Called inside the check-in transaction for both parties of the booking.
pub async fn settle_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    booking_id: Uuid,
    reward_cents: i64,
) -> Result<Option<Referral>, AppError> {
    let pending = sqlx::query_as::<_, Referral>(
        "SELECT * FROM referrals WHERE referred_id = $1 AND status = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(status::PENDING)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(pending) = pending else {
        return Ok(None);
    };

    let referral = sqlx::query_as::<_, Referral>(
        r#"
        UPDATE referrals
        SET status = $2, reward_cents = $3, rewarded_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(pending.id)
    .bind(status::REWARDED)
    .bind(reward_cents)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO platform_transactions (kind, booking_id, user_id, amount_cents, platform_fee_cents)
        VALUES ($1, $2, $3, $4, 0)
        "#,
    )
    .bind(platform_kind::REFERRAL_REWARD)
    .bind(booking_id)
    .bind(referral.referrer_id)
    .bind(reward_cents)
    .execute(&mut *conn)
    .await?;

    tracing::info!(
        "Referral {} rewarded: {} cents to {}",
        referral.id,
        reward_cents,
        referral.referrer_id
    );

    Ok(Some(referral))
}

/// The caller's referral code and the referrals made with it.
pub async fn overview(pool: &DbPool, user_id: Uuid) -> Result<ReferralOverview, AppError> {
    let referral_code: String = sqlx::query_scalar("SELECT referral_code FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let referrals = sqlx::query_as::<_, Referral>(
        "SELECT * FROM referrals WHERE referrer_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(summarize(referral_code, referrals))
}

/// Build the overview counters from a list of referrals.
pub fn summarize(referral_code: String, referrals: Vec<Referral>) -> ReferralOverview {
    let rewarded: Vec<&Referral> = referrals
        .iter()
        .filter(|r| r.status == status::REWARDED)
        .collect();

    let rewarded_count = rewarded.len();
    let total_reward_cents = rewarded.iter().filter_map(|r| r.reward_cents).sum();

    ReferralOverview {
        referral_code,
        pending_count: referrals.len() - rewarded_count,
        rewarded_count,
        total_reward_cents,
        referrals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn referral(state: &str, reward: Option<i64>) -> Referral {
        Referral {
            id: Uuid::new_v4(),
            referrer_id: Uuid::new_v4(),
            referred_id: Uuid::new_v4(),
            code: "ABCDEFGH".into(),
            status: state.into(),
            reward_cents: reward,
            created_at: Utc::now(),
            rewarded_at: None,
        }
    }

    #[test]
    fn codes_use_the_unambiguous_alphabet() {
        for _ in 0..200 {
            let code = generate_referral_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn codes_are_normalized() {
        assert_eq!(normalize_code("  k3x9pq2m \n"), "K3X9PQ2M");
    }

    #[test]
    fn overview_counts_rewards() {
        let overview = summarize(
            "K3X9PQ2M".into(),
            vec![
                referral(status::PENDING, None),
                referral(status::REWARDED, Some(2500)),
                referral(status::REWARDED, Some(2500)),
            ],
        );
        assert_eq!(overview.pending_count, 1);
        assert_eq!(overview.rewarded_count, 2);
        assert_eq!(overview.total_reward_cents, 5000);
        assert_eq!(overview.referrals.len(), 3);
    }
}
