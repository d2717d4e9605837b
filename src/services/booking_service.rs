//! Booking service - lifecycle of platform-mediated bookings.
//!
//! This service handles:
//! - Creating one booking per requested date, each with its own confirmation PIN
//! - Keeping the artist's booked-date list in step with bookings
//! - Check-in (confirmation of artist presence with the PIN)
//! - Cancellation and payout marking
//! - Enriching bookings with artist and venue display data
//!
//! # Atomicity Guarantees
//!
//! Every mutation that touches both `bookings` and `artists.booked_dates` runs in a
//! single PostgreSQL transaction with the artist row locked `FOR UPDATE`, so two
//! venues booking the same artist concurrently cannot both claim a date.

use crate::{
    db::{self, DbPool},
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        booking::{Booking, BookingFilter, CreateBookingRequest, EnrichedBookingRow, payout, status},
        finance::platform_kind,
        user::Role,
    },
    realtime::{EventHub, RealtimeEvent},
    services::referral_service,
};
use chrono::NaiveDate;
use rand::Rng;
use sqlx::PgConnection;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Upper bound on dates in a single booking request.
pub const MAX_DATES_PER_REQUEST: usize = 31;

/// Largest fee, price or ledger amount accepted anywhere: 100 million in currency units.
pub const MAX_FEE_CENTS: i64 = 10_000_000_000;

/// Where a booking originated, besides a direct booking request.
#[derive(Debug, Default, Clone, Copy)]
pub struct BookingOrigin {
    pub offer_id: Option<Uuid>,
    pub gig_id: Option<Uuid>,
}

/// A booking row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBooking {
    pub event_date: NaiveDate,
    pub fee_cents: i64,
    pub confirmation_pin: String,
}

/// Generate a random 4-digit confirmation PIN (1000-9999).
pub fn generate_confirmation_pin() -> String {
    rand::rng().random_range(1000..=9999u16).to_string()
}

/// A submitted check-in code must be exactly four ASCII digits.
pub fn validate_pin_format(pin: &str) -> Result<(), AppError> {
    if pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(
            "PIN must be exactly 4 digits".to_string(),
        ))
    }
}

/// Validate requested booking dates and return them sorted.
///
/// # Rules
///
/// - At least one date, at most `MAX_DATES_PER_REQUEST`
/// - No duplicates
/// - None before `today`
pub fn validate_booking_dates(
    dates: &[NaiveDate],
    today: NaiveDate,
) -> Result<Vec<NaiveDate>, AppError> {
    if dates.is_empty() {
        return Err(AppError::InvalidRequest(
            "At least one date is required".to_string(),
        ));
    }
    if dates.len() > MAX_DATES_PER_REQUEST {
        return Err(AppError::InvalidRequest(format!(
            "At most {MAX_DATES_PER_REQUEST} dates can be booked at once"
        )));
    }

    let mut seen = HashSet::new();
    for date in dates {
        if !seen.insert(*date) {
            return Err(AppError::InvalidRequest(format!("Duplicate date {date}")));
        }
        if *date < today {
            return Err(AppError::InvalidRequest(format!("{date} is in the past")));
        }
    }

    let mut sorted = dates.to_vec();
    sorted.sort();
    Ok(sorted)
}

/// First requested date already present in the artist's booked-date list.
pub fn find_conflict(booked_dates: &[String], requested: &[NaiveDate]) -> Option<NaiveDate> {
    let booked: HashSet<&str> = booked_dates.iter().map(String::as_str).collect();
    requested
        .iter()
        .copied()
        .find(|date| booked.contains(db::date_key(*date).as_str()))
}

/// A fee or price must lie in `0..=MAX_FEE_CENTS`.
pub fn validate_fee_cents(fee_cents: i64, field: &str) -> Result<(), AppError> {
    if fee_cents < 0 {
        return Err(AppError::InvalidRequest(format!(
            "{field} must not be negative"
        )));
    }
    if fee_cents > MAX_FEE_CENTS {
        return Err(AppError::InvalidRequest(format!(
            "{field} must be at most {MAX_FEE_CENTS}"
        )));
    }
    Ok(())
}

/// Commission kept by the platform on `amount_cents`, rounded down.
///
/// # Errors
///
/// `InvalidRequest` when the amount is too large to take a percentage of.
pub fn platform_fee(amount_cents: i64, fee_percent: i64) -> Result<i64, AppError> {
    amount_cents
        .checked_mul(fee_percent)
        .map(|scaled| scaled / 100)
        .ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "Amount {amount_cents} is too large to compute the platform fee"
            ))
        })
}

/// Work out the rows a booking request produces: one per date.
///
/// The fee for each date is `agreed_fee` when given (offers and gig applications),
/// otherwise the artist's special price for that date, otherwise the base fee.
pub fn plan_bookings(
    dates: &[NaiveDate],
    base_fee_cents: i64,
    special_prices: &HashMap<NaiveDate, i64>,
    agreed_fee: Option<i64>,
) -> Vec<PlannedBooking> {
    dates
        .iter()
        .map(|date| PlannedBooking {
            event_date: *date,
            fee_cents: agreed_fee
                .or_else(|| special_prices.get(date).copied())
                .unwrap_or(base_fee_cents),
            confirmation_pin: generate_confirmation_pin(),
        })
        .collect()
}

/// Book an artist on `dates` inside an open transaction.
///
/// # Process
///
/// 1. Lock the artist row and read its booked dates
/// 2. Reject the first date already taken
/// 3. Resolve fees and insert one booking per date
/// 4. Append the dates to the artist's booked-date list
/// 5. Record one `booking_payment` platform transaction per booking
///
/// The caller commits.
pub async fn book_dates(
    conn: &mut PgConnection,
    artist_id: Uuid,
    venue_id: Uuid,
    dates: &[NaiveDate],
    agreed_fee: Option<i64>,
    notes: Option<String>,
    origin: BookingOrigin,
    fee_percent: i64,
) -> Result<Vec<Booking>, AppError> {
    let booked_dates = db::lock_artist_booked_dates(&mut *conn, artist_id)
        .await?
        .ok_or(AppError::ArtistNotFound)?;

    if let Some(date) = find_conflict(&booked_dates, dates) {
        return Err(AppError::DateUnavailable(date));
    }

    let base_fee_cents: i64 = sqlx::query_scalar("SELECT base_fee_cents FROM artists WHERE id = $1")
        .bind(artist_id)
        .fetch_one(&mut *conn)
        .await?;

    let special_prices: HashMap<NaiveDate, i64> = sqlx::query_as::<_, (NaiveDate, i64)>(
        "SELECT price_date, price_cents FROM special_prices WHERE artist_id = $1 AND price_date = ANY($2)",
    )
    .bind(artist_id)
    .bind(dates)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .collect();

    let planned = plan_bookings(dates, base_fee_cents, &special_prices, agreed_fee);

    let mut bookings = Vec::with_capacity(planned.len());
    for plan in planned {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                artist_id,
                venue_id,
                event_date,
                fee_cents,
                status,
                confirmation_pin,
                payout_status,
                notes,
                offer_id,
                gig_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(artist_id)
        .bind(venue_id)
        .bind(plan.event_date)
        .bind(plan.fee_cents)
        .bind(status::CONFIRMED)
        .bind(&plan.confirmation_pin)
        .bind(payout::PENDING)
        .bind(&notes)
        .bind(origin.offer_id)
        .bind(origin.gig_id)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO platform_transactions (kind, booking_id, user_id, amount_cents, platform_fee_cents)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(platform_kind::BOOKING_PAYMENT)
        .bind(booking.id)
        .bind(venue_id)
        .bind(booking.fee_cents)
        .bind(platform_fee(booking.fee_cents, fee_percent)?)
        .execute(&mut *conn)
        .await?;

        bookings.push(booking);
    }

    db::add_booked_dates(&mut *conn, artist_id, dates).await?;

    Ok(bookings)
}

/// Book an artist on a single date inside an open transaction.
///
/// Used by offers and open gigs, which always cover exactly one date.
pub async fn book_single_date(
    conn: &mut PgConnection,
    artist_id: Uuid,
    venue_id: Uuid,
    date: NaiveDate,
    agreed_fee: Option<i64>,
    notes: Option<String>,
    origin: BookingOrigin,
    fee_percent: i64,
) -> Result<Booking, AppError> {
    book_dates(
        conn,
        artist_id,
        venue_id,
        &[date],
        agreed_fee,
        notes,
        origin,
        fee_percent,
    )
    .await?
    .pop()
    .ok_or(AppError::BookingNotFound)
}

/// Create bookings for the authenticated venue.
///
/// # Errors
///
/// - `Forbidden`: caller is not a venue
/// - `VenueNotFound`: caller has no venue profile yet
/// - `InvalidRequest`: dates empty, duplicated or in the past
/// - `ArtistNotFound`: artist does not exist
/// - `DateUnavailable`: one of the dates is already booked
pub async fn create_bookings(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    request: CreateBookingRequest,
    fee_percent: i64,
) -> Result<Vec<Booking>, AppError> {
    auth.require_role(Role::Venue)?;

    let dates = validate_booking_dates(&request.dates, chrono::Utc::now().date_naive())?;

    let venue_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM venues WHERE id = $1)")
        .bind(auth.user_id)
        .fetch_one(pool)
        .await?;
    if !venue_exists {
        return Err(AppError::VenueNotFound);
    }

    let mut tx = pool.begin().await?;

    let bookings = book_dates(
        &mut tx,
        request.artist_id,
        auth.user_id,
        &dates,
        None,
        request.notes,
        BookingOrigin::default(),
        fee_percent,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Venue {} booked artist {} for {} date(s)",
        auth.user_id,
        request.artist_id,
        bookings.len()
    );

    for booking in &bookings {
        publish_booking_changed(events, booking);
    }

    Ok(bookings)
}

/// Fetch a booking visible to the caller, with display data.
///
/// Artists and venues see their own bookings; admins see all. Anyone else gets 404.
pub async fn get_enriched_booking(
    pool: &DbPool,
    auth: &AuthContext,
    booking_id: Uuid,
) -> Result<EnrichedBookingRow, AppError> {
    let row = sqlx::query_as::<_, EnrichedBookingRow>(&format!(
        "{ENRICHED_SELECT} WHERE b.id = $1"
    ))
    .bind(booking_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::BookingNotFound)?;

    let booking = &row.booking;
    if auth.role != Role::Admin && booking.artist_id != auth.user_id && booking.venue_id != auth.user_id {
        return Err(AppError::BookingNotFound);
    }

    Ok(row)
}

/// List bookings the caller takes part in (all bookings for admins), soonest first.
pub async fn list_enriched_bookings(
    pool: &DbPool,
    auth: &AuthContext,
    filter: &BookingFilter,
) -> Result<Vec<EnrichedBookingRow>, AppError> {
    let participant = (auth.role != Role::Admin).then_some(auth.user_id);

    let rows = sqlx::query_as::<_, EnrichedBookingRow>(&format!(
        r#"
        {ENRICHED_SELECT}
        WHERE ($1::uuid IS NULL OR b.artist_id = $1 OR b.venue_id = $1)
          AND ($2::text IS NULL OR b.status = $2)
          AND ($3::date IS NULL OR b.event_date >= $3)
          AND ($4::date IS NULL OR b.event_date <= $4)
        ORDER BY b.event_date, b.created_at
        "#
    ))
    .bind(participant)
    .bind(&filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Booking columns plus artist and venue display fields; append a `WHERE` clause.
pub(crate) const ENRICHED_SELECT: &str = r#"
    SELECT b.*,
           a.name AS artist_name,
           a.image_url AS artist_image_url,
           v.name AS venue_name,
           v.city AS venue_city,
           v.image_url AS venue_image_url
    FROM bookings b
    JOIN artists a ON a.id = b.artist_id
    JOIN venues v ON v.id = b.venue_id
"#;

/// What a check-in attempt should do to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// The artist is already checked in; nothing changes.
    AlreadyCheckedIn,
    /// The PIN matched; mark the booking completed.
    Confirm,
}

/// Decide a check-in attempt by `user_id` with `pin` against a loaded booking.
///
/// The PIN is compared verbatim; no trimming or normalisation happens here.
pub fn check_in_outcome(
    booking: &Booking,
    user_id: Uuid,
    pin: &str,
) -> Result<CheckInOutcome, AppError> {
    validate_pin_format(pin)?;

    if booking.artist_id != user_id {
        return Err(AppError::Forbidden(
            "Only the booked artist can check in".to_string(),
        ));
    }
    if booking.status == status::CANCELLED {
        return Err(AppError::InvalidState(
            "Booking has been cancelled".to_string(),
        ));
    }
    if booking.checked_in {
        return Ok(CheckInOutcome::AlreadyCheckedIn);
    }
    if booking.confirmation_pin != pin {
        return Err(AppError::InvalidPin);
    }
    Ok(CheckInOutcome::Confirm)
}

/// Confirm the artist is on site by checking the venue-issued PIN.
///
/// # Process
///
/// 1. Validate the code is four digits
/// 2. Lock the booking; the caller must be its artist
/// 3. Compare the code with the stored PIN verbatim
/// 4. On match: set `checked_in`, `checked_in_at`, status `completed`
/// 5. Settle pending referral rewards for both parties
///
/// A wrong PIN never changes the booking. Checking in twice returns the booking unchanged.
pub async fn confirm_presence(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    booking_id: Uuid,
    pin: &str,
    referral_reward_cents: i64,
) -> Result<Booking, AppError> {
    validate_pin_format(pin)?;

    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::BookingNotFound)?;

    match check_in_outcome(&booking, auth.user_id, pin) {
        Ok(CheckInOutcome::AlreadyCheckedIn) => return Ok(booking),
        Ok(CheckInOutcome::Confirm) => {}
        Err(AppError::InvalidPin) => {
            tracing::warn!("Wrong check-in PIN for booking {}", booking_id);
            return Err(AppError::InvalidPin);
        }
        Err(e) => return Err(e),
    }

    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET checked_in = true,
            checked_in_at = NOW(),
            status = $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .bind(status::COMPLETED)
    .fetch_one(&mut *tx)
    .await?;

    for participant in [booking.artist_id, booking.venue_id] {
        referral_service::settle_for_user(&mut tx, participant, booking.id, referral_reward_cents)
            .await?;
    }

    tx.commit().await?;

    tracing::info!("Artist {} checked in for booking {}", auth.user_id, booking_id);
    publish_booking_changed(events, &booking);

    Ok(booking)
}

/// Cancel a booking and free its date on the artist's calendar.
///
/// Allowed for the booking's artist or venue, and for admins. Checked-in bookings
/// cannot be cancelled.
pub async fn cancel_booking(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    booking_id: Uuid,
) -> Result<Booking, AppError> {
    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::BookingNotFound)?;

    let is_party = booking.artist_id == auth.user_id || booking.venue_id == auth.user_id;
    if !is_party && auth.role != Role::Admin {
        return Err(AppError::BookingNotFound);
    }

    // Lock order: artist first, then booking, same as booking creation.
    db::lock_artist_booked_dates(&mut tx, booking.artist_id).await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;

    if booking.status == status::CANCELLED {
        return Err(AppError::InvalidState(
            "Booking is already cancelled".to_string(),
        ));
    }
    if booking.checked_in {
        return Err(AppError::InvalidState(
            "A checked-in booking cannot be cancelled".to_string(),
        ));
    }

    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(booking_id)
    .bind(status::CANCELLED)
    .fetch_one(&mut *tx)
    .await?;

    db::remove_booked_date(&mut tx, booking.artist_id, booking.event_date).await?;

    tx.commit().await?;

    tracing::info!("Booking {} cancelled by {}", booking_id, auth.user_id);
    publish_booking_changed(events, &booking);

    Ok(booking)
}

/// Mark a checked-in booking as paid out to the artist (admin only).
///
/// Records an `artist_payout` platform transaction for the fee minus the
/// platform's commission taken when the booking was made.
pub async fn mark_payout(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    booking_id: Uuid,
    fee_percent: i64,
) -> Result<Booking, AppError> {
    auth.require_admin()?;

    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::BookingNotFound)?;

    if !booking.checked_in {
        return Err(AppError::InvalidState(
            "Only checked-in bookings can be paid out".to_string(),
        ));
    }
    if booking.payout_status == payout::PAID {
        return Err(AppError::InvalidState(
            "Booking has already been paid out".to_string(),
        ));
    }

    let recorded: Option<i64> = sqlx::query_scalar(
        "SELECT platform_fee_cents FROM platform_transactions WHERE booking_id = $1 AND kind = $2",
    )
    .bind(booking_id)
    .bind(platform_kind::BOOKING_PAYMENT)
    .fetch_optional(&mut *tx)
    .await?;

    let commission = match recorded {
        Some(commission) => commission,
        None => platform_fee(booking.fee_cents, fee_percent)?,
    };

    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET payout_status = $2,
            paid_out_at = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .bind(payout::PAID)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO platform_transactions (kind, booking_id, user_id, amount_cents, platform_fee_cents)
        VALUES ($1, $2, $3, $4, 0)
        "#,
    )
    .bind(platform_kind::ARTIST_PAYOUT)
    .bind(booking.id)
    .bind(booking.artist_id)
    .bind(booking.fee_cents - commission)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Booking {} paid out to artist {}", booking_id, booking.artist_id);
    publish_booking_changed(events, &booking);

    Ok(booking)
}

pub fn publish_booking_changed(events: &EventHub, booking: &Booking) {
    events.publish(RealtimeEvent::BookingChanged {
        booking_id: booking.id,
        artist_id: booking.artist_id,
        venue_id: booking.venue_id,
        status: booking.status.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::tests::sample_booking;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    #[test]
    fn pins_are_four_digits() {
        for _ in 0..500 {
            let pin = generate_confirmation_pin();
            assert_eq!(pin.len(), 4);
            assert!(validate_pin_format(&pin).is_ok());
            let value: u16 = pin.parse().unwrap();
            assert!((1000..=9999).contains(&value));
        }
    }

    #[test]
    fn malformed_pins_are_rejected() {
        for pin in ["", "123", "12345", "12a4", " 1234", "١٢٣٤"] {
            assert!(validate_pin_format(pin).is_err(), "accepted {pin:?}");
        }
        assert!(validate_pin_format("0042").is_ok());
    }

    #[test]
    fn wrong_pin_is_rejected_without_touching_the_booking() {
        let (artist, venue) = (Uuid::new_v4(), Uuid::new_v4());
        let booking = sample_booking(artist, venue);

        assert!(matches!(
            check_in_outcome(&booking, artist, "1234"),
            Err(AppError::InvalidPin)
        ));
        assert!(!booking.checked_in);
        assert_eq!(booking.status, status::CONFIRMED);
        assert_eq!(
            check_in_outcome(&booking, artist, "4821").unwrap(),
            CheckInOutcome::Confirm
        );
    }

    #[test]
    fn padded_pin_is_not_trimmed() {
        let (artist, venue) = (Uuid::new_v4(), Uuid::new_v4());
        let booking = sample_booking(artist, venue);

        for pin in [" 4821", "4821 ", "4821\n"] {
            assert!(check_in_outcome(&booking, artist, pin).is_err(), "accepted {pin:?}");
        }
    }

    #[test]
    fn only_the_booked_artist_can_check_in() {
        let (artist, venue) = (Uuid::new_v4(), Uuid::new_v4());
        let booking = sample_booking(artist, venue);

        for user in [venue, Uuid::new_v4()] {
            assert!(matches!(
                check_in_outcome(&booking, user, "4821"),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn cancelled_bookings_cannot_be_checked_in() {
        let (artist, venue) = (Uuid::new_v4(), Uuid::new_v4());
        let mut booking = sample_booking(artist, venue);
        booking.status = status::CANCELLED.to_string();

        assert!(matches!(
            check_in_outcome(&booking, artist, "4821"),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn repeated_check_in_is_a_no_op() {
        let (artist, venue) = (Uuid::new_v4(), Uuid::new_v4());
        let mut booking = sample_booking(artist, venue);
        booking.checked_in = true;
        booking.status = status::COMPLETED.to_string();

        assert_eq!(
            check_in_outcome(&booking, artist, "4821").unwrap(),
            CheckInOutcome::AlreadyCheckedIn
        );
        assert_eq!(
            check_in_outcome(&booking, artist, "9999").unwrap(),
            CheckInOutcome::AlreadyCheckedIn
        );
    }

    #[test]
    fn booking_dates_are_sorted_and_checked() {
        let today = day(10);
        let dates = validate_booking_dates(&[day(20), day(12), day(15)], today).unwrap();
        assert_eq!(dates, vec![day(12), day(15), day(20)]);

        assert!(validate_booking_dates(&[], today).is_err());
        assert!(validate_booking_dates(&[day(12), day(12)], today).is_err());
        assert!(validate_booking_dates(&[day(9)], today).is_err());
        assert!(validate_booking_dates(&[day(10)], today).is_ok());
    }

    #[test]
    fn too_many_dates_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..=MAX_DATES_PER_REQUEST as u64)
            .map(|i| today + chrono::Days::new(i))
            .collect();
        assert!(validate_booking_dates(&dates, today).is_err());
    }

    #[test]
    fn conflicts_are_detected_against_booked_dates() {
        let booked = vec!["2026-11-12".to_string(), "2026-11-30".to_string()];
        assert_eq!(find_conflict(&booked, &[day(11), day(12)]), Some(day(12)));
        assert_eq!(find_conflict(&booked, &[day(11), day(13)]), None);
        assert_eq!(find_conflict(&[], &[day(11)]), None);
    }

    #[test]
    fn n_dates_plan_n_bookings_each_with_a_pin() {
        let dates = vec![day(12), day(13), day(14)];
        let planned = plan_bookings(&dates, 40000, &HashMap::new(), None);

        assert_eq!(planned.len(), dates.len());
        for (plan, date) in planned.iter().zip(&dates) {
            assert_eq!(plan.event_date, *date);
            assert_eq!(plan.fee_cents, 40000);
            assert!(validate_pin_format(&plan.confirmation_pin).is_ok());
        }

        let booked: Vec<String> = planned.iter().map(|p| db::date_key(p.event_date)).collect();
        assert_eq!(booked, vec!["2026-11-12", "2026-11-13", "2026-11-14"]);
    }

    #[test]
    fn special_prices_override_base_fee() {
        let specials = HashMap::from([(day(30), 90000)]);
        let planned = plan_bookings(&[day(29), day(30)], 40000, &specials, None);
        assert_eq!(planned[0].fee_cents, 40000);
        assert_eq!(planned[1].fee_cents, 90000);
    }

    #[test]
    fn agreed_fee_wins_over_special_price() {
        let specials = HashMap::from([(day(30), 90000)]);
        let planned = plan_bookings(&[day(30)], 40000, &specials, Some(55000));
        assert_eq!(planned[0].fee_cents, 55000);
    }

    #[test]
    fn platform_fee_rounds_down() {
        assert_eq!(platform_fee(45000, 10).unwrap(), 4500);
        assert_eq!(platform_fee(999, 10).unwrap(), 99);
        assert_eq!(platform_fee(1000, 0).unwrap(), 0);
    }

    #[test]
    fn platform_fee_on_huge_amounts_is_an_error_not_a_panic() {
        assert!(matches!(
            platform_fee(i64::MAX / 5, 10),
            Err(AppError::InvalidRequest(_))
        ));
        assert_eq!(platform_fee(MAX_FEE_CENTS, 100).unwrap(), MAX_FEE_CENTS);
    }

    #[test]
    fn fees_are_capped() {
        assert!(validate_fee_cents(0, "fee_cents").is_ok());
        assert!(validate_fee_cents(MAX_FEE_CENTS, "fee_cents").is_ok());
        assert!(validate_fee_cents(MAX_FEE_CENTS + 1, "fee_cents").is_err());
        assert!(validate_fee_cents(-1, "fee_cents").is_err());
    }
}
