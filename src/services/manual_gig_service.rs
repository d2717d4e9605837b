//! Manual gig service - off-platform gigs and the merged calendar.
//!
//! Manual gigs share the artist's booked-date list with platform bookings, so
//! every mutation locks the artist row and updates the list in one transaction.

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::{
        booking::{EnrichedBookingRow, status},
        manual_gig::{CalendarEntry, CalendarQuery, CalendarSource, ManualGig, ManualGigRequest},
    },
    services::booking_service,
};
use uuid::Uuid;

fn validate_request(request: &ManualGigRequest) -> Result<(), AppError> {
    if request.venue_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "venue_name must not be empty".to_string(),
        ));
    }
    booking_service::validate_fee_cents(request.fee_cents, "fee_cents")
}

/// Record an off-platform gig and block its date.
///
/// # Errors
///
/// - `ArtistNotFound`: the caller has no artist profile
/// - `DateUnavailable`: the date is already booked or has another gig
pub async fn create_gig(
    pool: &DbPool,
    artist_id: Uuid,
    request: ManualGigRequest,
) -> Result<ManualGig, AppError> {
    validate_request(&request)?;

    let mut tx = pool.begin().await?;

    let booked_dates = db::lock_artist_booked_dates(&mut tx, artist_id)
        .await?
        .ok_or(AppError::ArtistNotFound)?;

    if let Some(date) = booking_service::find_conflict(&booked_dates, &[request.event_date]) {
        return Err(AppError::DateUnavailable(date));
    }

    let gig = sqlx::query_as::<_, ManualGig>(
        r#"
        INSERT INTO manual_gigs (artist_id, event_date, venue_name, city, fee_cents, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(artist_id)
    .bind(request.event_date)
    .bind(request.venue_name.trim())
    .bind(&request.city)
    .bind(request.fee_cents)
    .bind(&request.notes)
    .fetch_one(&mut *tx)
    .await?;

    db::add_booked_dates(&mut tx, artist_id, &[gig.event_date]).await?;

    tx.commit().await?;

    tracing::info!("Artist {} recorded manual gig on {}", artist_id, gig.event_date);

    Ok(gig)
}

/// Replace a manual gig. Moving it to another date frees the old date.
pub async fn update_gig(
    pool: &DbPool,
    artist_id: Uuid,
    gig_id: Uuid,
    request: ManualGigRequest,
) -> Result<ManualGig, AppError> {
    validate_request(&request)?;

    let mut tx = pool.begin().await?;

    let booked_dates = db::lock_artist_booked_dates(&mut tx, artist_id)
        .await?
        .ok_or(AppError::ArtistNotFound)?;

    let existing = sqlx::query_as::<_, ManualGig>(
        "SELECT * FROM manual_gigs WHERE id = $1 AND artist_id = $2 FOR UPDATE",
    )
    .bind(gig_id)
    .bind(artist_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::GigNotFound)?;

    let date_changed = existing.event_date != request.event_date;
    if date_changed {
        if let Some(date) = booking_service::find_conflict(&booked_dates, &[request.event_date]) {
            return Err(AppError::DateUnavailable(date));
        }
    }

    let gig = sqlx::query_as::<_, ManualGig>(
        r#"
        UPDATE manual_gigs
        SET event_date = $3,
            venue_name = $4,
            city = $5,
            fee_cents = $6,
            notes = $7,
            updated_at = NOW()
        WHERE id = $1 AND artist_id = $2
        RETURNING *
        "#,
    )
    .bind(gig_id)
    .bind(artist_id)
    .bind(request.event_date)
    .bind(request.venue_name.trim())
    .bind(&request.city)
    .bind(request.fee_cents)
    .bind(&request.notes)
    .fetch_one(&mut *tx)
    .await?;

    if date_changed {
        db::remove_booked_date(&mut tx, artist_id, existing.event_date).await?;
        db::add_booked_dates(&mut tx, artist_id, &[gig.event_date]).await?;
    }

    tx.commit().await?;

    Ok(gig)
}

/// Delete a manual gig and free its date.
pub async fn delete_gig(pool: &DbPool, artist_id: Uuid, gig_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    db::lock_artist_booked_dates(&mut tx, artist_id)
        .await?
        .ok_or(AppError::ArtistNotFound)?;

    let deleted = sqlx::query_as::<_, ManualGig>(
        "DELETE FROM manual_gigs WHERE id = $1 AND artist_id = $2 RETURNING *",
    )
    .bind(gig_id)
    .bind(artist_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::GigNotFound)?;

    db::remove_booked_date(&mut tx, artist_id, deleted.event_date).await?;

    tx.commit().await?;

    tracing::info!("Artist {} deleted manual gig {}", artist_id, gig_id);

    Ok(())
}

pub async fn list_gigs(pool: &DbPool, artist_id: Uuid) -> Result<Vec<ManualGig>, AppError> {
    let gigs = sqlx::query_as::<_, ManualGig>(
        "SELECT * FROM manual_gigs WHERE artist_id = $1 ORDER BY event_date",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(gigs)
}

/// The artist's calendar: active platform bookings and manual gigs, by date.
pub async fn calendar(
    pool: &DbPool,
    artist_id: Uuid,
    query: &CalendarQuery,
) -> Result<Vec<CalendarEntry>, AppError> {
    let bookings = sqlx::query_as::<_, EnrichedBookingRow>(&format!(
        r#"
        {}
        WHERE b.artist_id = $1
          AND b.status <> $2
          AND ($3::date IS NULL OR b.event_date >= $3)
          AND ($4::date IS NULL OR b.event_date <= $4)
        "#,
        booking_service::ENRICHED_SELECT
    ))
    .bind(artist_id)
    .bind(status::CANCELLED)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(pool)
    .await?;

    let gigs = sqlx::query_as::<_, ManualGig>(
        r#"
        SELECT * FROM manual_gigs
        WHERE artist_id = $1
          AND ($2::date IS NULL OR event_date >= $2)
          AND ($3::date IS NULL OR event_date <= $3)
        "#,
    )
    .bind(artist_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(pool)
    .await?;

    Ok(merge_calendar(bookings, gigs))
}

/// Merge bookings and manual gigs into one list sorted by date.
///
/// Cancelled bookings are skipped. On the same date, platform bookings come first.
pub fn merge_calendar(bookings: Vec<EnrichedBookingRow>, gigs: Vec<ManualGig>) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = bookings
        .into_iter()
        .filter(|row| row.booking.status != status::CANCELLED)
        .map(|row| CalendarEntry {
            id: row.booking.id,
            source: CalendarSource::Platform,
            event_date: row.booking.event_date,
            venue_name: row.venue_name,
            city: row.venue_city,
            fee_cents: row.booking.fee_cents,
            status: row.booking.status,
            checked_in: row.booking.checked_in,
        })
        .chain(gigs.into_iter().map(|gig| CalendarEntry {
            id: gig.id,
            source: CalendarSource::Manual,
            event_date: gig.event_date,
            venue_name: gig.venue_name,
            city: gig.city,
            fee_cents: gig.fee_cents,
            status: "manual".to_string(),
            checked_in: false,
        }))
        .collect();

    entries.sort_by_key(|entry| (entry.event_date, entry.source == CalendarSource::Manual));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::tests::sample_booking;
    use chrono::{NaiveDate, Utc};

    fn gig(date: NaiveDate) -> ManualGig {
        ManualGig {
            id: Uuid::new_v4(),
            artist_id: Uuid::new_v4(),
            event_date: date,
            venue_name: "Village Hall".into(),
            city: Some("Otley".into()),
            fee_cents: 20000,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn row(date: NaiveDate, booking_status: &str) -> EnrichedBookingRow {
        let mut booking = sample_booking(Uuid::new_v4(), Uuid::new_v4());
        booking.event_date = date;
        booking.status = booking_status.to_string();
        EnrichedBookingRow {
            booking,
            artist_name: "Owls".into(),
            artist_image_url: None,
            venue_name: "The Brudenell".into(),
            venue_city: Some("Leeds".into()),
            venue_image_url: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    #[test]
    fn calendar_is_sorted_and_tagged() {
        let entries = merge_calendar(
            vec![row(day(20), status::CONFIRMED), row(day(5), status::COMPLETED)],
            vec![gig(day(12)), gig(day(20))],
        );

        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.event_date).collect();
        assert_eq!(dates, vec![day(5), day(12), day(20), day(20)]);
        assert_eq!(entries[1].source, CalendarSource::Manual);
        assert_eq!(entries[2].source, CalendarSource::Platform);
        assert_eq!(entries[3].source, CalendarSource::Manual);
        assert_eq!(entries[0].venue_name, "The Brudenell");
    }

    #[test]
    fn cancelled_bookings_are_left_out() {
        let entries = merge_calendar(vec![row(day(3), status::CANCELLED)], vec![]);
        assert!(entries.is_empty());
    }

    #[test]
    fn blank_venue_name_is_rejected() {
        let request = ManualGigRequest {
            event_date: day(1),
            venue_name: "  ".into(),
            city: None,
            fee_cents: 0,
            notes: None,
        };
        assert!(validate_request(&request).is_err());
    }
}
