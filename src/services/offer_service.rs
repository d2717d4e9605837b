//! Offer service - direct offers and open gig postings.
//!
//! Accepting an offer or an application books the artist through
//! `booking_service::book_dates` in the same transaction as the status change.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        booking::Booking,
        offer::{
            ApplyToGigRequest, CreateOfferRequest, CreateOpenGigRequest, GigApplication, Offer,
            OpenGig, OpenGigFilter, application_status, gig_status, offer_status,
        },
        user::Role,
    },
    realtime::{EventHub, RealtimeEvent},
    services::booking_service::{self, BookingOrigin},
};
use chrono::NaiveDate;
use uuid::Uuid;

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn ensure_future(date: NaiveDate) -> Result<(), AppError> {
    if date < today() {
        return Err(AppError::InvalidRequest(format!("{date} is in the past")));
    }
    Ok(())
}

/// What an offer response does, and who may do it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferResponse {
    Decline,
    Withdraw,
}

impl OfferResponse {
    fn required_role(self) -> Role {
        match self {
            OfferResponse::Decline => Role::Artist,
            OfferResponse::Withdraw => Role::Venue,
        }
    }

    fn new_status(self) -> &'static str {
        match self {
            OfferResponse::Decline => offer_status::DECLINED,
            OfferResponse::Withdraw => offer_status::WITHDRAWN,
        }
    }
}

fn publish_offer(events: &EventHub, offer: &Offer) {
    events.publish(RealtimeEvent::OfferChanged {
        offer_id: offer.id,
        artist_id: offer.artist_id,
        venue_id: offer.venue_id,
        status: offer.status.clone(),
    });
}

fn publish_application(events: &EventHub, gig: &OpenGig, application: &GigApplication) {
    events.publish(RealtimeEvent::GigApplicationChanged {
        gig_id: gig.id,
        application_id: application.id,
        artist_id: application.artist_id,
        venue_id: gig.venue_id,
        status: application.status.clone(),
    });
}

async fn ensure_venue_profile(pool: &DbPool, venue_id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM venues WHERE id = $1)")
        .bind(venue_id)
        .fetch_one(pool)
        .await?;
    if exists { Ok(()) } else { Err(AppError::VenueNotFound) }
}

/// Send a direct offer from the caller's venue to an artist.
pub async fn create_offer(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    request: CreateOfferRequest,
) -> Result<Offer, AppError> {
    auth.require_role(Role::Venue)?;
    ensure_future(request.event_date)?;
    booking_service::validate_fee_cents(request.fee_cents, "fee_cents")?;
    ensure_venue_profile(pool, auth.user_id).await?;

    let artist_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM artists WHERE id = $1)")
        .bind(request.artist_id)
        .fetch_one(pool)
        .await?;
    if !artist_exists {
        return Err(AppError::ArtistNotFound);
    }

    let offer = sqlx::query_as::<_, Offer>(
        r#"
        INSERT INTO offers (venue_id, artist_id, event_date, fee_cents, message, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(request.artist_id)
    .bind(request.event_date)
    .bind(request.fee_cents)
    .bind(&request.message)
    .bind(offer_status::PENDING)
    .fetch_one(pool)
    .await?;

    tracing::info!("Venue {} sent offer {} to artist {}", auth.user_id, offer.id, offer.artist_id);
    publish_offer(events, &offer);

    Ok(offer)
}

/// Offers sent or received by the caller, newest first.
pub async fn list_offers(pool: &DbPool, user_id: Uuid) -> Result<Vec<Offer>, AppError> {
    let offers = sqlx::query_as::<_, Offer>(
        "SELECT * FROM offers WHERE venue_id = $1 OR artist_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(offers)
}

/// Accept a pending offer: books the artist at the offered fee.
pub async fn accept_offer(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    offer_id: Uuid,
    fee_percent: i64,
) -> Result<(Offer, Booking), AppError> {
    auth.require_role(Role::Artist)?;

    let mut tx = pool.begin().await?;

    let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1 FOR UPDATE")
        .bind(offer_id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(|o| o.artist_id == auth.user_id)
        .ok_or(AppError::OfferNotFound)?;

    if offer.status != offer_status::PENDING {
        return Err(AppError::InvalidState(format!(
            "Offer is already {}",
            offer.status
        )));
    }
    ensure_future(offer.event_date)?;

    let booking = booking_service::book_single_date(
        &mut tx,
        offer.artist_id,
        offer.venue_id,
        offer.event_date,
        Some(offer.fee_cents),
        offer.message.clone(),
        BookingOrigin {
            offer_id: Some(offer.id),
            gig_id: None,
        },
        fee_percent,
    )
    .await?;

    let offer = sqlx::query_as::<_, Offer>(
        r#"
        UPDATE offers
        SET status = $2, booking_id = $3, responded_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(offer_id)
    .bind(offer_status::ACCEPTED)
    .bind(booking.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Artist {} accepted offer {}", auth.user_id, offer_id);
    publish_offer(events, &offer);
    booking_service::publish_booking_changed(events, &booking);

    Ok((offer, booking))
}

/// Decline (artist) or withdraw (venue) a pending offer.
pub async fn respond_to_offer(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    offer_id: Uuid,
    response: OfferResponse,
) -> Result<Offer, AppError> {
    auth.require_role(response.required_role())?;

    let column_owner = match response {
        OfferResponse::Decline => "artist_id",
        OfferResponse::Withdraw => "venue_id",
    };

    let offer = sqlx::query_as::<_, Offer>(&format!(
        r#"
        UPDATE offers
        SET status = $3, responded_at = NOW()
        WHERE id = $1 AND {column_owner} = $2 AND status = $4
        RETURNING *
        "#
    ))
    .bind(offer_id)
    .bind(auth.user_id)
    .bind(response.new_status())
    .bind(offer_status::PENDING)
    .fetch_optional(pool)
    .await?;

    let offer = match offer {
        Some(offer) => offer,
        None => {
            let existing = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
                .bind(offer_id)
                .fetch_optional(pool)
                .await?
                .filter(|o| o.artist_id == auth.user_id || o.venue_id == auth.user_id)
                .ok_or(AppError::OfferNotFound)?;
            return Err(AppError::InvalidState(format!(
                "Offer is already {}",
                existing.status
            )));
        }
    };

    publish_offer(events, &offer);

    Ok(offer)
}

/// Post an open gig for the caller's venue.
pub async fn create_open_gig(
    pool: &DbPool,
    auth: &AuthContext,
    request: CreateOpenGigRequest,
) -> Result<OpenGig, AppError> {
    auth.require_role(Role::Venue)?;
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "title must not be empty".to_string(),
        ));
    }
    ensure_future(request.event_date)?;
    booking_service::validate_fee_cents(request.budget_cents, "budget_cents")?;
    ensure_venue_profile(pool, auth.user_id).await?;

    let gig = sqlx::query_as::<_, OpenGig>(
        r#"
        INSERT INTO open_gigs (venue_id, title, description, event_date, budget_cents, genre, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(request.title.trim())
    .bind(&request.description)
    .bind(request.event_date)
    .bind(request.budget_cents)
    .bind(&request.genre)
    .bind(gig_status::OPEN)
    .fetch_one(pool)
    .await?;

    tracing::info!("Venue {} posted open gig {}", auth.user_id, gig.id);

    Ok(gig)
}

/// Open gigs from today (or `from`) onwards, soonest first.
pub async fn list_open_gigs(pool: &DbPool, filter: &OpenGigFilter) -> Result<Vec<OpenGig>, AppError> {
    let from = filter.from.unwrap_or_else(today);

    let gigs = sqlx::query_as::<_, OpenGig>(
        r#"
        SELECT * FROM open_gigs
        WHERE status = $1
          AND event_date >= $2
          AND ($3::text IS NULL OR genre ILIKE $3)
        ORDER BY event_date, created_at
        "#,
    )
    .bind(gig_status::OPEN)
    .bind(from)
    .bind(&filter.genre)
    .fetch_all(pool)
    .await?;

    Ok(gigs)
}

pub async fn get_open_gig(pool: &DbPool, gig_id: Uuid) -> Result<OpenGig, AppError> {
    sqlx::query_as::<_, OpenGig>("SELECT * FROM open_gigs WHERE id = $1")
        .bind(gig_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::GigNotFound)
}

/// Apply to an open gig as the calling artist. One application per artist per gig.
pub async fn apply_to_gig(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    gig_id: Uuid,
    request: ApplyToGigRequest,
) -> Result<GigApplication, AppError> {
    auth.require_role(Role::Artist)?;
    if let Some(fee) = request.proposed_fee_cents {
        booking_service::validate_fee_cents(fee, "proposed_fee_cents")?;
    }

    let gig = get_open_gig(pool, gig_id).await?;
    if gig.status != gig_status::OPEN {
        return Err(AppError::InvalidState(format!("Gig is {}", gig.status)));
    }

    let artist_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM artists WHERE id = $1)")
        .bind(auth.user_id)
        .fetch_one(pool)
        .await?;
    if !artist_exists {
        return Err(AppError::ArtistNotFound);
    }

    let application = sqlx::query_as::<_, GigApplication>(
        r#"
        INSERT INTO gig_applications (gig_id, artist_id, message, proposed_fee_cents, status)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (gig_id, artist_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(gig_id)
    .bind(auth.user_id)
    .bind(&request.message)
    .bind(request.proposed_fee_cents)
    .bind(application_status::PENDING)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("You have already applied to this gig".to_string()))?;

    publish_application(events, &gig, &application);

    Ok(application)
}

/// Applications to one of the caller's gigs.
pub async fn list_applications(
    pool: &DbPool,
    auth: &AuthContext,
    gig_id: Uuid,
) -> Result<Vec<GigApplication>, AppError> {
    let gig = get_open_gig(pool, gig_id).await?;
    if gig.venue_id != auth.user_id {
        return Err(AppError::GigNotFound);
    }

    let applications = sqlx::query_as::<_, GigApplication>(
        "SELECT * FROM gig_applications WHERE gig_id = $1 ORDER BY created_at",
    )
    .bind(gig_id)
    .fetch_all(pool)
    .await?;

    Ok(applications)
}

/// The calling artist's applications, newest first.
pub async fn list_my_applications(
    pool: &DbPool,
    artist_id: Uuid,
) -> Result<Vec<GigApplication>, AppError> {
    let applications = sqlx::query_as::<_, GigApplication>(
        "SELECT * FROM gig_applications WHERE artist_id = $1 ORDER BY created_at DESC",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(applications)
}

/// Fee an accepted application is booked at.
pub fn application_fee(application: &GigApplication, gig: &OpenGig) -> i64 {
    application.proposed_fee_cents.unwrap_or(gig.budget_cents)
}

/// Accept one application: books the artist, fills the gig, rejects the rest.
pub async fn accept_application(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    gig_id: Uuid,
    application_id: Uuid,
    fee_percent: i64,
) -> Result<(OpenGig, Booking), AppError> {
    auth.require_role(Role::Venue)?;

    let mut tx = pool.begin().await?;

    let gig = sqlx::query_as::<_, OpenGig>("SELECT * FROM open_gigs WHERE id = $1 FOR UPDATE")
        .bind(gig_id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(|g| g.venue_id == auth.user_id)
        .ok_or(AppError::GigNotFound)?;

    if gig.status != gig_status::OPEN {
        return Err(AppError::InvalidState(format!("Gig is {}", gig.status)));
    }
    ensure_future(gig.event_date)?;

    let application = sqlx::query_as::<_, GigApplication>(
        "SELECT * FROM gig_applications WHERE id = $1 AND gig_id = $2 FOR UPDATE",
    )
    .bind(application_id)
    .bind(gig_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::ApplicationNotFound)?;

    if application.status != application_status::PENDING {
        return Err(AppError::InvalidState(format!(
            "Application is already {}",
            application.status
        )));
    }

    let booking = booking_service::book_single_date(
        &mut tx,
        application.artist_id,
        gig.venue_id,
        gig.event_date,
        Some(application_fee(&application, &gig)),
        Some(gig.title.clone()),
        BookingOrigin {
            offer_id: None,
            gig_id: Some(gig.id),
        },
        fee_percent,
    )
    .await?;

    let accepted = sqlx::query_as::<_, GigApplication>(
        "UPDATE gig_applications SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(application_id)
    .bind(application_status::ACCEPTED)
    .fetch_one(&mut *tx)
    .await?;

    let rejected = sqlx::query_as::<_, GigApplication>(
        "UPDATE gig_applications SET status = $3 WHERE gig_id = $1 AND id <> $2 AND status = $4 RETURNING *",
    )
    .bind(gig_id)
    .bind(application_id)
    .bind(application_status::REJECTED)
    .bind(application_status::PENDING)
    .fetch_all(&mut *tx)
    .await?;

    let gig = sqlx::query_as::<_, OpenGig>(
        "UPDATE open_gigs SET status = $2, booking_id = $3 WHERE id = $1 RETURNING *",
    )
    .bind(gig_id)
    .bind(gig_status::FILLED)
    .bind(booking.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Venue {} filled gig {} with artist {}",
        auth.user_id,
        gig_id,
        accepted.artist_id
    );

    publish_application(events, &gig, &accepted);
    for application in &rejected {
        publish_application(events, &gig, application);
    }
    booking_service::publish_booking_changed(events, &booking);

    Ok((gig, booking))
}

/// Close an open gig without booking anyone. Pending applications are rejected.
pub async fn close_gig(
    pool: &DbPool,
    events: &EventHub,
    auth: &AuthContext,
    gig_id: Uuid,
) -> Result<OpenGig, AppError> {
    auth.require_role(Role::Venue)?;

    let mut tx = pool.begin().await?;

    let gig = sqlx::query_as::<_, OpenGig>("SELECT * FROM open_gigs WHERE id = $1 FOR UPDATE")
        .bind(gig_id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(|g| g.venue_id == auth.user_id)
        .ok_or(AppError::GigNotFound)?;

    if gig.status != gig_status::OPEN {
        return Err(AppError::InvalidState(format!("Gig is {}", gig.status)));
    }

    let rejected = sqlx::query_as::<_, GigApplication>(
        "UPDATE gig_applications SET status = $2 WHERE gig_id = $1 AND status = $3 RETURNING *",
    )
    .bind(gig_id)
    .bind(application_status::REJECTED)
    .bind(application_status::PENDING)
    .fetch_all(&mut *tx)
    .await?;

    let gig = sqlx::query_as::<_, OpenGig>(
        "UPDATE open_gigs SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(gig_id)
    .bind(gig_status::CLOSED)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    for application in &rejected {
        publish_application(events, &gig, application);
    }

    Ok(gig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn gig(budget_cents: i64) -> OpenGig {
        OpenGig {
            id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            title: "Friday headliner".into(),
            description: None,
            event_date: NaiveDate::from_ymd_opt(2026, 12, 4).unwrap(),
            budget_cents,
            genre: Some("jazz".into()),
            status: gig_status::OPEN.into(),
            booking_id: None,
            created_at: Utc::now(),
        }
    }

    fn application(proposed: Option<i64>) -> GigApplication {
        GigApplication {
            id: Uuid::new_v4(),
            gig_id: Uuid::new_v4(),
            artist_id: Uuid::new_v4(),
            message: None,
            proposed_fee_cents: proposed,
            status: application_status::PENDING.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn application_fee_falls_back_to_budget() {
        let gig = gig(30000);
        assert_eq!(application_fee(&application(Some(35000)), &gig), 35000);
        assert_eq!(application_fee(&application(None), &gig), 30000);
    }

    #[test]
    fn offer_responses_belong_to_the_right_side() {
        assert_eq!(OfferResponse::Decline.required_role(), Role::Artist);
        assert_eq!(OfferResponse::Withdraw.required_role(), Role::Venue);
        assert_eq!(OfferResponse::Decline.new_status(), offer_status::DECLINED);
        assert_eq!(OfferResponse::Withdraw.new_status(), offer_status::WITHDRAWN);
    }

    #[test]
    fn past_dates_are_rejected() {
        let yesterday = today().pred_opt().unwrap();
        assert!(ensure_future(yesterday).is_err());
        assert!(ensure_future(today()).is_ok());
    }
}
