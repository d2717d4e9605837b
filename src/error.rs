//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid or missing API keys, wrong role
/// - **Resource Errors**: Requested resources not found
/// - **Business Logic Errors**: Operations that violate marketplace rules
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// API key is missing, invalid, or inactive.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Authenticated user may not perform this action.
    #[error("{0}")]
    Forbidden(String),

    #[error("Artist not found")]
    ArtistNotFound,

    #[error("Venue not found")]
    VenueNotFound,

    #[error("Musician not found")]
    MusicianNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Gig not found")]
    GigNotFound,

    #[error("Offer not found")]
    OfferNotFound,

    #[error("Application not found")]
    ApplicationNotFound,

    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Special price not found")]
    SpecialPriceNotFound,

    #[error("Referral code not found")]
    ReferralCodeNotFound,

    /// The artist already has something on this date.
    #[error("Artist is not available on {0}")]
    DateUnavailable(NaiveDate),

    /// Submitted check-in code does not match the booking's PIN.
    #[error("Confirmation PIN does not match")]
    InvalidPin,

    /// The resource is in a state that does not allow the operation.
    #[error("{0}")]
    InvalidState(String),

    /// The operation would duplicate an existing record.
    #[error("{0}")]
    Conflict(String),

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::ArtistNotFound => (StatusCode::NOT_FOUND, "artist_not_found"),
            AppError::VenueNotFound => (StatusCode::NOT_FOUND, "venue_not_found"),
            AppError::MusicianNotFound => (StatusCode::NOT_FOUND, "musician_not_found"),
            AppError::BookingNotFound => (StatusCode::NOT_FOUND, "booking_not_found"),
            AppError::GigNotFound => (StatusCode::NOT_FOUND, "gig_not_found"),
            AppError::OfferNotFound => (StatusCode::NOT_FOUND, "offer_not_found"),
            AppError::ApplicationNotFound => (StatusCode::NOT_FOUND, "application_not_found"),
            AppError::ConversationNotFound => (StatusCode::NOT_FOUND, "conversation_not_found"),
            AppError::TransactionNotFound => (StatusCode::NOT_FOUND, "transaction_not_found"),
            AppError::SpecialPriceNotFound => (StatusCode::NOT_FOUND, "special_price_not_found"),
            AppError::ReferralCodeNotFound => (StatusCode::NOT_FOUND, "referral_code_not_found"),
            AppError::DateUnavailable(_) => (StatusCode::CONFLICT, "date_unavailable"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::InvalidPin => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_pin"),
            AppError::InvalidState(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_state"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        }
    }
}

/// Unique-constraint violations become `Conflict`; a concurrent insert that
/// slipped past an existence check is the caller's mistake, not a server fault.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some("users_email_key") => "Email is already registered",
                    _ => "A conflicting record already exists",
                };
                return AppError::Conflict(message.to_string());
            }
        }
        AppError::Database(err)
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Database errors are logged and reported to the client as a generic
/// `internal_error` without details.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::InvalidRequest(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pin_maps_to_unprocessable_entity() {
        let response = AppError::InvalidPin.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn date_unavailable_is_a_conflict() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let err = AppError::DateUnavailable(date);
        assert_eq!(err.to_string(), "Artist is not available on 2026-05-01");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn database_errors_are_hidden_behind_500() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[derive(Debug)]
    struct UniqueViolation(Option<&'static str>);

    impl std::fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl sqlx::error::DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some("23505".into())
        }

        fn constraint(&self) -> Option<&str> {
            self.0
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn duplicate_email_race_is_a_conflict_not_a_500() {
        let err = AppError::from(sqlx::Error::Database(Box::new(UniqueViolation(Some(
            "users_email_key",
        )))));
        assert!(matches!(&err, AppError::Conflict(msg) if msg == "Email is already registered"));
        assert_eq!(err.status_and_code(), (StatusCode::CONFLICT, "conflict"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let other = AppError::from(sqlx::Error::Database(Box::new(UniqueViolation(None))));
        assert!(matches!(other, AppError::Conflict(_)));
    }

    #[test]
    fn other_sqlx_errors_stay_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn not_found_variants_have_distinct_codes() {
        assert_eq!(AppError::BookingNotFound.status_and_code().1, "booking_not_found");
        assert_eq!(AppError::GigNotFound.status_and_code().1, "gig_not_found");
        assert_eq!(AppError::ArtistNotFound.status_and_code().0, StatusCode::NOT_FOUND);
    }
}
