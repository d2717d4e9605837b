//! User registration and identity endpoints.
//!
//! - POST /api/v1/users - Register (public); returns the API key once
//! - GET /api/v1/users/me - The authenticated user

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        api_key::{generate_api_key, hash_api_key},
        user::{RegisterRequest, RegisterResponse, Role, User},
    },
    services::referral_service,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

/// Attempts at drawing an unused referral code before giving up.
const REFERRAL_CODE_ATTEMPTS: usize = 5;

fn validate_registration(request: &RegisterRequest) -> Result<(), AppError> {
    let email = request.email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AppError::InvalidRequest("Invalid email address".to_string()));
    }
    if request.display_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "display_name must not be empty".to_string(),
        ));
    }
    if request.role == Role::Admin {
        return Err(AppError::Forbidden(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }
    Ok(())
}

/// Register a new user.
///
/// # Endpoint
///
/// `POST /api/v1/users` (no authentication)
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "user": {
///     "id": "550e8400-...",
///     "email": "band@example.com",
///     "display_name": "The Midnight Owls",
///     "role": "artist",
///     "referral_code": "Q7MZ4K2D",
///     "created_at": "2026-10-19T10:00:00Z"
///   },
///   "api_key": "9f86d081884c7d659a2feaa0c55ad015..."
/// }
/// ```
///
/// The raw API key is never shown again; only its SHA-256 hash is stored.
/// A `referral_code` in the request is redeemed in the same transaction.
pub async fn register(
    State(pool): State<DbPool>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    validate_registration(&request)?;

    let email = request.email.trim().to_lowercase();

    let mut tx = pool.begin().await?;

    let email_taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&email)
        .fetch_one(&mut *tx)
        .await?;
    if email_taken {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let mut referral_code = None;
    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let candidate = referral_service::generate_referral_code();
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE referral_code = $1)")
                .bind(&candidate)
                .fetch_one(&mut *tx)
                .await?;
        if !taken {
            referral_code = Some(candidate);
            break;
        }
    }
    let referral_code = referral_code.ok_or_else(|| {
        AppError::Conflict("Could not allocate a referral code, please retry".to_string())
    })?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, display_name, role, referral_code)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, display_name, role, referral_code, created_at
        "#,
    )
    .bind(&email)
    .bind(request.display_name.trim())
    .bind(request.role.as_str())
    .bind(&referral_code)
    .fetch_one(&mut *tx)
    .await?;

    let api_key = generate_api_key();

    sqlx::query("INSERT INTO api_keys (user_id, key_hash) VALUES ($1, $2)")
        .bind(user.id)
        .bind(hash_api_key(&api_key))
        .execute(&mut *tx)
        .await?;

    if let Some(code) = request.referral_code.as_deref().filter(|c| !c.trim().is_empty()) {
        referral_service::redeem_code(&mut tx, user.id, code).await?;
    }

    tx.commit().await?;

    tracing::info!("Registered {} user {}", user.role, user.id);

    Ok((StatusCode::CREATED, Json(RegisterResponse { user, api_key })))
}

/// Get the authenticated user.
pub async fn me(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, display_name, role, referral_code, created_at FROM users WHERE id = $1",
    )
    .bind(auth.user_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, role: Role) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            display_name: "The Owls".into(),
            role,
            referral_code: None,
        }
    }

    #[test]
    fn registration_checks_email_shape() {
        assert!(validate_registration(&request("owls@example.com", Role::Artist)).is_ok());
        assert!(validate_registration(&request("owls", Role::Artist)).is_err());
        assert!(validate_registration(&request("@example.com", Role::Artist)).is_err());
        assert!(validate_registration(&request("owls@localhost", Role::Artist)).is_err());
    }

    #[test]
    fn admins_cannot_self_register() {
        assert!(matches!(
            validate_registration(&request("root@example.com", Role::Admin)),
            Err(AppError::Forbidden(_))
        ));
    }
}
