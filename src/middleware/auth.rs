//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the Authorization header
//! 2. Hash it and verify it exists in the database
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        api_key::{ApiKey, hash_api_key},
        user::Role,
    },
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// Inserted into the request's extension map; handlers extract it with
/// `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated user. Profile ids equal this id.
    pub user_id: Uuid,

    pub role: Role,

    pub display_name: String,
}

impl AuthContext {
    /// Reject the request unless the caller has `role`.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires the {role} role"
            )))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_role(Role::Admin)
    }
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Hash the `<key>` using SHA-256
/// 3. Query database for matching hash where `is_active = true`
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
pub async fn auth_middleware(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    // Expected format: "Bearer <api_key>"
    let api_key = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidApiKey)?;

    let key_hash = hash_api_key(api_key);

    let api_key_record = sqlx::query_as::<_, ApiKey>(
        "SELECT k.id, k.user_id, k.key_hash, u.role, u.display_name, k.created_at, k.is_active
         FROM api_keys k
         JOIN users u ON u.id = k.user_id
         WHERE k.key_hash = $1 AND k.is_active = true",
    )
    .bind(&key_hash)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidApiKey)?;

    let role = api_key_record.role.parse::<Role>().map_err(|e| {
        tracing::error!("User {} has an unreadable role: {}", api_key_record.user_id, e);
        AppError::InvalidApiKey
    })?;

    let auth_context = AuthContext {
        user_id: api_key_record.user_id,
        role,
        display_name: api_key_record.display_name,
    };

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_role_rejects_other_roles() {
        let ctx = AuthContext {
            user_id: Uuid::new_v4(),
            role: Role::Artist,
            display_name: "Owls".into(),
        };
        assert!(ctx.require_role(Role::Artist).is_ok());
        assert!(matches!(
            ctx.require_role(Role::Venue),
            Err(AppError::Forbidden(_))
        ));
        assert!(ctx.require_admin().is_err());
    }
}
