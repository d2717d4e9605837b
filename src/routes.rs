//! HTTP router.
//!
//! Public routes: `GET /health`, `POST /api/v1/users`. Everything else under
//! `/api/v1` requires `Authorization: Bearer <api_key>`.

use crate::{handlers, middleware::auth::auth_middleware, state::AppState};
use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    let authenticated_routes = Router::new()
        .route("/api/v1/users/me", get(handlers::users::me))
        // Profiles
        .route("/api/v1/artists", get(handlers::artists::list_artists))
        .route("/api/v1/artists/me", put(handlers::artists::upsert_me))
        .route("/api/v1/artists/{id}", get(handlers::artists::get_artist))
        .route(
            "/api/v1/artists/{id}/availability",
            get(handlers::artists::get_availability),
        )
        .route("/api/v1/venues", get(handlers::venues::list_venues))
        .route("/api/v1/venues/me", put(handlers::venues::upsert_me))
        .route("/api/v1/venues/{id}", get(handlers::venues::get_venue))
        .route("/api/v1/musicians", get(handlers::musicians::list_musicians))
        .route("/api/v1/musicians/me", put(handlers::musicians::upsert_me))
        .route(
            "/api/v1/musicians/{id}",
            get(handlers::musicians::get_musician),
        )
        .route(
            "/api/v1/special-prices",
            get(handlers::special_prices::list_special_prices)
                .put(handlers::special_prices::set_special_price),
        )
        .route(
            "/api/v1/special-prices/{date}",
            delete(handlers::special_prices::delete_special_price),
        )
        // Bookings
        .route(
            "/api/v1/bookings",
            post(handlers::bookings::create_bookings).get(handlers::bookings::list_bookings),
        )
        .route("/api/v1/bookings/{id}", get(handlers::bookings::get_booking))
        .route(
            "/api/v1/bookings/{id}/check-in",
            post(handlers::bookings::check_in),
        )
        .route(
            "/api/v1/bookings/{id}/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route(
            "/api/v1/bookings/{id}/payout",
            post(handlers::bookings::mark_payout),
        )
        // Manual gigs and calendar
        .route(
            "/api/v1/manual-gigs",
            post(handlers::manual_gigs::create_manual_gig)
                .get(handlers::manual_gigs::list_manual_gigs),
        )
        .route(
            "/api/v1/manual-gigs/{id}",
            put(handlers::manual_gigs::update_manual_gig)
                .delete(handlers::manual_gigs::delete_manual_gig),
        )
        .route("/api/v1/calendar", get(handlers::manual_gigs::get_calendar))
        // Offers
        .route(
            "/api/v1/offers",
            post(handlers::offers::create_offer).get(handlers::offers::list_offers),
        )
        .route(
            "/api/v1/offers/{id}/accept",
            post(handlers::offers::accept_offer),
        )
        .route(
            "/api/v1/offers/{id}/decline",
            post(handlers::offers::decline_offer),
        )
        .route(
            "/api/v1/offers/{id}/withdraw",
            post(handlers::offers::withdraw_offer),
        )
        // Open gigs
        .route(
            "/api/v1/gigs",
            post(handlers::open_gigs::create_gig).get(handlers::open_gigs::list_gigs),
        )
        .route("/api/v1/gigs/{id}", get(handlers::open_gigs::get_gig))
        .route(
            "/api/v1/gigs/{id}/applications",
            post(handlers::open_gigs::apply).get(handlers::open_gigs::list_applications),
        )
        .route(
            "/api/v1/gigs/{id}/applications/{application_id}/accept",
            post(handlers::open_gigs::accept_application),
        )
        .route("/api/v1/gigs/{id}/close", post(handlers::open_gigs::close_gig))
        .route(
            "/api/v1/applications",
            get(handlers::open_gigs::my_applications),
        )
        // Chat
        .route(
            "/api/v1/conversations",
            post(handlers::conversations::open_conversation)
                .get(handlers::conversations::list_conversations),
        )
        .route(
            "/api/v1/conversations/{id}/messages",
            get(handlers::conversations::list_messages)
                .post(handlers::conversations::send_message),
        )
        .route(
            "/api/v1/conversations/{id}/read",
            post(handlers::conversations::mark_read),
        )
        .route(
            "/api/v1/messages/unread-count",
            get(handlers::conversations::unread_count),
        )
        // Finance
        .route(
            "/api/v1/finance/transactions",
            post(handlers::finance::create_transaction)
                .get(handlers::finance::list_transactions),
        )
        .route(
            "/api/v1/finance/transactions/{id}",
            put(handlers::finance::update_transaction)
                .delete(handlers::finance::delete_transaction),
        )
        .route("/api/v1/finance/summary", get(handlers::finance::summary))
        // Referrals
        .route("/api/v1/referrals", get(handlers::referrals::overview))
        .route(
            "/api/v1/referrals/redeem",
            post(handlers::referrals::redeem),
        )
        // Admin
        .route(
            "/api/v1/admin/platform-transactions",
            get(handlers::admin::list_platform_transactions),
        )
        .route("/api/v1/realtime", get(handlers::realtime::event_stream))
        .route_layer(axum_middleware::from_fn_with_state(
            state.pool.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/users", post(handlers::users::register))
        .merge(authenticated_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// Router over a pool that never connects; only paths that fail before
    /// touching the database can be exercised.
    fn test_router() -> Router {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        build_router(AppState::new(pool, config))
    }

    async fn error_code(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["error"]["code"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn missing_api_key_is_unauthorized() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/bookings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_api_key");
    }

    #[tokio::test]
    async fn non_bearer_authorization_is_unauthorized() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/realtime")
                    .header(header::AUTHORIZATION, "Basic b3dsczpob290")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_self_registration_is_forbidden() {
        let body = serde_json::json!({
            "email": "root@example.com",
            "display_name": "Root",
            "role": "admin"
        });

        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(response).await, "forbidden");
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/v2/bookings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
