//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        // Session intake
        .route("/sessions", post(handlers::session::start))
        // Chat log
        .route("/chat-logs", post(handlers::chat_log::append))
        .route("/chat-logs/{id}", get(handlers::chat_log::get_entry))
        .route(
            "/sessions/{id}/chat-logs",
            get(handlers::chat_log::list_for_session),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_session_then_chat_log_flow() {
        let (_dir, state) = crate::state::tests::sqlite_state().await;
        let router = build_router(state);

        let (status, body) = send(
            router.clone(),
            post_json(
                "/api/v1/sessions",
                serde_json::json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "dateOfBirth": "1990-12-10",
                    "healthcareContext": "primary-care",
                    "privacyStyle": "strict",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let session_id = body["data"]["sessionId"].as_str().unwrap().to_string();

        let (status, body) = send(
            router.clone(),
            post_json(
                "/api/v1/chat-logs",
                serde_json::json!({
                    "sessionId": session_id,
                    "healthcareContext": "primary-care",
                    "privacyStyle": "strict",
                    "userFirstName": "Ada",
                    "userLastName": "Lovelace",
                    "userAge": body["data"]["user"]["age"],
                    "userInput": "I have a headache",
                    "botReply": "How long has it lasted?",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(
            router.clone(),
            Request::get(format!("/api/v1/chat-logs/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["botReply"], "How long has it lasted?");
        assert_eq!(body["data"]["userFirstName"], "Ada");
        assert_eq!(body["data"]["userLastName"], "Lovelace");
        assert!(body["data"]["userAge"].is_u64());

        let (status, body) = send(
            router,
            Request::get(format!("/api/v1/sessions/{session_id}/chat-logs?limit=10"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_registration_envelope() {
        let (_dir, state) = crate::state::tests::sqlite_state().await;
        let router = build_router(state);

        let (status, body) = send(
            router,
            post_json(
                "/api/v1/sessions",
                serde_json::json!({
                    "firstName": "A",
                    "lastName": "Lovelace",
                    "dateOfBirth": "2099-01-01",
                    "healthcareContext": "general",
                    "privacyStyle": "balanced",
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = &body["errors"][0];
        assert_eq!(error["code"], "VALIDATION_ERROR");
        assert_eq!(
            error["details"]["firstName"],
            "First name must be at least 2 characters"
        );
        assert!(error["details"]["dateOfBirth"].is_string());
        assert!(error["details"].get("lastName").is_none());
    }

    #[tokio::test]
    async fn test_health_route() {
        let (_dir, state) = crate::state::tests::sqlite_state().await;
        let (status, body) = send(
            build_router(state),
            Request::get("/api/v1/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }
}
