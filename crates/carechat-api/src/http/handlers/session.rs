//! Session start HTTP handler.
//!
//! Endpoints:
//! - POST /api/v1/sessions - Validate a registration and start a session

use std::time::Instant;

use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use carechat_core::intake::start_session;
use carechat_types::registration::{RegistrationInput, SessionContext, SessionStart};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;

/// Request body: the registration form plus the session's classification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[serde(flatten)]
    pub registration: RegistrationInput,
    #[serde(default)]
    pub healthcare_context: String,
    #[serde(default)]
    pub privacy_style: String,
}

/// POST /api/v1/sessions - Start a session from a registration.
///
/// Rejected registrations answer 400 with one message per failing field.
pub async fn start(
    Json(body): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionStart>>), AppError> {
    let started = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.healthcare_context.trim().is_empty() || body.privacy_style.trim().is_empty() {
        return Err(AppError::Validation(
            "healthcareContext and privacyStyle are required".to_string(),
        ));
    }
    let context = SessionContext {
        healthcare_context: body.healthcare_context,
        privacy_style: body.privacy_style,
    };

    let session = start_session(&body.registration, context, Utc::now())?;

    let elapsed = started.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(session, request_id, elapsed);

    Ok((StatusCode::CREATED, Json(resp)))
}

#[cfg(test)]
mod tests {
    use carechat_types::registration::RegistrationField;

    use super::*;

    fn request(json: &str) -> StartSessionRequest {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_start_session_created() {
        let body = request(
            r#"{"firstName":" Ada ","lastName":"Lovelace","dateOfBirth":"1990-12-10",
                "healthcareContext":"primary-care","privacyStyle":"strict"}"#,
        );

        let (code, Json(resp)) = start(Json(body)).await.unwrap();
        assert_eq!(code, StatusCode::CREATED);

        let session = resp.data.unwrap();
        assert_eq!(session.user.full_name, "Ada Lovelace");
        assert_eq!(session.healthcare_context, "primary-care");
        assert!(Uuid::parse_str(&session.session_id).is_ok());
    }

    #[tokio::test]
    async fn test_start_session_reports_every_field() {
        let body = request(
            r#"{"firstName":"","lastName":"L","dateOfBirth":"",
                "healthcareContext":"general","privacyStyle":"balanced"}"#,
        );

        match start(Json(body)).await {
            Err(AppError::Registration(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.contains(RegistrationField::FirstName));
                assert!(errors.contains(RegistrationField::LastName));
                assert!(errors.contains(RegistrationField::DateOfBirth));
            }
            other => panic!("expected registration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_session_requires_context() {
        let body = request(r#"{"firstName":"Ada","lastName":"Lovelace","dateOfBirth":"1990-12-10"}"#);
        let err = start(Json(body)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
