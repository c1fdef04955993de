//! Session start from a registration.

use carechat_types::registration::{
    FieldErrors, RegistrationInput, SessionContext, SessionStart,
};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::validator::validate;

/// Validate `input` and open a session for it.
///
/// The user's age is computed against `now`'s date and frozen into the
/// returned payload; later log entries for the session reuse it.
pub fn start_session(
    input: &RegistrationInput,
    context: SessionContext,
    now: DateTime<Utc>,
) -> Result<SessionStart, FieldErrors> {
    let user = validate(input, now.date_naive())?;
    let session_id = Uuid::now_v7().to_string();

    debug!(
        session_id = %session_id,
        healthcare_context = %context.healthcare_context,
        "session started"
    );

    Ok(SessionStart {
        session_id,
        user,
        healthcare_context: context.healthcare_context,
        privacy_style: context.privacy_style,
        started_at: now,
    })
}
