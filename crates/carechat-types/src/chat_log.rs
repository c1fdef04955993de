//! Chat log types for Carechat.
//!
//! Every chat turn (user input plus bot reply) is persisted as one append-only
//! [`ChatLogEntry`]. Callers build a [`NewChatLogEntry`]; the store assigns the
//! `id` and `timestamp`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::registration::{SessionContext, SessionStart};

/// One persisted chat exchange. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLogEntry {
    /// Store-assigned, monotonically increasing.
    pub id: i64,
    pub session_id: String,
    pub healthcare_context: String,
    pub privacy_style: String,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_age: Option<u32>,
    pub user_input: String,
    pub bot_reply: String,
    /// Write time as recorded by the database clock.
    pub timestamp: NaiveDateTime,
}

/// A chat exchange that has not been written yet.
///
/// The identity fields are optional so anonymous sessions can be logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatLogEntry {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub healthcare_context: String,
    #[serde(default)]
    pub privacy_style: String,
    #[serde(default)]
    pub user_first_name: Option<String>,
    #[serde(default)]
    pub user_last_name: Option<String>,
    #[serde(default)]
    pub user_age: Option<u32>,
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub bot_reply: String,
}

impl NewChatLogEntry {
    /// Build an entry for a registered session, copying the frozen identity.
    pub fn for_session(
        session: &SessionStart,
        user_input: impl Into<String>,
        bot_reply: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session.session_id.clone(),
            healthcare_context: session.healthcare_context.clone(),
            privacy_style: session.privacy_style.clone(),
            user_first_name: Some(session.user.first_name.clone()),
            user_last_name: Some(session.user.last_name.clone()),
            user_age: Some(session.user.age),
            user_input: user_input.into(),
            bot_reply: bot_reply.into(),
        }
    }

    /// Build an entry for a session with no registered user.
    pub fn anonymous(
        session_id: impl Into<String>,
        context: &SessionContext,
        user_input: impl Into<String>,
        bot_reply: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            healthcare_context: context.healthcare_context.clone(),
            privacy_style: context.privacy_style.clone(),
            user_first_name: None,
            user_last_name: None,
            user_age: None,
            user_input: user_input.into(),
            bot_reply: bot_reply.into(),
        }
    }

    /// Names of required columns that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("session_id", &self.session_id),
            ("healthcare_context", &self.healthcare_context),
            ("privacy_style", &self.privacy_style),
            ("user_input", &self.user_input),
            ("bot_reply", &self.bot_reply),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
