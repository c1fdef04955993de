//! Registration and session-start types for Carechat.
//!
//! A user registers with a first name, last name, and date of birth. The raw
//! form values arrive as [`RegistrationInput`]; successful validation yields a
//! [`ValidatedUser`], and a rejected submission yields [`FieldErrors`] keyed by
//! [`RegistrationField`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raw, caller-supplied registration fields. Nothing here has been checked.
///
/// `date_of_birth` is kept as the submitted string so that an unparseable
/// value can be reported as a field error instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// ISO calendar date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date_of_birth: String,
}

/// A registration that passed every rule.
///
/// `age` is derived from `date_of_birth` at validation time and frozen there;
/// it always lies within the accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedUser {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub age: u32,
    pub date_of_birth: NaiveDate,
}

/// The form fields that validation can reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationField {
    FirstName,
    LastName,
    DateOfBirth,
}

impl RegistrationField {
    /// Wire name of the field, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationField::FirstName => "firstName",
            RegistrationField::LastName => "lastName",
            RegistrationField::DateOfBirth => "dateOfBirth",
        }
    }
}

impl fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field rejection reasons. A field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<RegistrationField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reason for `field`, replacing any earlier one.
    pub fn insert(&mut self, field: RegistrationField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: RegistrationField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: RegistrationField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegistrationField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration rejected")?;
        for (i, (field, message)) in self.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Classification strings that shape chatbot behavior for a session.
///
/// Opaque here: they are carried through to the chat log unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub healthcare_context: String,
    pub privacy_style: String,
}

/// Payload returned when a session starts from a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    pub session_id: String,
    pub user: ValidatedUser,
    pub healthcare_context: String,
    pub privacy_style: String,
    pub started_at: DateTime<Utc>,
}
