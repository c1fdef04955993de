//! Registration validation.
//!
//! Every rule runs independently; a submission with three bad fields gets
//! three messages back, never just the first.

use carechat_types::registration::{
    FieldErrors, RegistrationField, RegistrationInput, ValidatedUser,
};
use chrono::NaiveDate;

use super::age::compute_age;

/// Youngest accepted age, inclusive.
pub const MIN_AGE: i32 = 13;

/// Oldest accepted age, inclusive.
pub const MAX_AGE: i32 = 120;

/// Minimum trimmed character count for a name.
pub const MIN_NAME_CHARS: usize = 2;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate a registration as of `today`.
///
/// On success the names are trimmed and `full_name` is `"{first} {last}"`.
pub fn validate(
    input: &RegistrationInput,
    today: NaiveDate,
) -> Result<ValidatedUser, FieldErrors> {
    let mut errors = FieldErrors::new();

    let first_name = check_name(&input.first_name, "First name")
        .map_err(|msg| errors.insert(RegistrationField::FirstName, msg))
        .ok();
    let last_name = check_name(&input.last_name, "Last name")
        .map_err(|msg| errors.insert(RegistrationField::LastName, msg))
        .ok();
    let birth = check_date_of_birth(&input.date_of_birth, today)
        .map_err(|msg| errors.insert(RegistrationField::DateOfBirth, msg))
        .ok();

    match (first_name, last_name, birth) {
        (Some(first_name), Some(last_name), Some((date_of_birth, age))) if errors.is_empty() => {
            Ok(ValidatedUser {
                full_name: format!("{first_name} {last_name}"),
                first_name,
                last_name,
                age,
                date_of_birth,
            })
        }
        _ => Err(errors),
    }
}

fn check_name(raw: &str, label: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{label} is required"));
    }
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return Err(format!(
            "{label} must be at least {MIN_NAME_CHARS} characters"
        ));
    }
    Ok(trimmed.to_string())
}

fn check_date_of_birth(raw: &str, today: NaiveDate) -> Result<(NaiveDate, u32), String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Date of birth is required".to_string());
    }
    let date_of_birth = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| "Please enter a valid date of birth".to_string())?;

    let age = compute_age(date_of_birth, today);
    if age < MIN_AGE {
        return Err(format!(
            "You must be at least {MIN_AGE} years old to use this service"
        ));
    }
    if age > MAX_AGE {
        return Err("Please enter a valid date of birth".to_string());
    }

    let age = u32::try_from(age).map_err(|_| "Please enter a valid date of birth".to_string())?;
    Ok((date_of_birth, age))
}
