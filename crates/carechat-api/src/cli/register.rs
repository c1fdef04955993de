//! `carechat register`: run session intake from the command line.

use anyhow::Result;
use chrono::Utc;
use console::style;

use carechat_core::intake::start_session;
use carechat_types::registration::{
    FieldErrors, RegistrationInput, SessionContext, SessionStart,
};

/// Validate the registration and print the session start or the field errors.
///
/// Returns `Ok(false)` when the registration was rejected, so the caller can
/// exit non-zero.
pub fn register(input: RegistrationInput, context: SessionContext, json: bool) -> Result<bool> {
    match start_session(&input, context, Utc::now()) {
        Ok(session) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                print_session(&session);
            }
            Ok(true)
        }
        Err(errors) => {
            if json {
                let body = serde_json::json!({ "errors": errors });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_errors(&errors);
            }
            Ok(false)
        }
    }
}

fn print_session(session: &SessionStart) {
    println!();
    println!(
        "  {} Session started for {}",
        style("✓").green().bold(),
        style(&session.user.full_name).cyan().bold()
    );
    println!();
    println!("  {:<20} {}", style("Session ID:").dim(), session.session_id);
    println!("  {:<20} {}", style("Age:").dim(), session.user.age);
    println!(
        "  {:<20} {}",
        style("Date of birth:").dim(),
        session.user.date_of_birth
    );
    println!(
        "  {:<20} {}",
        style("Healthcare context:").dim(),
        session.healthcare_context
    );
    println!(
        "  {:<20} {}",
        style("Privacy style:").dim(),
        session.privacy_style
    );
    println!();
}

fn print_errors(errors: &FieldErrors) {
    println!();
    println!(
        "  {} Registration rejected",
        style("✗").red().bold()
    );
    println!();
    for (field, message) in errors.iter() {
        println!("  {:<12} {}", style(field).yellow(), message);
    }
    println!();
}
