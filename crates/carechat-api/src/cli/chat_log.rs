//! Chat log CLI commands: init-db, log, show, history.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use carechat_core::chat_log::repository::ChatLogRepository;
use carechat_types::chat_log::{ChatLogEntry, NewChatLogEntry};

use crate::state::AppState;

/// Report that the store is initialized and the table exists.
pub async fn init_db(state: &AppState, json: bool) -> Result<()> {
    let store = state.store();
    let status = store.status().await;
    let total = store.count().await?;

    if json {
        let report = serde_json::json!({
            "status": status.to_string(),
            "entries": total,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!(
            "  {} Chat log store {} ({} entr{})",
            style("✓").green().bold(),
            style(status).cyan(),
            style(total).bold(),
            if total == 1 { "y" } else { "ies" }
        );
        println!();
    }

    Ok(())
}

/// Append one exchange through the best-effort reply path.
///
/// A logging failure is reported but does not fail the command: the reply
/// has already been produced by the time it is logged.
pub async fn log_turn(state: &AppState, entry: NewChatLogEntry, json: bool) -> Result<()> {
    let outcome = state.chat_log_service.record_turn(&entry).await;

    if json {
        let report = serde_json::json!({
            "logged": outcome.is_logged(),
            "entry": &outcome.entry,
            "error": outcome.log_error.as_ref().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    match (&outcome.entry, &outcome.log_error) {
        (Some(saved), _) => println!(
            "  {} Logged entry {} for session {}",
            style("✓").green().bold(),
            style(saved.id).bold(),
            style(&saved.session_id).cyan()
        ),
        (None, Some(e)) => println!(
            "  {} Exchange not logged: {}",
            style("!").yellow().bold(),
            e
        ),
        (None, None) => {}
    }
    println!("  {} {}", style("Bot:").dim(), entry.bot_reply);
    println!();

    Ok(())
}

/// Print a single entry.
pub async fn show_entry(state: &AppState, id: i64, json: bool) -> Result<()> {
    let entry = state
        .store()
        .get(id)
        .await?
        .with_context(|| format!("Chat log entry {id} not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let identity = match (&entry.user_first_name, &entry.user_last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(name), None) | (None, Some(name)) => name.clone(),
        (None, None) => "(anonymous)".to_string(),
    };
    let age = entry
        .user_age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!();
    println!("  {:<20} {}", style("Entry:").dim(), style(entry.id).bold());
    println!("  {:<20} {}", style("Session:").dim(), style(&entry.session_id).cyan());
    println!("  {:<20} {}", style("User:").dim(), identity);
    println!("  {:<20} {}", style("Age:").dim(), age);
    println!(
        "  {:<20} {}",
        style("Healthcare context:").dim(),
        entry.healthcare_context
    );
    println!("  {:<20} {}", style("Privacy style:").dim(), entry.privacy_style);
    println!(
        "  {:<20} {}",
        style("Timestamp:").dim(),
        entry.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
    println!("  {} {}", style("User:").bold(), entry.user_input);
    println!("  {} {}", style("Bot:").bold(), entry.bot_reply);
    println!();

    Ok(())
}

/// List a session's exchanges in write order.
pub async fn history(
    state: &AppState,
    session_id: &str,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let entries = state.chat_log_service.history(session_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!();
        println!(
            "  {} No exchanges logged for session '{}'",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("  History for session '{}'", style(session_id).cyan().bold());
    println!();
    println!("{}", history_table(&entries));
    println!();
    println!(
        "  {} exchange{}",
        style(entries.len()).bold(),
        if entries.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn history_table(entries: &[ChatLogEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Time").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Bot").fg(Color::White),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.id.to_string()).fg(Color::DarkGrey),
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()).fg(Color::White),
            Cell::new(truncate(&entry.user_input, 40)).fg(Color::Cyan),
            Cell::new(truncate(&entry.bot_reply, 60)).fg(Color::Green),
        ]);
    }

    table
}

/// Shorten to `max` characters, char-boundary safe.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
