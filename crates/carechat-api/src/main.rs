//! Carechat CLI and REST API entry point.
//!
//! Binary name: `carechat`
//!
//! Parses CLI arguments, loads store configuration, then dispatches to the
//! appropriate command handler or starts the REST API server. Every path
//! that opens the chat log store closes it before exiting, including on
//! Ctrl+C or SIGTERM.

mod cli;
mod http;
mod shutdown;
mod state;

use std::process::ExitCode;

use clap::Parser;
use clap_complete::generate;
use tracing::info;

use carechat_infra::config::load_store_config;
use carechat_observe::tracing_setup::init_tracing;
use carechat_types::chat_log::NewChatLogEntry;
use carechat_types::registration::{RegistrationInput, SessionContext};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.log_format.into(), cli.filter_directive())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Commands that never touch the store
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "carechat", &mut std::io::stdout());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Register {
            first_name,
            last_name,
            date_of_birth,
            healthcare_context,
            privacy_style,
        } => {
            let input = RegistrationInput {
                first_name,
                last_name,
                date_of_birth,
            };
            let context = SessionContext {
                healthcare_context,
                privacy_style,
            };
            let accepted = cli::register::register(input, context, cli.json)?;
            return Ok(if accepted {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        _ => {}
    }

    let config = load_store_config(cli.config.as_deref()).await;
    let state = AppState::init(&config).await?;

    // `serve` drains on its own signal handler; racing it here would drop
    // in-flight requests.
    let result = if matches!(cli.command, Commands::Serve { .. }) {
        shutdown::run_until_signal(&state, run(&cli, &state), std::future::pending()).await
    } else {
        shutdown::run_until_signal(&state, run(&cli, &state), shutdown::shutdown_signal()).await
    };
    result.map(|()| ExitCode::SUCCESS)
}

/// Dispatch a storage-backed command against an initialized store.
async fn run(cli: &Cli, state: &AppState) -> anyhow::Result<()> {
    match &cli.command {
        Commands::InitDb => cli::chat_log::init_db(state, cli.json).await?,

        Commands::Log {
            session_id,
            healthcare_context,
            privacy_style,
            user_input,
            bot_reply,
            first_name,
            last_name,
            age,
        } => {
            let entry = NewChatLogEntry {
                session_id: session_id.clone(),
                healthcare_context: healthcare_context.clone(),
                privacy_style: privacy_style.clone(),
                user_first_name: first_name.clone(),
                user_last_name: last_name.clone(),
                user_age: *age,
                user_input: user_input.clone(),
                bot_reply: bot_reply.clone(),
            };
            cli::chat_log::log_turn(state, entry, cli.json).await?;
        }

        Commands::Show { id } => cli::chat_log::show_entry(state, *id, cli.json).await?,

        Commands::History { session_id, limit } => {
            cli::chat_log::history(state, session_id, *limit, cli.json).await?;
        }

        Commands::Serve { port, host } => serve(state.clone(), host, *port).await?,

        Commands::Register { .. } | Commands::Completions { .. } => {
            unreachable!("handled before the store is opened")
        }
    }

    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Carechat API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());
    info!(%addr, "http server started");

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    info!("http server drained");
    println!("\n  Server stopped.");
    Ok(())
}
