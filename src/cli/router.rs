//! Mode routing and execution
//!
//! Builds the session from defaults, the config file and flags, then runs
//! whichever mode the arguments select.

use anyhow::{Context, Result};
use clap::CommandFactory;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::args::Cli;
use crate::cli::interactive;
use crate::config::{load_config, theme, Config};
use crate::session::{signal_handler, ExitOutcome, Session};

/// Time the encoder gets to connect before the command starts.
pub const STREAM_WARMUP: Duration = Duration::from_secs(2);
/// Time the stream stays up after the command finishes.
pub const STREAM_LINGER: Duration = Duration::from_secs(5);

/// Run the CLI and return the process exit status.
pub async fn execute(cli: Cli) -> Result<i32> {
    if cli.list_themes {
        print!("{}", theme::format_theme_list());
        return Ok(0);
    }

    let config = build_config(&cli)?;
    let session = Arc::new(Session::new(config).context("Invalid configuration")?);
    signal_handler::install(Arc::clone(&session))?;

    if cli.record {
        match session.start_recording().await {
            Ok(path) => println!("Recording to {}", path.display()),
            Err(e) => warn!("Failed to start recording: {}", e),
        }
    }

    let result = run_mode(&cli, &session).await;
    session.cleanup().await;
    result
}

/// Defaults, overlaid by the config file, overlaid by the flags that were given.
pub fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            warn!("Failed to load config {}: {}; using defaults", path.display(), e);
            Config::default()
        }),
        None => Config::default(),
    };
    cli.apply_to(&mut config)?;
    Ok(config)
}

async fn run_mode(cli: &Cli, session: &Session) -> Result<i32> {
    if cli.interactive {
        let config_path = cli.config.clone();
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        interactive::run_interactive(session, config_path, stdin).await?;
        return Ok(0);
    }

    if cli.command.is_empty() {
        print_usage()?;
        return Ok(0);
    }

    if cli.split {
        let commands = tokenize_commands(&cli.command)?;
        let outcomes = session.run_split(&commands).await?;
        return Ok(split_exit_code(&outcomes));
    }

    run_single(session, &cli.command).await
}

async fn run_single(session: &Session, argv: &[String]) -> Result<i32> {
    let streaming = session.config().destination().is_some();
    if streaming {
        session
            .start_streaming()
            .await
            .context("Failed to start streaming")?;
        tokio::time::sleep(STREAM_WARMUP).await;
    }

    let outcome = session.run_one(argv).await?;
    if !outcome.success() {
        eprintln!("Command {}", outcome);
    }

    if streaming {
        info!(
            "Command completed. Streaming for {} more seconds...",
            STREAM_LINGER.as_secs()
        );
        tokio::time::sleep(STREAM_LINGER).await;
        session.stop_streaming().await?;
    }

    Ok(outcome.exit_code())
}

/// Tokenize each command string once, shell style.
pub fn tokenize_commands<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Vec<String>>> {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            shell_words::split(line).with_context(|| format!("Cannot parse command '{line}'"))
        })
        .collect()
}

/// 0 when every command succeeded, otherwise 1.
pub fn split_exit_code(outcomes: &[ExitOutcome]) -> i32 {
    if outcomes.iter().all(ExitOutcome::success) {
        0
    } else {
        1
    }
}

fn print_usage() -> Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}
