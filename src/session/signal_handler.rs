use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::Arc;
use std::thread;

use super::Session;

/// Set up interrupt handlers for graceful shutdown
///
/// Installs SIGINT (Ctrl-C) and SIGTERM handlers on a dedicated thread. The
/// first signal runs [`Session::cleanup`] on the current tokio runtime and
/// then exits the process; spawned children get no further attention.
pub fn install(session: Arc<Session>) -> Result<()> {
    let runtime = tokio::runtime::Handle::try_current()
        .context("signal handlers must be installed from within the tokio runtime")?;
    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            eprintln!("\nReceived termination signal. Cleaning up...");
            runtime.block_on(session.cleanup());
            std::process::exit(exit_code_for(sig));
        }
    });

    Ok(())
}

fn exit_code_for(signal: i32) -> i32 {
    match signal {
        SIGINT => 130,  // Standard exit code for SIGINT
        SIGTERM => 143, // Standard exit code for SIGTERM
        other => 128 + other,
    }
}
