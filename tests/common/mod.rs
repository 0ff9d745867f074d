//! Shared helpers for integration tests.
#![allow(dead_code)]

use shellcast::config::Config;
use shellcast::output::ConsoleMode;
use shellcast::session::Session;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// A session writing recordings under `dir`, with console echo off.
pub fn quiet_session(config: Config) -> Session {
    Session::new(config)
        .unwrap()
        .with_console(ConsoleMode::Silent)
        .with_command_line("shellcast integration")
}

pub fn config_in(dir: &TempDir) -> Config {
    Config {
        record_path: dir.path().join("recordings"),
        ..Config::default()
    }
}

pub fn recordings_in(dir: &TempDir) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.path().join("recordings"))
        .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
        .unwrap_or_default();
    paths.sort();
    paths
}
