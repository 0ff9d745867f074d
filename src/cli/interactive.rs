//! The interactive prompt.
//!
//! Each input line is parsed into a [`ReplCommand`] and applied to the
//! session. Failures print one `Error ...` line and the prompt carries on.

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::cli::args::parse_switch;
use crate::cli::router::tokenize_commands;
use crate::config::{load_config, save_config, theme, ScreenSize, DEFAULT_CONFIG_FILE};
use crate::session::Session;

pub const PROMPT: &str = "shellcast> ";

const HELP: &str = "\
Available commands:
  help                      Show this help
  exit, quit                Leave interactive mode
  stream                    Start streaming (asks for a URL if none is set)
  stop                      Stop streaming
  record                    Start recording to a file
  stoprecord                Stop recording
  theme [NAME]              Apply a theme, or list themes
  timestamp on|off          Toggle line timestamps
  size [WxH]                Set or show the video size
  split \"cmd1\" \"cmd2\" ...   Run several commands concurrently
  fontsize [N]              Set or show the font size
  save [FILE]               Save the configuration
  load [FILE]               Load a configuration
  <command>                 Run any other command";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Help,
    Exit,
    Stream,
    Stop,
    Record,
    StopRecord,
    Theme(Option<String>),
    Timestamp(Option<String>),
    Size(Option<String>),
    Split(String),
    FontSize(Option<String>),
    Save(Option<String>),
    Load(Option<String>),
    Run(String),
}

pub fn parse_command(input: &str) -> ReplCommand {
    let input = input.trim();
    if input.is_empty() {
        return ReplCommand::Empty;
    }

    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match word {
        "help" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Exit,
        "stream" => ReplCommand::Stream,
        "stop" => ReplCommand::Stop,
        "record" => ReplCommand::Record,
        "stoprecord" => ReplCommand::StopRecord,
        "theme" => ReplCommand::Theme(arg),
        "timestamp" => ReplCommand::Timestamp(arg),
        "size" => ReplCommand::Size(arg),
        "split" => ReplCommand::Split(rest.to_string()),
        "fontsize" => ReplCommand::FontSize(arg),
        "save" => ReplCommand::Save(arg),
        "load" => ReplCommand::Load(arg),
        _ => ReplCommand::Run(input.to_string()),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Read commands from `reader` until `exit` or end of input.
pub async fn run_interactive<R>(
    session: &Session,
    config_path: Option<PathBuf>,
    reader: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    println!("ShellCast interactive mode. Type 'help' for available commands.");

    loop {
        print!("{PROMPT}");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let command = parse_command(&line);
        debug!("Interactive command: {:?}", command);
        if dispatch(session, command, &mut lines, config_path.as_deref()).await == Flow::Exit {
            break;
        }
    }

    Ok(())
}

async fn dispatch<R>(
    session: &Session,
    command: ReplCommand,
    lines: &mut Lines<R>,
    config_path: Option<&Path>,
) -> Flow
where
    R: AsyncBufRead + Unpin,
{
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Exit => return Flow::Exit,
        ReplCommand::Stream => start_stream(session, lines).await,
        ReplCommand::Stop => match session.stop_streaming().await {
            Ok(()) => println!("Streaming stopped"),
            Err(e) => println!("Error stopping stream: {e}"),
        },
        ReplCommand::Record => match session.start_recording().await {
            Ok(path) => println!("Recording to {}", path.display()),
            Err(e) => println!("Error starting recording: {e}"),
        },
        ReplCommand::StopRecord => match session.stop_recording().await {
            Ok(summary) => println!("Recording saved to {}", summary.path.display()),
            Err(e) => println!("Error stopping recording: {e}"),
        },
        ReplCommand::Theme(None) => {
            print!("{}", theme::format_theme_list());
            println!("Current theme: {}", session.config().theme_name);
        }
        ReplCommand::Theme(Some(name)) => {
            let streaming = session.is_streaming().await;
            match session.update_config(|config| config.apply_theme(&name)) {
                Ok(()) if streaming => {
                    println!("Theme set to {name}. Restart streaming to apply it.")
                }
                Ok(()) => println!("Theme set to {name}"),
                Err(e) => println!("Error: {e}"),
            }
        }
        ReplCommand::Timestamp(arg) => {
            match arg.as_deref().map(parse_switch) {
                Some(Ok(enabled)) => {
                    let result = session.update_config(|config| {
                        config.show_timestamp = enabled;
                        Ok(())
                    });
                    match result {
                        Ok(()) if enabled => println!("Timestamps enabled"),
                        Ok(()) => println!("Timestamps disabled"),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: timestamp on|off"),
            }
        }
        ReplCommand::Size(None) => println!("Screen size: {}", session.config().screen_size()),
        ReplCommand::Size(Some(value)) => match value.parse::<ScreenSize>() {
            Ok(size) => {
                let result = session.update_config(|config| {
                    config.set_screen_size(size);
                    Ok(())
                });
                match result {
                    Ok(()) => println!("Screen size set to {size}"),
                    Err(e) => println!("Error: {e}"),
                }
            }
            Err(e) => println!("Error: {e}"),
        },
        ReplCommand::FontSize(None) => println!("Font size: {}", session.config().font_size),
        ReplCommand::FontSize(Some(value)) => match value.parse::<u32>() {
            Ok(size) if size > 0 => {
                let result = session.update_config(|config| {
                    config.font_size = size;
                    Ok(())
                });
                match result {
                    Ok(()) => println!("Font size set to {size}"),
                    Err(e) => println!("Error: {e}"),
                }
            }
            _ => println!("Error: invalid font size '{value}'"),
        },
        ReplCommand::Split(args) => run_split(session, &args).await,
        ReplCommand::Save(path) => {
            let path = config_file(path, config_path);
            match save_config(&session.config(), &path) {
                Ok(()) => println!("Configuration saved to {}", path.display()),
                Err(e) => println!("Error saving configuration: {e}"),
            }
        }
        ReplCommand::Load(path) => {
            let path = config_file(path, config_path);
            match load_config(&path).and_then(|config| session.replace_config(config)) {
                Ok(()) => println!("Configuration loaded from {}", path.display()),
                Err(e) => println!("Error loading configuration: {e}"),
            }
        }
        ReplCommand::Run(input) => run_command(session, &input).await,
    }
    Flow::Continue
}

async fn start_stream<R>(session: &Session, lines: &mut Lines<R>)
where
    R: AsyncBufRead + Unpin,
{
    if session.config().destination().is_none() {
        print!("Enter RTMP URL: ");
        // The prompt is cosmetic; a failed flush still reads the answer.
        let _ = std::io::stdout().flush();

        let url = match lines.next_line().await {
            Ok(Some(url)) => url.trim().to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                println!("Error reading URL: {e}");
                return;
            }
        };
        if !url.is_empty() {
            let result = session.update_config(|config| {
                config.rtmp_url = Some(url);
                Ok(())
            });
            if let Err(e) = result {
                println!("Error: {e}");
                return;
            }
        }
    }

    match session.start_streaming().await {
        Ok(capture) => println!("Streaming started (capture file {})", capture.display()),
        Err(e) => println!("Error starting stream: {e}"),
    }
}

async fn run_split(session: &Session, args: &str) {
    let commands = match shell_words::split(args) {
        Ok(lines) if !lines.is_empty() => tokenize_commands(&lines),
        Ok(_) => {
            println!("Usage: split \"cmd1\" \"cmd2\" ...");
            return;
        }
        Err(e) => {
            println!("Error parsing commands: {e}");
            return;
        }
    };
    let commands = match commands {
        Ok(commands) => commands,
        Err(e) => {
            println!("Error: {e:#}");
            return;
        }
    };

    println!("Running {} commands in split mode", commands.len());
    match session.run_split(&commands).await {
        Ok(outcomes) => {
            for (index, outcome) in outcomes.iter().enumerate() {
                println!("[CMD{}] {}", index + 1, outcome);
            }
        }
        Err(e) => println!("Error: {e}"),
    }
}

async fn run_command(session: &Session, input: &str) {
    let argv = match shell_words::split(input) {
        Ok(argv) => argv,
        Err(e) => {
            println!("Error parsing command: {e}");
            return;
        }
    };

    match session.run_one(&argv).await {
        Ok(outcome) if outcome.success() => {}
        Ok(outcome) => println!("Command {outcome}"),
        Err(e) => println!("Error running command: {e}"),
    }
}

fn config_file(explicit: Option<String>, configured: Option<&Path>) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
