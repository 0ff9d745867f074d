//! CLI argument structures
//!
//! A single flat command: flags tune the session, the trailing arguments are
//! the command to run (or, with `--split`, one command string each).

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, ScreenSize};
use crate::error::Result;

const EXAMPLES: &str = "\
Examples:
  shellcast ls -la
  shellcast --rtmp rtmp://live.example.com/app/key top -b -n 1
  shellcast --timestamp --record make test
  shellcast --split \"ping -c 3 localhost\" \"df -h\"
  shellcast --theme hacker --screen-size 1920x1080 -i
  shellcast --list-themes";

/// Stream and record the output of terminal commands
#[derive(Parser, Debug)]
#[command(name = "shellcast")]
#[command(about = "shellcast - Stream and record terminal command output", long_about = None)]
#[command(version)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// RTMP destination to stream to
    #[arg(long, value_name = "URL")]
    pub rtmp: Option<String>,

    /// Path to the ffmpeg binary
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<String>,

    /// Font size of the rendered text
    #[arg(long, value_name = "N")]
    pub font_size: Option<u32>,

    /// Font color of the rendered text
    #[arg(long, value_name = "COLOR")]
    pub font_color: Option<String>,

    /// Background color of the rendered video
    #[arg(long = "bg-color", value_name = "COLOR")]
    pub bg_color: Option<String>,

    /// Start the interactive prompt
    #[arg(short, long)]
    pub interactive: bool,

    /// Configuration file to load
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Prefix every line with the time it was read (--timestamp=off to disable)
    #[arg(
        long,
        value_name = "on|off",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "on",
        value_parser = parse_switch
    )]
    pub timestamp: Option<bool>,

    /// strftime format used for timestamps
    #[arg(long, value_name = "FORMAT")]
    pub timestamp_format: Option<String>,

    /// Video size as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH")]
    pub screen_size: Option<String>,

    /// Record the session to a file
    #[arg(long)]
    pub record: bool,

    /// Directory recordings are written to
    #[arg(long, value_name = "DIR")]
    pub record_path: Option<PathBuf>,

    /// Color theme preset (see --list-themes)
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Run every argument as a separate command, concurrently
    #[arg(long)]
    pub split: bool,

    /// List the available themes and exit
    #[arg(long)]
    pub list_themes: bool,

    /// Keep the stream's capture file at this path instead of a temporary file
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Command to run
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    /// Overlay the flags that were given on top of `config`.
    ///
    /// The theme goes last so its colors win over `--font-color`/`--bg-color`.
    pub fn apply_to(&self, config: &mut Config) -> Result<()> {
        if let Some(url) = &self.rtmp {
            config.rtmp_url = Some(url.clone());
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            config.ffmpeg_path = ffmpeg.clone();
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(color) = &self.font_color {
            config.font_color = color.clone();
        }
        if let Some(color) = &self.bg_color {
            config.background_color = color.clone();
        }
        if let Some(enabled) = self.timestamp {
            config.show_timestamp = enabled;
        }
        if let Some(format) = &self.timestamp_format {
            config.timestamp_format = format.clone();
        }
        if let Some(size) = &self.screen_size {
            config.set_screen_size(ScreenSize::parse_or_default(size));
        }
        if let Some(dir) = &self.record_path {
            config.record_path = dir.clone();
        }
        if let Some(path) = &self.output_file {
            config.output_file = Some(path.clone());
        }
        if let Some(theme) = &self.theme {
            config.apply_theme(theme)?;
        }
        Ok(())
    }
}

/// Accepts on/off, true/false, yes/no and 1/0.
pub fn parse_switch(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}
