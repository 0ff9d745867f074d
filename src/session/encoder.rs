//! Argument template for the external video encoder (ffmpeg).

use std::path::Path;

use crate::config::Config;
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder};

/// `drawtext` filter rendering the capture in the configured font and colors,
/// plus a wall-clock overlay when timestamps are on.
pub fn video_filter(config: &Config) -> String {
    let font_file = config.font_file.display();
    let mut filter = format!(
        "drawtext=fontfile={}:fontcolor={}:fontsize={}:box=1:boxcolor={}:x=20:y=20:text='%{{eif\\:n\\:d}}'",
        font_file, config.font_color, config.font_size, config.background_color
    );

    if config.show_timestamp {
        filter.push_str(&format!(
            ",drawtext=fontfile={}:fontcolor={}:fontsize={}:box=1:boxcolor={}:x=w-200:y=20:text='%{{localtime}}'",
            font_file, config.font_color, config.font_size, config.background_color
        ));
    }

    filter
}

/// Encoder invocation reading `capture` and pushing FLV to `destination`.
pub fn encoder_command(config: &Config, capture: &Path, destination: &str) -> ProcessCommand {
    let program = if config.ffmpeg_path.is_empty() {
        "ffmpeg"
    } else {
        config.ffmpeg_path.as_str()
    };

    ProcessCommandBuilder::new(program)
        .args(["-re", "-f", "concat", "-safe", "0", "-i"])
        .arg(&capture.to_string_lossy())
        .arg("-vf")
        .arg(&video_filter(config))
        .args(["-c:v", "libx264", "-preset", "ultrafast", "-s"])
        .arg(&config.screen_size().to_string())
        .args(["-f", "flv"])
        .arg(destination)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_arguments() {
        let mut config = Config::default();
        config.screen_width = 1920;
        config.screen_height = 1080;

        let command = encoder_command(&config, Path::new("/tmp/capture.txt"), "rtmp://host/live");

        assert_eq!(command.program, "ffmpeg");
        let args = command.args;
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "/tmp/capture.txt");
        let size = args.iter().position(|a| a == "-s").unwrap();
        assert_eq!(args[size + 1], "1920x1080");
        assert_eq!(args.last().map(String::as_str), Some("rtmp://host/live"));
        assert_eq!(&args[..2], &["-re", "-f"]);
    }

    #[test]
    fn test_empty_encoder_path_uses_path_lookup() {
        let mut config = Config::default();
        config.ffmpeg_path = String::new();
        let command = encoder_command(&config, Path::new("c.txt"), "rtmp://x");
        assert_eq!(command.program, "ffmpeg");
    }

    #[test]
    fn test_filter_follows_theme_and_timestamp() {
        let mut config = Config::default();
        config.apply_theme("hacker").unwrap();
        config.font_size = 30;

        let filter = video_filter(&config);
        assert!(filter.contains("fontcolor=lime"));
        assert!(filter.contains("boxcolor=black"));
        assert!(filter.contains("fontsize=30"));
        assert!(!filter.contains("localtime"));

        config.show_timestamp = true;
        let filter = video_filter(&config);
        assert_eq!(filter.matches("drawtext=").count(), 2);
        assert!(filter.contains("%{localtime}"));
    }
}
