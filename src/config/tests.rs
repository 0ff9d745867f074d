use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.ffmpeg_path, "ffmpeg");
    assert_eq!(config.font_size, 24);
    assert_eq!(config.screen_size(), ScreenSize::DEFAULT);
    assert_eq!(config.record_path, PathBuf::from("./recordings"));
    assert!(config.destination().is_none());
    assert!(!config.timestamp_policy().unwrap().enabled());
}

#[test]
fn test_apply_known_theme() {
    let mut config = Config::default();
    config.apply_theme("solarized").unwrap();
    assert_eq!(config.theme_name, "solarized");
    assert_eq!(config.font_color, "#839496");
    assert_eq!(config.background_color, "#002b36");
}

#[test]
fn test_unknown_theme_leaves_config_unchanged() {
    let mut config = Config::default();
    let before = config.clone();
    let err = config.apply_theme("neon").unwrap_err();
    assert!(matches!(err, Error::ThemeNotFound(name) if name == "neon"));
    assert_eq!(config, before);
}

#[test]
fn test_theme_list_is_sorted() {
    let listing = theme::format_theme_list();
    let keys: Vec<&str> = listing
        .lines()
        .skip(1)
        .filter_map(|l| l.strip_prefix("- "))
        .filter_map(|l| l.split(':').next())
        .collect();
    assert_eq!(keys, vec!["default", "hacker", "light", "monokai", "solarized"]);
}

#[test]
fn test_theme_list_shows_every_color() {
    let listing = theme::format_theme_list();
    assert!(listing.contains(
        "- monokai: Monokai (Font: #f8f8f2, Background: #272822, Border: #75715e, Highlight: #f92672)\n"
    ));
}

#[test]
fn test_screen_size_parsing() {
    assert_eq!(
        "1920x1080".parse::<ScreenSize>().unwrap(),
        ScreenSize {
            width: 1920,
            height: 1080
        }
    );
    assert!("1920".parse::<ScreenSize>().is_err());
    assert!("0x720".parse::<ScreenSize>().is_err());
    assert!("widexhigh".parse::<ScreenSize>().is_err());
}

#[test]
fn test_malformed_screen_size_falls_back() {
    assert_eq!(ScreenSize::parse_or_default("garbage"), ScreenSize::DEFAULT);
    assert_eq!(ScreenSize::parse_or_default("-5x10"), ScreenSize::DEFAULT);
    assert_eq!(
        ScreenSize::parse_or_default("800x600"),
        ScreenSize {
            width: 800,
            height: 600
        }
    );
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_config(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("shellcast.json");

    let mut config = Config::default();
    config.rtmp_url = Some("rtmp://live.example/app".to_string());
    config.show_timestamp = true;
    config.apply_theme("hacker").unwrap();
    save_config(&config, &path).unwrap();

    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    fs::write(&path, r#"{"font_size": 32, "rtmp_url": "rtmp://host/live"}"#).unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.font_size, 32);
    assert_eq!(config.destination(), Some("rtmp://host/live"));
    assert_eq!(config.ffmpeg_path, "ffmpeg");
}

#[test]
fn test_invalid_files_are_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_config(&path), Err(Error::Serialization(_))));

    fs::write(&path, r#"{"timestamp_format": "%Y-%"}"#).unwrap();
    assert!(matches!(load_config(&path), Err(Error::Config(_))));
}
