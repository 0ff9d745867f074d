use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePreset {
    pub name: &'static str,
    pub font_color: &'static str,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub highlight_color: &'static str,
}

/// Built-in color schemes, keyed by the name used on the command line.
pub fn theme_presets() -> BTreeMap<&'static str, ThemePreset> {
    BTreeMap::from([
        (
            "default",
            ThemePreset {
                name: "Default",
                font_color: "white",
                background_color: "black",
                border_color: "gray",
                highlight_color: "blue",
            },
        ),
        (
            "hacker",
            ThemePreset {
                name: "Hacker",
                font_color: "lime",
                background_color: "black",
                border_color: "green",
                highlight_color: "red",
            },
        ),
        (
            "solarized",
            ThemePreset {
                name: "Solarized",
                font_color: "#839496",
                background_color: "#002b36",
                border_color: "#586e75",
                highlight_color: "#268bd2",
            },
        ),
        (
            "light",
            ThemePreset {
                name: "Light",
                font_color: "#222222",
                background_color: "#f9f9f9",
                border_color: "#dddddd",
                highlight_color: "#0066cc",
            },
        ),
        (
            "monokai",
            ThemePreset {
                name: "Monokai",
                font_color: "#f8f8f2",
                background_color: "#272822",
                border_color: "#75715e",
                highlight_color: "#f92672",
            },
        ),
    ])
}

/// One line per preset, sorted by key.
pub fn format_theme_list() -> String {
    let mut out = String::from("Available themes:\n");
    for (key, theme) in theme_presets() {
        out.push_str(&format!(
            "- {}: {} (Font: {}, Background: {}, Border: {}, Highlight: {})\n",
            key,
            theme.name,
            theme.font_color,
            theme.background_color,
            theme.border_color,
            theme.highlight_color
        ));
    }
    out
}
