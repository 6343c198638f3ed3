//! UI colors, optionally read from a kitty-style color file
//! (`color1 #d35f5f`, `foreground #bebebe`, ...).

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Focused borders, key hints
    pub danger: Color,      // Error labels
    pub warning: Color,     // Status messages
    pub text: Color,        // Values
    pub text_dim: Color,    // Labels, placeholders
    pub bg_selected: Color, // Selected table row
    pub inactive: Color,    // Unfocused borders
    pub header: Color,      // Section and column titles
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(249, 226, 175),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Load from `path` when given and readable, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_colors(&parse_color_file(&content)),
            Err(e) => {
                tracing::warn!("Could not read theme {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn from_colors(colors: &HashMap<String, Color>) -> Self {
        let base = Self::default();
        let pick = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| colors.get(*k))
                .copied()
                .unwrap_or(fallback)
        };

        Self {
            accent: pick(&["color2", "color10"], base.accent),
            danger: pick(&["color1", "color9"], base.danger),
            warning: pick(&["color3", "color11"], base.warning),
            text: pick(&["foreground"], base.text),
            text_dim: pick(&["color8"], base.text_dim),
            bg_selected: pick(&["selection_background", "color0"], base.bg_selected),
            inactive: pick(&["inactive_border_color", "color8"], base.inactive),
            header: pick(&["color4", "color12"], base.header),
        }
    }
}

/// `key value` lines whose value is a hex color; everything else is skipped.
fn parse_color_file(content: &str) -> HashMap<String, Color> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once(char::is_whitespace)?;
            Some((key.to_string(), parse_hex_color(value)?))
        })
        .collect()
}

/// `#rrggbb` or `#rgb`
fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

    match hex.len() {
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Some(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => None,
    }
}
