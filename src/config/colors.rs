//! Palette configuration for the TUI.

use ratatui::style::Color;
use serde::{de, Deserialize, Deserializer};

/// One palette. The store's theme mode selects between the dark and light
/// instances at render time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub active_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub inactive_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub favorite: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub rating: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub text: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub text_dim: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_bg: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self::dark_default()
    }
}

impl ColorConfig {
    pub fn dark_default() -> Self {
        Self {
            active_border: Color::Cyan,
            inactive_border: Color::DarkGray,
            selection_bg: Color::Cyan,
            selection_fg: Color::Black,
            favorite: Color::Red,
            rating: Color::Yellow,
            text: Color::White,
            text_dim: Color::DarkGray,
            status_fg: Color::White,
            status_bg: Color::DarkGray,
        }
    }

    pub fn light_default() -> Self {
        Self {
            active_border: Color::Blue,
            inactive_border: Color::Gray,
            selection_bg: Color::Blue,
            selection_fg: Color::White,
            favorite: Color::Red,
            rating: Color::Magenta,
            text: Color::Black,
            text_dim: Color::Gray,
            status_fg: Color::Black,
            status_bg: Color::Gray,
        }
    }
}

/// The dark and light palettes together, as stored in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub dark: ColorConfig,
    pub light: ColorConfig,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            dark: ColorConfig::dark_default(),
            light: ColorConfig::light_default(),
        }
    }
}

/// Custom deserializer for Color that supports named colors and hex codes.
fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color_string(&s).map_err(de::Error::custom)
}

/// Parse a color string into a ratatui Color.
///
/// Supports named colors ("Black", "Red", ..., "Reset") and hex colors
/// ("#RRGGBB" or "#RGB").
pub fn parse_color_string(s: &str) -> Result<Color, String> {
    let s = s.trim();

    if s.starts_with('#') {
        return parse_hex_color(s);
    }

    match s.to_ascii_lowercase().as_str() {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" => Ok(Color::Magenta),
        "cyan" => Ok(Color::Cyan),
        "gray" => Ok(Color::Gray),
        "darkgray" => Ok(Color::DarkGray),
        "lightred" => Ok(Color::LightRed),
        "lightgreen" => Ok(Color::LightGreen),
        "lightyellow" => Ok(Color::LightYellow),
        "lightblue" => Ok(Color::LightBlue),
        "lightmagenta" => Ok(Color::LightMagenta),
        "lightcyan" => Ok(Color::LightCyan),
        "white" => Ok(Color::White),
        "reset" => Ok(Color::Reset),
        _ => Err(format!("unknown color name: {}", s)),
    }
}

fn parse_hex_color(s: &str) -> Result<Color, String> {
    let hex = &s[1..];
    let expand = |c: u8| (c << 4) | c;

    let (r, g, b) = match hex.len() {
        6 => (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ),
        3 => (
            u8::from_str_radix(&hex[0..1], 16).map(expand),
            u8::from_str_radix(&hex[1..2], 16).map(expand),
            u8::from_str_radix(&hex[2..3], 16).map(expand),
        ),
        _ => return Err(format!("invalid hex color: {}", s)),
    };

    match (r, g, b) {
        (Ok(r), Ok(g), Ok(b)) => Ok(Color::Rgb(r, g, b)),
        _ => Err(format!("invalid hex color: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color_string("Cyan").unwrap(), Color::Cyan);
        assert_eq!(parse_color_string("darkgray").unwrap(), Color::DarkGray);
        assert!(parse_color_string("chartreuse").is_err());
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(
            parse_color_string("#FF0000").unwrap(),
            Color::Rgb(255, 0, 0)
        );
        assert_eq!(parse_color_string("#F00").unwrap(), Color::Rgb(255, 0, 0));
        assert!(parse_color_string("#12345").is_err());
        assert!(parse_color_string("#GGHHII").is_err());
    }

    #[test]
    fn test_theme_colors_defaults_differ() {
        let colors = ThemeColors::default();
        assert_eq!(colors.dark.text, Color::White);
        assert_eq!(colors.light.text, Color::Black);
    }
}
