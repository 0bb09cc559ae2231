//! Colour themes: four built-ins, or a btop-style `theme[key]="value"` file on top of one.

use crate::config::ThemeName;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Faintest a trail segment gets, as a fraction of the full snake colour.
const TRAIL_MIN_ALPHA: f64 = 0.35;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Board background.
    pub board: Color,
    /// Grid dots.
    pub grid: Color,
    pub snake_head: Color,
    pub snake_body: Color,
    pub food: Color,
    pub portal: Color,
    pub obstacle: Color,
    /// Border.
    pub div_line: Color,
    /// Sidebar text.
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Hints and disabled toggles.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin(ThemeName::Solar)
    }
}

impl Theme {
    pub fn builtin(name: ThemeName) -> Self {
        match name {
            ThemeName::Solar => Self {
                board: Color::Rgb(0x1B, 0x1F, 0x2A),
                grid: Color::Rgb(0x2E, 0x34, 0x44),
                snake_head: Color::Rgb(0xF6, 0xC1, 0x77),
                snake_body: Color::Rgb(0xF0, 0x9F, 0x4A),
                food: Color::Rgb(0xE0, 0x6C, 0x75),
                portal: Color::Rgb(0x61, 0xAF, 0xEF),
                obstacle: Color::Rgb(0x5C, 0x63, 0x70),
                div_line: Color::Rgb(0x3F, 0x44, 0x4F),
                main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
                title: Color::Rgb(0xE5, 0xC0, 0x7B),
                inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
            },
            ThemeName::Mint => Self {
                board: Color::Rgb(0x12, 0x24, 0x20),
                grid: Color::Rgb(0x22, 0x3A, 0x34),
                snake_head: Color::Rgb(0xA8, 0xF0, 0xC6),
                snake_body: Color::Rgb(0x5F, 0xD3, 0x9A),
                food: Color::Rgb(0xFF, 0x8A, 0x80),
                portal: Color::Rgb(0xB3, 0x9D, 0xDB),
                obstacle: Color::Rgb(0x4F, 0x6B, 0x63),
                div_line: Color::Rgb(0x2F, 0x4D, 0x45),
                main_fg: Color::Rgb(0xCF, 0xE8, 0xDF),
                title: Color::Rgb(0x5F, 0xD3, 0x9A),
                inactive_fg: Color::Rgb(0x5E, 0x7D, 0x74),
            },
            ThemeName::Graphite => Self {
                board: Color::Rgb(0x1C, 0x1C, 0x1C),
                grid: Color::Rgb(0x30, 0x30, 0x30),
                snake_head: Color::Rgb(0xF5, 0xF5, 0xF5),
                snake_body: Color::Rgb(0xBD, 0xBD, 0xBD),
                food: Color::Rgb(0xFF, 0x55, 0x55),
                portal: Color::Rgb(0x8A, 0xB4, 0xF8),
                obstacle: Color::Rgb(0x61, 0x61, 0x61),
                div_line: Color::Rgb(0x42, 0x42, 0x42),
                main_fg: Color::Rgb(0xD0, 0xD0, 0xD0),
                title: Color::Rgb(0xFF, 0xFF, 0xFF),
                inactive_fg: Color::Rgb(0x75, 0x75, 0x75),
            },
            ThemeName::Candy => Self {
                board: Color::Rgb(0x2A, 0x1A, 0x2E),
                grid: Color::Rgb(0x42, 0x2C, 0x48),
                snake_head: Color::Rgb(0xFF, 0xB3, 0xDE),
                snake_body: Color::Rgb(0xFF, 0x79, 0xC6),
                food: Color::Rgb(0xF1, 0xFA, 0x8C),
                portal: Color::Rgb(0x8B, 0xE9, 0xFD),
                obstacle: Color::Rgb(0x6C, 0x4F, 0x74),
                div_line: Color::Rgb(0x55, 0x3A, 0x5C),
                main_fg: Color::Rgb(0xF8, 0xE1, 0xF4),
                title: Color::Rgb(0xBD, 0x93, 0xF9),
                inactive_fg: Color::Rgb(0x8A, 0x6F, 0x90),
            },
        }
    }

    /// Built-in `name`, with any keys from the btop-style file at `path` laid over it.
    pub fn load(path: Option<&Path>, name: ThemeName) -> Result<Self, ThemeError> {
        let base = Self::builtin(name);
        let Some(path) = path else {
            return Ok(base);
        };
        let s = std::fs::read_to_string(path)?;
        Ok(base.overlay(&parse_theme_file(&s)))
    }

    fn overlay(self, map: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| map.get(*k).and_then(|v| parse_hex(v).ok()))
                .unwrap_or(fallback)
        };
        Self {
            board: get(&["main_bg", "meter_bg"], self.board),
            grid: get(&["div_line"], self.grid),
            snake_head: get(&["hi_fg", "mem_box"], self.snake_head),
            snake_body: get(&["mem_box", "cpu_start"], self.snake_body),
            food: get(&["cpu_end", "temp_end"], self.food),
            portal: get(&["cpu_box", "net_box"], self.portal),
            obstacle: get(&["inactive_fg"], self.obstacle),
            div_line: get(&["div_line"], self.div_line),
            main_fg: get(&["main_fg"], self.main_fg),
            title: get(&["title"], self.title),
            inactive_fg: get(&["inactive_fg"], self.inactive_fg),
        }
    }

    /// Body colour for segment `index` (head = 0) of a snake of `len` cells. With `trail`, the
    /// body fades towards the board colour but never below a floor.
    pub fn segment_color(&self, index: usize, len: usize, trail: bool) -> Color {
        if index == 0 {
            return self.snake_head;
        }
        if !trail {
            return self.snake_body;
        }
        let alpha = (1.0 - index as f64 / (len as f64 + 1.0)).max(TRAIL_MIN_ALPHA);
        blend(self.snake_body, self.board, alpha)
    }
}

/// `fg` over `bg` at `alpha`. Non-RGB colours are returned unchanged.
fn blend(fg: Color, bg: Color, alpha: f64) -> Color {
    match (fg, bg) {
        (Color::Rgb(fr, fg_, fb), Color::Rgb(br, bg_, bb)) => {
            let mix = |f: u8, b: u8| (f64::from(f) * alpha + f64::from(b) * (1.0 - alpha)).round() as u8;
            Color::Rgb(mix(fr, br), mix(fg_, bg_), mix(fb, bb))
        }
        _ => fg,
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&s[range], 16).map_err(|_| invalid());
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
