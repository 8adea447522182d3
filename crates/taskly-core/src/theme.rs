use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for ThemeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" | "day" => Ok(Self::Light),
            "dark" | "night" => Ok(Self::Dark),
            other => Err(anyhow!("invalid theme: {other} (expected light or dark)")),
        }
    }
}

/// A `#rgb` or `#rrggbb` color as used by the palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(&'static str);

impl Color {
    pub const fn hex(self) -> &'static str {
        self.0
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        let digits = self.0.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(digits[i..=i].repeat(2).as_str());
                (expand(0), expand(1), expand(2))
            }
            6 => (
                channel(&digits[0..2]),
                channel(&digits[2..4]),
                channel(&digits[4..6]),
            ),
            _ => (0, 0, 0),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: Color,
    pub box_primary: Color,
    pub box_secondary: Color,
    pub input_background: Color,
    pub input_border: Color,
    pub text: Color,
}

const LIGHT: Palette = Palette {
    background: Color("#B3B7EE"),
    box_primary: Color("#D3D4FA"),
    box_secondary: Color("#E6E7FB"),
    input_background: Color("#fff"),
    input_border: Color("#000"),
    text: Color("#000"),
};

const DARK: Palette = Palette {
    background: Color("#333"),
    box_primary: Color("#444"),
    box_secondary: Color("#555"),
    input_background: Color("#444"),
    input_border: Color("#777"),
    text: Color("#fff"),
};

/// Colors of the completed-tasks view, which does not share the main palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletedPalette {
    pub background: Color,
    pub card: Color,
    pub inner_box: Color,
    pub title_text: Color,
    pub empty_text: Color,
}

const COMPLETED_LIGHT: CompletedPalette = CompletedPalette {
    background: Color("#B3B7EE"),
    card: Color("#FFFFFF"),
    inner_box: Color("#B3B7EE"),
    title_text: Color("#FFFFFF"),
    empty_text: Color("#888"),
};

const COMPLETED_DARK: CompletedPalette = CompletedPalette {
    background: Color("#222"),
    card: Color("#444"),
    inner_box: Color("#555"),
    title_text: Color("#DDD"),
    empty_text: Color("#AAA"),
};

pub const fn palette_for(is_dark_mode: bool) -> Palette {
    if is_dark_mode { DARK } else { LIGHT }
}

pub const fn completed_palette_for(is_dark_mode: bool) -> CompletedPalette {
    if is_dark_mode {
        COMPLETED_DARK
    } else {
        COMPLETED_LIGHT
    }
}

pub const fn placeholder_color(is_dark_mode: bool) -> Color {
    if is_dark_mode {
        Color("#ccc")
    } else {
        Color("#999")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePreference {
    is_dark_mode: bool,
}

impl ThemePreference {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            is_dark_mode: mode.is_dark(),
        }
    }

    pub fn is_dark_mode(&self) -> bool {
        self.is_dark_mode
    }

    pub fn mode(&self) -> ThemeMode {
        if self.is_dark_mode {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    pub fn toggle(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        debug!(mode = self.mode().as_str(), "toggled theme");
    }

    pub fn set_light(&mut self) {
        if self.is_dark_mode {
            self.toggle();
        }
    }

    pub fn set_dark(&mut self) {
        if !self.is_dark_mode {
            self.toggle();
        }
    }

    pub fn palette(&self) -> Palette {
        palette_for(self.is_dark_mode)
    }

    pub fn completed_palette(&self) -> CompletedPalette {
        completed_palette_for(self.is_dark_mode)
    }
}
