#![forbid(unsafe_code)]

//! Text entries and their display options.
//!
//! The serde representation of every type here is the JSON the driver and
//! the datastore exchange: enums are externally tagged (`{"Rgb": {..}}`,
//! `"All"`, `{"Single": 3}`), field names are snake_case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest text the display accepts, in characters.
pub const MAX_TEXT_LEN: usize = 64;

/// Texts longer than this always scroll.
pub const FORCE_MARQUEE_LEN: usize = 12;

// ─── Colors ──────────────────────────────────────────────────────────────────

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Six lowercase hex digits, no leading `#`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color must have 3 or 6 hex digits, got {len}")]
    Length { len: usize },

    #[error("color contains a non-hex digit: {input}")]
    Digit { input: String },
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `rrggbb` or `rgb`, with or without a leading `#`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let digits = raw.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit {
                input: raw.to_string(),
            });
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            len => return Err(ColorParseError::Length { len }),
        };

        let value = u32::from_str_radix(&expanded, 16).map_err(|_| ColorParseError::Digit {
            input: raw.to_string(),
        })?;
        Ok(Self::new(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RainbowOptions {
    /// Each letter cycles with its own phase instead of the whole line.
    pub is_per_letter: bool,
    /// Cycle speed, always at least 1.
    pub speed: u32,
}

/// How an entry is colored. Exactly one variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpec {
    Rgb(Rgb),
    Rainbow(RainbowOptions),
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::Rgb(Rgb::WHITE)
    }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// Horizontal scrolling. A speed of zero disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MarqueeOptions {
    pub speed: u32,
}

impl MarqueeOptions {
    pub const DISABLED: Self = Self { speed: 0 };

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.speed > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextEntryOptions {
    pub color: ColorSpec,
    pub marquee: MarqueeOptions,
}

/// One queued message with its display options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextEntry {
    pub text: String,
    pub options: TextEntryOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry text is empty")]
    Empty,

    #[error("entry text is {len} characters, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("rainbow speed must be positive")]
    RainbowSpeed,
}

impl TextEntry {
    #[must_use]
    pub fn new(text: impl Into<String>, options: TextEntryOptions) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }

    /// Length in characters, which is what the display limit counts.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Checks the caller-side submission rules.
    ///
    /// The driver does not re-validate, so this has to pass before an entry
    /// is sent anywhere.
    pub fn validate(&self) -> Result<(), EntryError> {
        let len = self.char_len();
        if len == 0 {
            return Err(EntryError::Empty);
        }
        if len > MAX_TEXT_LEN {
            return Err(EntryError::TooLong {
                len,
                max: MAX_TEXT_LEN,
            });
        }
        if let ColorSpec::Rainbow(RainbowOptions { speed: 0, .. }) = self.options.color {
            return Err(EntryError::RainbowSpeed);
        }
        Ok(())
    }
}

// ─── Panel-wide state ────────────────────────────────────────────────────────

/// The display's attention blink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FlashState {
    pub is_active: bool,
    /// Steps per cycle during which the panel is lit.
    pub on_steps: u32,
    /// Length of one flash cycle in steps.
    pub total_steps: u32,
}

impl FlashState {
    #[must_use]
    pub const fn with_active(self, is_active: bool) -> Self {
        Self { is_active, ..self }
    }
}

// ─── Wire enums ──────────────────────────────────────────────────────────────

/// Direction for both reordering and scrolling. `Up` moves toward slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown direction: {other} (expected up or down)")),
        }
    }
}

/// What a delete request removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeleteChoice {
    All,
    Single(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_entry(text: &str) -> TextEntry {
        TextEntry::new(
            text,
            TextEntryOptions {
                color: ColorSpec::Rgb(Rgb::new(255, 0, 0)),
                marquee: MarqueeOptions::DISABLED,
            },
        )
    }

    #[test]
    fn hex_parses_long_short_and_prefixed_forms() {
        assert_eq!("ff8000".parse::<Rgb>(), Ok(Rgb::new(255, 128, 0)));
        assert_eq!("#ff8000".parse::<Rgb>(), Ok(Rgb::new(255, 128, 0)));
        assert_eq!("f80".parse::<Rgb>(), Ok(Rgb::new(255, 136, 0)));
        assert_eq!("#ABC".parse::<Rgb>(), Ok(Rgb::new(0xaa, 0xbb, 0xcc)));
    }

    #[test]
    fn hex_rejects_bad_lengths_and_digits() {
        assert_eq!(
            "ffff".parse::<Rgb>(),
            Err(ColorParseError::Length { len: 4 })
        );
        assert!(matches!(
            "+fffff".parse::<Rgb>(),
            Err(ColorParseError::Digit { .. })
        ));
        assert!(matches!(
            "gg0000".parse::<Rgb>(),
            Err(ColorParseError::Digit { .. })
        ));
    }

    #[test]
    fn hex_formatting_is_lowercase_six_digits() {
        assert_eq!(Rgb::new(1, 171, 255).to_hex(), "01abff");
        assert_eq!(Rgb::new(1, 171, 255).to_string(), "#01abff");
    }

    #[test]
    fn entry_wire_format_matches_driver() {
        let json = serde_json::to_value(red_entry("hi")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "text": "hi",
                "options": {
                    "color": {"Rgb": {"r": 255, "g": 0, "b": 0}},
                    "marquee": {"speed": 0}
                }
            })
        );

        let rainbow: ColorSpec =
            serde_json::from_str(r#"{"Rainbow":{"is_per_letter":true,"speed":12}}"#)
                .expect("deserialize");
        assert_eq!(
            rainbow,
            ColorSpec::Rainbow(RainbowOptions {
                is_per_letter: true,
                speed: 12
            })
        );
    }

    #[test]
    fn delete_choice_wire_format() {
        assert_eq!(
            serde_json::to_value(DeleteChoice::All).expect("serialize"),
            serde_json::json!("All")
        );
        assert_eq!(
            serde_json::to_value(DeleteChoice::Single(3)).expect("serialize"),
            serde_json::json!({"Single": 3})
        );
    }

    #[test]
    fn validation_counts_characters_not_bytes() {
        assert_eq!(red_entry("").validate(), Err(EntryError::Empty));
        assert!(red_entry(&"é".repeat(64)).validate().is_ok());
        assert_eq!(
            red_entry(&"x".repeat(65)).validate(),
            Err(EntryError::TooLong { len: 65, max: 64 })
        );
    }

    #[test]
    fn zero_rainbow_speed_is_rejected() {
        let mut entry = red_entry("hello");
        entry.options.color = ColorSpec::Rainbow(RainbowOptions {
            is_per_letter: false,
            speed: 0,
        });
        assert_eq!(entry.validate(), Err(EntryError::RainbowSpeed));
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(" down ".parse::<Direction>(), Ok(Direction::Down));
        assert!("left".parse::<Direction>().is_err());
        assert_eq!(Direction::Up.opposite(), Direction::Down);
    }
}
