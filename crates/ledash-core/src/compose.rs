#![forbid(unsafe_code)]

//! Entry composer state.
//!
//! [`ComposerState`] is immutable from the outside: every edit is a
//! [`ComposerAction`] passed through [`ComposerState::reduce`], which returns
//! the next state. Derived rules (validity, forced marquee) are re-applied on
//! every reduction, so no sequence of actions can leave the state in a shape
//! the rules forbid.
//!
//! # Invariants
//!
//! 1. `is_long()` implies `marquee().is_forced` and `marquee().speed > 0`.
//! 2. While forced, `SetMarquee(false)` has no effect.
//! 3. `color().rgb` is always the last hex input that parsed.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::entry::{
    ColorSpec, EntryError, FORCE_MARQUEE_LEN, MAX_TEXT_LEN, MarqueeOptions, RainbowOptions, Rgb,
    TextEntry, TextEntryOptions,
};

/// Speed used when marquee is switched on or forced on.
pub const DEFAULT_MARQUEE_SPEED: u32 = 5;
pub const MARQUEE_SPEED_RANGE: RangeInclusive<u32> = 1..=15;

pub const DEFAULT_RAINBOW_SPEED: u32 = 5;
pub const RAINBOW_SPEED_RANGE: RangeInclusive<u32> = 1..=50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    #[default]
    Color,
    Rainbow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorOptions {
    pub mode: ColorMode,
    pub rgb: Rgb,
    /// Raw text of the hex field; may not parse while the user is typing.
    pub hex_input: String,
    pub rainbow_per_letter: bool,
    pub rainbow_speed: u32,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            mode: ColorMode::Color,
            rgb: Rgb::WHITE,
            hex_input: Rgb::WHITE.to_hex(),
            rainbow_per_letter: false,
            rainbow_speed: DEFAULT_RAINBOW_SPEED,
        }
    }
}

impl ColorOptions {
    #[must_use]
    pub fn spec(&self) -> ColorSpec {
        match self.mode {
            ColorMode::Color => ColorSpec::Rgb(self.rgb),
            ColorMode::Rainbow => ColorSpec::Rainbow(RainbowOptions {
                is_per_letter: self.rainbow_per_letter,
                speed: self.rainbow_speed,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarqueeState {
    pub speed: u32,
    /// Set while the text is too long to sit still.
    pub is_forced: bool,
}

impl Default for MarqueeState {
    fn default() -> Self {
        Self {
            speed: DEFAULT_MARQUEE_SPEED,
            is_forced: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerAction {
    SetText(String),
    /// Typed into the hex field. Applied to the color only if it parses.
    SetHexColor(String),
    /// Picked from a palette.
    PickColor(Rgb),
    SelectMode(ColorMode),
    SetRainbowSpeed(u32),
    SetRainbowPerLetter(bool),
    SetMarquee(bool),
    SetMarqueeSpeed(u32),
    /// The entry was sent; start over with an empty text.
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerState {
    text: String,
    color: ColorOptions,
    marquee: MarqueeState,
}

impl ComposerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A starting state with a random color, rainbow style and marquee speed.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let rgb = Rgb::new(
            rng.random_range(0..255),
            rng.random_range(0..255),
            rng.random_range(0..255),
        );
        Self {
            text: String::new(),
            color: ColorOptions {
                mode: ColorMode::Color,
                rgb,
                hex_input: rgb.to_hex(),
                rainbow_per_letter: rng.random_bool(0.5),
                rainbow_speed: rng.random_range(10..35),
            },
            marquee: MarqueeState {
                speed: rng.random_range(5..10),
                is_forced: false,
            },
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn color(&self) -> &ColorOptions {
        &self.color
    }

    #[must_use]
    pub fn marquee(&self) -> MarqueeState {
        self.marquee
    }

    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.char_len() <= MAX_TEXT_LEN
    }

    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.is_valid() && !self.text.is_empty()
    }

    #[must_use]
    pub fn is_long(&self) -> bool {
        self.char_len() > FORCE_MARQUEE_LEN
    }

    #[must_use]
    pub fn hex_input_is_valid(&self) -> bool {
        self.color.hex_input.parse::<Rgb>().is_ok()
    }

    #[must_use]
    pub fn reduce(self, action: ComposerAction) -> Self {
        let mut next = self;
        match action {
            ComposerAction::SetText(text) => next.text = text,
            ComposerAction::SetHexColor(input) => {
                if let Ok(rgb) = input.parse::<Rgb>() {
                    next.color.rgb = rgb;
                }
                next.color.hex_input = input;
                next.color.mode = ColorMode::Color;
            }
            ComposerAction::PickColor(rgb) => {
                next.color.rgb = rgb;
                next.color.hex_input = rgb.to_hex();
                next.color.mode = ColorMode::Color;
            }
            ComposerAction::SelectMode(mode) => next.color.mode = mode,
            ComposerAction::SetRainbowSpeed(speed) => {
                next.color.rainbow_speed =
                    speed.clamp(*RAINBOW_SPEED_RANGE.start(), *RAINBOW_SPEED_RANGE.end());
                next.color.mode = ColorMode::Rainbow;
            }
            ComposerAction::SetRainbowPerLetter(per_letter) => {
                next.color.rainbow_per_letter = per_letter;
                next.color.mode = ColorMode::Rainbow;
            }
            ComposerAction::SetMarquee(enabled) => {
                if !next.marquee.is_forced {
                    next.marquee.speed = if enabled { DEFAULT_MARQUEE_SPEED } else { 0 };
                }
            }
            ComposerAction::SetMarqueeSpeed(speed) => {
                next.marquee.speed =
                    speed.clamp(*MARQUEE_SPEED_RANGE.start(), *MARQUEE_SPEED_RANGE.end());
            }
            ComposerAction::Submitted => next.text.clear(),
        }
        next.enforce_marquee()
    }

    fn enforce_marquee(mut self) -> Self {
        let is_long = self.is_long();
        self.marquee.is_forced = is_long;
        if is_long && self.marquee.speed == 0 {
            self.marquee.speed = DEFAULT_MARQUEE_SPEED;
        }
        self
    }

    #[must_use]
    pub fn options(&self) -> TextEntryOptions {
        TextEntryOptions {
            color: self.color.spec(),
            marquee: MarqueeOptions {
                speed: self.marquee.speed,
            },
        }
    }

    /// The entry to submit, if the current text may be submitted.
    pub fn entry(&self) -> Result<TextEntry, EntryError> {
        let entry = TextEntry::new(self.text.clone(), self.options());
        entry.validate()?;
        Ok(entry)
    }
}
