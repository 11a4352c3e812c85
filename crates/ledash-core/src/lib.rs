#![forbid(unsafe_code)]

//! Core model for the LED dashboard.
//!
//! - [`entry`]: text entries, color and marquee options, flash state, and the
//!   wire enums shared by every backend binding.
//! - [`window`]: scroll-window and reorder arithmetic.
//! - [`compose`]: the entry composer as an immutable state plus reducer.
//!
//! Nothing in this crate performs I/O. The remote client lives in
//! `ledash-client`.

pub mod compose;
pub mod entry;
pub mod window;

pub use compose::{ColorMode, ColorOptions, ComposerAction, ComposerState, MarqueeState};
pub use entry::{
    ColorParseError, ColorSpec, DeleteChoice, Direction, EntryError, FlashState, MarqueeOptions,
    RainbowOptions, Rgb, TextEntry, TextEntryOptions,
};
pub use window::SCROLL_CONTEXT_SIZE;
