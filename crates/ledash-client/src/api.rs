#![forbid(unsafe_code)]

//! The remote operation set shared by every backend binding.
//!
//! Each method of [`DriverApi`] maps to one logical operation:
//!
//! | Operation | Method |
//! |---|---|
//! | `health.get` | [`DriverApi::get_health`] |
//! | `pause.get` / `pause.set` | [`DriverApi::get_pause`] / [`DriverApi::set_pause`] |
//! | `entries.get` / `add` | [`DriverApi::get_entries`] / [`DriverApi::add_entry`] |
//! | `entries.delete` | [`DriverApi::delete_entries`] |
//! | `entries.order.patch` | [`DriverApi::patch_entry_order`] |
//! | `entries.scroll.get` / `post` | [`DriverApi::get_scroll`] / [`DriverApi::post_scroll`] |
//! | `flash.get` / `flash.post` | [`DriverApi::get_flash`] / [`DriverApi::post_flash`] |
//!
//! Implementations validate every response before returning it; a body that
//! does not match the types below is a [`ClientError::Validation`].
//!
//! [`ClientError::Validation`]: crate::error::ClientError::Validation

use std::fmt;

use ledash_core::{DeleteChoice, Direction, FlashState, TextEntry, TextEntryOptions};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Health {
    pub is_healthy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PauseState {
    pub is_paused: bool,
}

/// One row of the entry listing. The driver only promises `text`; bindings
/// that know the options pass them along.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntrySummary {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<TextEntryOptions>,
}

impl From<TextEntry> for EntrySummary {
    fn from(entry: TextEntry) -> Self {
        Self {
            text: entry.text,
            options: Some(entry.options),
        }
    }
}

/// Entries in ascending slot order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EntryList {
    pub entries: Vec<EntrySummary>,
}

impl EntryList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Removed {
    pub num_removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub scroll: usize,
}

/// Acknowledgement body. Any JSON object is accepted; its fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {}

/// Typed access to the driver, independent of how it is reached.
pub trait DriverApi: Send + Sync {
    /// Short name for logs, e.g. `"http"`.
    fn backend(&self) -> &'static str;

    /// A reachable but unhealthy service is `Ok` with `is_healthy: false`.
    fn get_health(&self) -> Result<Health>;

    fn get_pause(&self) -> Result<PauseState>;

    /// The driver replies with the flag as it was before the write.
    fn set_pause(&self, should_pause: bool) -> Result<PauseState>;

    fn get_entries(&self) -> Result<EntryList>;

    /// Appends at slot `count`. The caller validates the entry first.
    fn add_entry(&self, entry: &TextEntry) -> Result<()>;

    fn delete_entries(&self, choice: DeleteChoice) -> Result<Removed>;

    /// Swaps slot `entry` with its neighbor. A missing neighbor is a silent
    /// no-op on the remote side; callers check the bounds beforehand.
    fn patch_entry_order(&self, entry: usize, direction: Direction) -> Result<()>;

    fn get_scroll(&self) -> Result<ScrollPosition>;

    /// Moves the scroll position one step, clamped to `[0, count]`.
    fn post_scroll(&self, direction: Direction) -> Result<ScrollPosition>;

    fn get_flash(&self) -> Result<FlashState>;

    fn post_flash(&self, is_active: bool) -> Result<()>;
}

/// A pollable read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Health,
    Pause,
    Entries,
    Scroll,
    Flash,
}

impl Resource {
    pub const ALL: [Self; 5] = [
        Self::Health,
        Self::Pause,
        Self::Entries,
        Self::Scroll,
        Self::Flash,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Pause => "pause",
            Self::Entries => "entries",
            Self::Scroll => "entries.scroll",
            Self::Flash => "flash",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of reading one [`Resource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    Health(Health),
    Pause(PauseState),
    Entries(EntryList),
    Scroll(ScrollPosition),
    Flash(FlashState),
}

impl Reading {
    #[must_use]
    pub fn resource(&self) -> Resource {
        match self {
            Self::Health(_) => Resource::Health,
            Self::Pause(_) => Resource::Pause,
            Self::Entries(_) => Resource::Entries,
            Self::Scroll(_) => Resource::Scroll,
            Self::Flash(_) => Resource::Flash,
        }
    }
}

/// Issues the read for `resource`.
pub fn fetch(api: &dyn DriverApi, resource: Resource) -> Result<Reading> {
    Ok(match resource {
        Resource::Health => Reading::Health(api.get_health()?),
        Resource::Pause => Reading::Pause(api.get_pause()?),
        Resource::Entries => Reading::Entries(api.get_entries()?),
        Resource::Scroll => Reading::Scroll(api.get_scroll()?),
        Resource::Flash => Reading::Flash(api.get_flash()?),
    })
}
