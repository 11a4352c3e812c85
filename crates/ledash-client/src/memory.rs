#![forbid(unsafe_code)]

//! In-process driver double.
//!
//! Keeps the whole panel state behind a mutex and answers every operation the
//! way the driver does, which makes it the backend for tests, demos and the
//! `memory` CLI backend. It can also be told to report unhealthy or to fail
//! every call, to exercise error paths without a network.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ledash_core::window::{clamp_scroll, remove_slot, step_scroll, swap_adjacent};
use ledash_core::{DeleteChoice, Direction, FlashState, TextEntry};
use tracing::debug;

use crate::api::{DriverApi, EntryList, EntrySummary, Health, PauseState, Removed, ScrollPosition};
use crate::error::{ClientError, Result};

/// Flash cycle the in-process panel reports.
pub const DEFAULT_FLASH: FlashState = FlashState {
    is_active: false,
    on_steps: 5,
    total_steps: 10,
};

#[derive(Debug)]
struct MemoryState {
    is_paused: bool,
    scroll: usize,
    flash: FlashState,
    entries: Vec<TextEntry>,
    is_healthy: bool,
    is_offline: bool,
}

#[derive(Debug)]
pub struct MemoryDriver {
    state: Mutex<MemoryState>,
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_entries(Vec::new())
    }

    #[must_use]
    pub fn with_entries(entries: Vec<TextEntry>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                is_paused: false,
                scroll: 0,
                flash: DEFAULT_FLASH,
                entries,
                is_healthy: true,
                is_offline: false,
            }),
        }
    }

    pub fn set_healthy(&self, is_healthy: bool) {
        self.lock().is_healthy = is_healthy;
    }

    /// While offline every operation fails with status 503.
    pub fn set_offline(&self, is_offline: bool) {
        self.lock().is_offline = is_offline;
    }

    /// Snapshot of the stored entries, for assertions.
    #[must_use]
    pub fn entries(&self) -> Vec<TextEntry> {
        self.lock().entries.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn online(&self, method: &'static str, path: &str) -> Result<MutexGuard<'_, MemoryState>> {
        let state = self.lock();
        if state.is_offline {
            return Err(ClientError::Status {
                method,
                path: path.to_string(),
                status: 503,
                body: "driver offline".to_string(),
            });
        }
        Ok(state)
    }
}

impl DriverApi for MemoryDriver {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn get_health(&self) -> Result<Health> {
        let state = self.online("GET", "/health")?;
        Ok(Health {
            is_healthy: state.is_healthy,
        })
    }

    fn get_pause(&self) -> Result<PauseState> {
        let state = self.online("GET", "/pause")?;
        Ok(PauseState {
            is_paused: state.is_paused,
        })
    }

    /// Replies with the flag as it was before the write, like the driver.
    fn set_pause(&self, should_pause: bool) -> Result<PauseState> {
        let mut state = self.online("PUT", "/pause")?;
        let previous = PauseState {
            is_paused: state.is_paused,
        };
        state.is_paused = should_pause;
        Ok(previous)
    }

    fn get_entries(&self) -> Result<EntryList> {
        let state = self.online("GET", "/entries")?;
        Ok(EntryList {
            entries: state
                .entries
                .iter()
                .cloned()
                .map(EntrySummary::from)
                .collect(),
        })
    }

    fn add_entry(&self, entry: &TextEntry) -> Result<()> {
        let mut state = self.online("POST", "/entries")?;
        state.entries.push(entry.clone());
        Ok(())
    }

    fn delete_entries(&self, choice: DeleteChoice) -> Result<Removed> {
        let mut state = self.online("DELETE", "/entries")?;
        match choice {
            DeleteChoice::All => {
                let num_removed = state.entries.len();
                state.entries.clear();
                state.scroll = 0;
                Ok(Removed { num_removed })
            }
            DeleteChoice::Single(index) => {
                let count = state.entries.len();
                remove_slot(&mut state.entries, index)
                    .ok_or(ClientError::OutOfRange { index, count })?;
                state.scroll = clamp_scroll(state.scroll, state.entries.len());
                Ok(Removed { num_removed: 1 })
            }
        }
    }

    fn patch_entry_order(&self, entry: usize, direction: Direction) -> Result<()> {
        let mut state = self.online("PATCH", "/entries/order")?;
        if !swap_adjacent(&mut state.entries, entry, direction) {
            debug!(entry, %direction, "reorder at boundary ignored");
        }
        Ok(())
    }

    fn get_scroll(&self) -> Result<ScrollPosition> {
        let state = self.online("GET", "/entries/scroll")?;
        Ok(ScrollPosition {
            scroll: state.scroll,
        })
    }

    fn post_scroll(&self, direction: Direction) -> Result<ScrollPosition> {
        let mut state = self.online("POST", "/entries/scroll")?;
        state.scroll = step_scroll(state.scroll, direction, state.entries.len());
        Ok(ScrollPosition {
            scroll: state.scroll,
        })
    }

    fn get_flash(&self) -> Result<FlashState> {
        Ok(self.online("GET", "/flash")?.flash)
    }

    fn post_flash(&self, is_active: bool) -> Result<()> {
        let mut state = self.online("POST", "/flash")?;
        state.flash = state.flash.with_active(is_active);
        Ok(())
    }
}
