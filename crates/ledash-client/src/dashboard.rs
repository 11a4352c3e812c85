#![forbid(unsafe_code)]

//! User-facing writes, each paired with the cache update that keeps the view
//! in line with what the user just did.
//!
//! | Write | Cache after success |
//! |---|---|
//! | [`Dashboard::set_pause`] | pause overwritten with the requested value |
//! | [`Dashboard::add_entry`] | entry appended locally (or entries invalidated) |
//! | [`Dashboard::clear_entries`] | entries overwritten empty, scroll invalidated |
//! | [`Dashboard::remove_entry`] | slot removed locally, scroll invalidated |
//! | [`Dashboard::move_entry`] | slots swapped locally |
//! | [`Dashboard::scroll`] | scroll overwritten with the returned position |
//! | [`Dashboard::flash`] | flash shown active, then inactive after the pulse |
//!
//! Scroll, reorder and flash are checked against the view first (read from the
//! driver when it has not loaded yet) and refused with
//! [`ClientError::Refused`] when the view says they cannot apply.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ledash_core::window::{can_reorder, can_scroll, clamp_scroll, remove_slot, swap_adjacent};
use ledash_core::{ComposerAction, ComposerState, DeleteChoice, Direction, FlashState, TextEntry};
use tracing::{info, warn};

use crate::api::{
    DriverApi, EntryList, EntrySummary, PauseState, Reading, Removed, Resource, ScrollPosition,
    fetch,
};
use crate::cache::Cache;
use crate::error::{ClientError, Result};
use crate::poll::Poller;

/// How long a flash stays on before the pulse turns it off.
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(1000);

#[derive(Clone)]
pub struct Dashboard {
    api: Arc<dyn DriverApi>,
    cache: Cache,
    flash_duration: Duration,
}

impl Dashboard {
    #[must_use]
    pub fn new(api: Arc<dyn DriverApi>) -> Self {
        Self {
            api,
            cache: Cache::new(),
            flash_duration: DEFAULT_FLASH_DURATION,
        }
    }

    #[must_use]
    pub fn with_flash_duration(mut self, duration: Duration) -> Self {
        self.flash_duration = duration;
        self
    }

    #[must_use]
    pub fn api(&self) -> &dyn DriverApi {
        self.api.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// A poller feeding this dashboard's cache.
    #[must_use]
    pub fn poller(&self) -> Poller {
        Poller::new(Arc::clone(&self.api), self.cache.clone())
    }

    /// Reads `resource` now and stores the result.
    pub fn refresh(&self, resource: Resource) -> Result<Reading> {
        self.load(resource, |api| fetch(api, resource), |reading| reading)
    }

    /// Reads through `read` and records the outcome in the view, failures
    /// included.
    fn load<T: Clone>(
        &self,
        resource: Resource,
        read: impl FnOnce(&dyn DriverApi) -> Result<T>,
        wrap: impl FnOnce(T) -> Reading,
    ) -> Result<T> {
        let ticket = self.cache.issue(resource);
        match read(self.api.as_ref()) {
            Ok(value) => {
                self.cache.apply(ticket, Ok(wrap(value.clone())));
                Ok(value)
            }
            Err(error) => {
                self.cache.fail(ticket, &error);
                Err(error)
            }
        }
    }

    fn entry_list(&self) -> Result<EntryList> {
        match self.cache.entries().value {
            Some(list) => Ok(list),
            None => self.load(Resource::Entries, |api| api.get_entries(), Reading::Entries),
        }
    }

    fn scroll_position(&self) -> Result<ScrollPosition> {
        match self.cache.scroll().value {
            Some(position) => Ok(position),
            None => self.load(Resource::Scroll, |api| api.get_scroll(), Reading::Scroll),
        }
    }

    fn flash_state(&self) -> Result<FlashState> {
        match self.cache.flash().value {
            Some(flash) => Ok(flash),
            None => self.load(Resource::Flash, |api| api.get_flash(), Reading::Flash),
        }
    }

    // ─── Pause ───────────────────────────────────────────────────────────────

    /// Returns the state just written. The driver's reply reports the flag
    /// from before the write, so it only serves as an acknowledgement.
    pub fn set_pause(&self, should_pause: bool) -> Result<PauseState> {
        self.api.set_pause(should_pause)?;
        info!(should_pause, "pause set");
        let shown = PauseState {
            is_paused: should_pause,
        };
        self.cache.overwrite(Reading::Pause(shown));
        Ok(shown)
    }

    /// Flips the pause flag the view currently shows.
    pub fn toggle_pause(&self) -> Result<PauseState> {
        let current = match self.cache.pause().value {
            Some(pause) => pause,
            None => self.load(Resource::Pause, |api| api.get_pause(), Reading::Pause)?,
        };
        self.set_pause(!current.is_paused)
    }

    // ─── Entries ─────────────────────────────────────────────────────────────

    pub fn add_entry(&self, entry: TextEntry) -> Result<()> {
        entry.validate()?;
        self.api.add_entry(&entry)?;
        info!(len = entry.char_len(), "entry added");
        let summary = EntrySummary::from(entry);
        if !self.cache.update_entries(|list| list.entries.push(summary)) {
            self.cache.invalidate(Resource::Entries);
        }
        Ok(())
    }

    /// Sends the composed entry and returns the composer ready for the next
    /// one. On failure the caller still holds the unsent composer.
    pub fn submit(&self, composer: &ComposerState) -> Result<ComposerState> {
        self.add_entry(composer.entry()?)?;
        Ok(composer.clone().reduce(ComposerAction::Submitted))
    }

    pub fn clear_entries(&self) -> Result<Removed> {
        let removed = self.api.delete_entries(DeleteChoice::All)?;
        info!(num_removed = removed.num_removed, "entries cleared");
        self.cache.overwrite(Reading::Entries(EntryList::default()));
        self.cache.invalidate(Resource::Scroll);
        Ok(removed)
    }

    pub fn remove_entry(&self, index: usize) -> Result<Removed> {
        let removed = match self.api.delete_entries(DeleteChoice::Single(index)) {
            Ok(removed) => removed,
            Err(error) => {
                self.cache.invalidate(Resource::Entries);
                return Err(error);
            }
        };
        info!(index, "entry removed");

        let mut removed_locally = false;
        self.cache.update_entries(|list| {
            removed_locally = remove_slot(&mut list.entries, index).is_some();
        });
        if !removed_locally {
            self.cache.invalidate(Resource::Entries);
        }
        self.cache.invalidate(Resource::Scroll);
        Ok(removed)
    }

    /// Swaps slot `index` with its neighbor in `direction`.
    pub fn move_entry(&self, index: usize, direction: Direction) -> Result<()> {
        let count = self.entry_list()?.len();
        if !can_reorder(index, direction, count) {
            return Err(ClientError::refused(
                "reorder",
                format!("entry {index} has no neighbor {direction} among {count} entries"),
            ));
        }

        self.api.patch_entry_order(index, direction)?;
        info!(index, %direction, "entry moved");
        let mut swapped = false;
        self.cache.update_entries(|list| {
            swapped = swap_adjacent(&mut list.entries, index, direction);
        });
        if !swapped {
            self.cache.invalidate(Resource::Entries);
        }
        Ok(())
    }

    // ─── Scroll ──────────────────────────────────────────────────────────────

    pub fn scroll(&self, direction: Direction) -> Result<ScrollPosition> {
        let count = self.entry_list()?.len();
        let current = self.scroll_position()?;
        if !can_scroll(direction, current.scroll, count) {
            let bound = match direction {
                Direction::Up => "top",
                Direction::Down => "bottom",
            };
            return Err(ClientError::refused(
                "scroll",
                format!("already at the {bound}"),
            ));
        }

        let moved = self.api.post_scroll(direction)?;
        info!(%direction, scroll = moved.scroll, "scrolled");
        let shown = ScrollPosition {
            scroll: clamp_scroll(moved.scroll, count),
        };
        self.cache.overwrite(Reading::Scroll(shown));
        Ok(shown)
    }

    // ─── Flash ───────────────────────────────────────────────────────────────

    /// Turns the flash on and schedules it off after the flash duration on a
    /// background thread. Refused while a flash is in progress; the flash view
    /// is loaded first when it has not been read yet.
    pub fn flash(&self) -> Result<FlashPulse> {
        let shape = self.flash_state()?;
        if shape.is_active {
            return Err(ClientError::refused("flash", "a flash is already active"));
        }

        self.api.post_flash(true)?;
        info!(
            duration_ms = u64::try_from(self.flash_duration.as_millis()).unwrap_or(u64::MAX),
            "flash started"
        );
        self.cache.overwrite(Reading::Flash(shape.with_active(true)));

        let api = Arc::clone(&self.api);
        let cache = self.cache.clone();
        let duration = self.flash_duration;
        let spawned = thread::Builder::new()
            .name("ledash-flash".to_string())
            .spawn(move || {
                thread::sleep(duration);
                end_flash(api.as_ref(), &cache, shape)
            });

        match spawned {
            Ok(thread) => Ok(FlashPulse { thread }),
            Err(source) => {
                end_flash(self.api.as_ref(), &self.cache, shape)?;
                Err(ClientError::Thread {
                    name: "flash",
                    source,
                })
            }
        }
    }
}

fn end_flash(api: &dyn DriverApi, cache: &Cache, shape: FlashState) -> Result<()> {
    match api.post_flash(false) {
        Ok(()) => {
            cache.overwrite(Reading::Flash(shape.with_active(false)));
            info!("flash ended");
            Ok(())
        }
        Err(error) => {
            warn!(%error, "failed to end flash");
            cache.invalidate(Resource::Flash);
            Err(error)
        }
    }
}

/// A flash in progress.
#[derive(Debug)]
pub struct FlashPulse {
    thread: JoinHandle<Result<()>>,
}

impl FlashPulse {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Blocks until the flash has been turned off again.
    pub fn wait(self) -> Result<()> {
        self.thread
            .join()
            .unwrap_or_else(|_| Err(ClientError::refused("flash", "pulse thread panicked")))
    }
}

#[cfg(test)]
mod tests {
    use ledash_core::TextEntryOptions;

    use super::*;
    use crate::error::ErrorKind;
    use crate::memory::MemoryDriver;

    fn dashboard(texts: &[&str]) -> (Arc<MemoryDriver>, Dashboard) {
        let driver = Arc::new(MemoryDriver::with_entries(
            texts
                .iter()
                .map(|text| TextEntry::new(*text, TextEntryOptions::default()))
                .collect(),
        ));
        let dashboard = Dashboard::new(driver.clone());
        (driver, dashboard)
    }

    fn shown(dashboard: &Dashboard) -> Vec<String> {
        dashboard
            .cache()
            .entries()
            .value
            .expect("entries loaded")
            .entries
            .into_iter()
            .map(|entry| entry.text)
            .collect()
    }

    #[test]
    fn pause_is_shown_before_the_next_poll() {
        let (driver, dashboard) = dashboard(&[]);
        dashboard.set_pause(true).expect("pause");
        assert_eq!(
            dashboard.cache().pause().value,
            Some(PauseState { is_paused: true })
        );
        assert!(driver.get_pause().expect("pause").is_paused);

        dashboard.toggle_pause().expect("toggle");
        assert!(!driver.get_pause().expect("pause").is_paused);
    }

    #[test]
    fn invalid_entries_never_reach_the_driver() {
        let (driver, dashboard) = dashboard(&[]);
        let error = dashboard
            .add_entry(TextEntry::new("x".repeat(65), TextEntryOptions::default()))
            .expect_err("too long");
        assert_eq!(error.kind(), ErrorKind::Precondition);
        assert!(driver.entries().is_empty());
    }

    #[test]
    fn add_before_first_load_invalidates() {
        let (_, dashboard) = dashboard(&["a"]);
        dashboard
            .add_entry(TextEntry::new("b", TextEntryOptions::default()))
            .expect("add");
        assert_eq!(dashboard.cache().stale(), [Resource::Entries]);

        dashboard.poller().tick();
        assert_eq!(shown(&dashboard), ["a", "b"]);
    }

    #[test]
    fn failed_remove_invalidates_entries() {
        let (_, dashboard) = dashboard(&["a"]);
        dashboard.refresh(Resource::Entries).expect("load");
        let error = dashboard.remove_entry(4).expect_err("out of range");
        assert_eq!(error.kind(), ErrorKind::NotFoundOrOutOfRange);
        assert!(dashboard.cache().stale().contains(&Resource::Entries));
    }

    #[test]
    fn reorder_past_an_edge_is_refused_locally() {
        let (driver, dashboard) = dashboard(&["a", "b"]);
        let error = dashboard.move_entry(1, Direction::Down).expect_err("edge");
        assert_eq!(error.kind(), ErrorKind::Precondition);

        dashboard.move_entry(1, Direction::Up).expect("move");
        assert_eq!(shown(&dashboard), ["b", "a"]);
        assert_eq!(driver.entries()[0].text, "b");
    }

    #[test]
    fn scroll_is_refused_at_either_bound() {
        let (_, dashboard) = dashboard(&["a"]);
        let error = dashboard.scroll(Direction::Up).expect_err("top");
        assert!(error.to_string().contains("top"));

        assert_eq!(dashboard.scroll(Direction::Down).expect("down").scroll, 1);
        assert_eq!(dashboard.cache().scroll().value, Some(ScrollPosition { scroll: 1 }));
        let error = dashboard.scroll(Direction::Down).expect_err("bottom");
        assert!(error.to_string().contains("bottom"));
    }

    #[test]
    fn submit_resets_the_composer() {
        let (driver, dashboard) = dashboard(&[]);
        let composer = ComposerState::new()
            .reduce(ComposerAction::SetText("a rather long message".to_string()));
        let next = dashboard.submit(&composer).expect("submit");
        assert_eq!(next.text(), "");
        assert!(!next.marquee().is_forced);
        assert_eq!(driver.entries()[0].text, "a rather long message");
        assert!(driver.entries()[0].options.marquee.is_enabled());
    }

    #[test]
    fn second_flash_is_refused_while_first_runs() {
        let (_, dashboard) = dashboard(&[]);
        let dashboard = dashboard.with_flash_duration(Duration::from_millis(50));
        let pulse = dashboard.flash().expect("flash");
        let error = dashboard.flash().expect_err("already active");
        assert_eq!(error.kind(), ErrorKind::Precondition);

        pulse.wait().expect("pulse");
        assert!(dashboard.flash().is_ok());
    }

    #[test]
    fn flash_waits_for_a_remote_flash_it_has_not_seen() {
        let (driver, dashboard) = dashboard(&[]);
        driver.post_flash(true).expect("remote flash");

        let error = dashboard.flash().expect_err("remote flash active");
        assert_eq!(error.kind(), ErrorKind::Precondition);
        assert!(driver.get_flash().expect("flash").is_active);
        assert_eq!(
            dashboard.cache().flash().value,
            Some(crate::memory::DEFAULT_FLASH.with_active(true))
        );
    }

    #[test]
    fn flash_keeps_the_driver_cycle_shape() {
        let (_, dashboard) = dashboard(&[]);
        let dashboard = dashboard.with_flash_duration(Duration::from_millis(10));
        let pulse = dashboard.flash().expect("flash");
        let shown = dashboard.cache().flash().value.expect("flash loaded");
        assert_eq!(shown, crate::memory::DEFAULT_FLASH.with_active(true));
        pulse.wait().expect("pulse");
    }

    #[test]
    fn failed_fallback_reads_are_recorded() {
        let (driver, dashboard) = dashboard(&["a"]);
        driver.set_offline(true);

        let error = dashboard.scroll(Direction::Down).expect_err("offline");
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert!(dashboard.cache().entries().error.is_some());

        driver.set_offline(false);
        dashboard.refresh(Resource::Entries).expect("entries");
        driver.set_offline(true);
        dashboard.scroll(Direction::Down).expect_err("offline");
        assert!(dashboard.cache().scroll().error.is_some());
    }

    #[test]
    fn set_pause_reports_the_written_state() {
        let (driver, dashboard) = dashboard(&[]);
        assert_eq!(
            dashboard.set_pause(true).expect("pause"),
            PauseState { is_paused: true }
        );
        assert_eq!(
            dashboard.toggle_pause().expect("toggle"),
            PauseState { is_paused: false }
        );
        assert!(!driver.get_pause().expect("pause").is_paused);
    }
}
