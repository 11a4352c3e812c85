#![forbid(unsafe_code)]

//! Fixed-interval refetch of the subscribed resources.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::api::{DriverApi, Resource, fetch};
use crate::cache::{Applied, Cache};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Counts for one pass over the resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub fresh: usize,
    /// Superseded by a newer write or read before they landed.
    pub stale: usize,
    pub failed: usize,
}

pub struct Poller {
    api: Arc<dyn DriverApi>,
    cache: Cache,
    resources: Vec<Resource>,
    interval: Duration,
}

impl Poller {
    /// Polls every resource at the default interval.
    #[must_use]
    pub fn new(api: Arc<dyn DriverApi>, cache: Cache) -> Self {
        Self {
            api,
            cache,
            resources: Resource::ALL.to_vec(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_resources(mut self, resources: &[Resource]) -> Self {
        self.resources = resources.to_vec();
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Fetches the subscribed resources plus anything invalidated since the
    /// last pass, in [`Resource::ALL`] order.
    pub fn tick(&self) -> TickReport {
        let stale = self.cache.stale();
        let due = Resource::ALL
            .into_iter()
            .filter(|resource| self.resources.contains(resource) || stale.contains(resource));

        let mut report = TickReport::default();
        for resource in due {
            let ticket = self.cache.issue(resource);
            let result = fetch(self.api.as_ref(), resource);
            if result.is_err() {
                report.failed += 1;
            }
            match self.cache.apply(ticket, result) {
                Applied::Fresh => report.fresh += 1,
                Applied::Stale => report.stale += 1,
            }
        }
        debug!(
            backend = self.api.backend(),
            fresh = report.fresh,
            stale = report.stale,
            failed = report.failed,
            "poll tick"
        );
        report
    }

    /// Runs [`Poller::tick`] on a background thread: once right away, then
    /// after every interval or explicit refresh.
    pub fn spawn(self) -> io::Result<PollHandle> {
        let (control, commands) = mpsc::channel();
        let interval = self.interval;
        info!(
            backend = self.api.backend(),
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "polling started"
        );

        let thread = thread::Builder::new()
            .name("ledash-poll".to_string())
            .spawn(move || {
                loop {
                    self.tick();
                    match commands.recv_timeout(interval) {
                        Ok(Control::Refresh) | Err(RecvTimeoutError::Timeout) => {}
                        Ok(Control::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("polling stopped");
            })?;

        Ok(PollHandle {
            control,
            thread: Some(thread),
        })
    }
}

enum Control {
    Refresh,
    Stop,
}

/// Owns the polling thread. Dropping it stops the thread and waits for the
/// current tick to finish.
pub struct PollHandle {
    control: Sender<Control>,
    thread: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Starts the next tick now instead of at the end of the interval.
    pub fn refresh(&self) {
        let _ = self.control.send(Control::Refresh);
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.control.send(Control::Stop);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::api::PauseState;
    use crate::memory::MemoryDriver;

    #[test]
    fn tick_fetches_subscribed_and_stale_resources() {
        let cache = Cache::new();
        let poller = Poller::new(Arc::new(MemoryDriver::new()), cache.clone())
            .with_resources(&[Resource::Pause]);

        let report = poller.tick();
        assert_eq!(report.fresh, 1);
        assert!(cache.entries().is_loading());

        cache.invalidate(Resource::Entries);
        let report = poller.tick();
        assert_eq!(report.fresh, 2);
        assert_eq!(cache.entries().value.map(|list| list.len()), Some(0));
        assert!(cache.stale().is_empty());
    }

    #[test]
    fn failures_are_counted_and_recorded() {
        let driver = Arc::new(MemoryDriver::new());
        driver.set_offline(true);
        let cache = Cache::new();
        let poller = Poller::new(driver, cache.clone());

        let report = poller.tick();
        assert_eq!(report.failed, Resource::ALL.len());
        assert!(cache.health().error.is_some());
    }

    #[test]
    fn background_thread_picks_up_remote_changes() {
        let driver = Arc::new(MemoryDriver::new());
        let cache = Cache::new();
        let handle = Poller::new(driver.clone(), cache.clone())
            .with_resources(&[Resource::Pause])
            .with_interval(Duration::from_millis(10))
            .spawn()
            .expect("spawn poller");

        driver.set_pause(true).expect("pause");
        handle.refresh();

        let deadline = Instant::now() + Duration::from_secs(5);
        while cache.pause().value != Some(PauseState { is_paused: true }) {
            assert!(Instant::now() < deadline, "poll never landed");
            thread::sleep(Duration::from_millis(5));
        }
        handle.stop();
    }
}
