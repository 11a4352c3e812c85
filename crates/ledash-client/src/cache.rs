#![forbid(unsafe_code)]

//! The locally displayed view of the panel.
//!
//! One slot per [`Resource`]. Reads go through a [`Ticket`] issued before the
//! request leaves; writes either overwrite a slot with the value the user just
//! asked for or invalidate it so the next poll tick refetches it.
//!
//! Every ticket, overwrite and invalidation claims the next number from one
//! shared sequence. A slot remembers the newest number applied to it and
//! ignores anything older, so a poll that was already in flight when the user
//! acted can never put the pre-action state back on screen.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ledash_core::FlashState;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{EntryList, Health, PauseState, Reading, Resource, ScrollPosition};
use crate::error::{ClientError, Result};

/// What the cache currently shows for one resource.
///
/// A failed read keeps the last good value and records the error next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View<T> {
    pub value: Option<T>,
    pub error: Option<String>,
    /// Invalidated and not yet refetched.
    pub is_stale: bool,
}

impl<T> View<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.value.is_none() && self.error.is_none()
    }
}

/// Handle for one read, issued before the request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub resource: Resource,
    pub seq: u64,
}

/// Outcome of [`Cache::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Applied {
    Fresh,
    /// Something newer already landed in the slot; the result was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
    pub health: View<Health>,
    pub pause: View<PauseState>,
    pub entries: View<EntryList>,
    pub scroll: View<ScrollPosition>,
    pub flash: View<FlashState>,
}

#[derive(Debug, Default)]
struct Slot {
    value: Option<Reading>,
    error: Option<String>,
    applied_seq: u64,
    is_stale: bool,
}

#[derive(Debug, Default)]
struct CacheInner {
    last_seq: u64,
    slots: [Slot; 5],
    subscribers: Vec<Sender<Resource>>,
}

const fn slot_index(resource: Resource) -> usize {
    match resource {
        Resource::Health => 0,
        Resource::Pause => 1,
        Resource::Entries => 2,
        Resource::Scroll => 3,
        Resource::Flash => 4,
    }
}

impl CacheInner {
    fn claim(&mut self) -> u64 {
        self.last_seq += 1;
        self.last_seq
    }

    fn slot(&mut self, resource: Resource) -> &mut Slot {
        &mut self.slots[slot_index(resource)]
    }

    fn notify(&mut self, resource: Resource) {
        self.subscribers
            .retain(|subscriber| subscriber.send(resource).is_ok());
    }
}

/// Shared, cheaply clonable handle to the view.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    inner: Arc<Mutex<CacheInner>>,
}

impl Cache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims a sequence number for a read that is about to be sent.
    #[must_use]
    pub fn issue(&self, resource: Resource) -> Ticket {
        Ticket {
            resource,
            seq: self.lock().claim(),
        }
    }

    /// Stores the outcome of a read unless something newer already landed.
    pub fn apply(&self, ticket: Ticket, result: Result<Reading>) -> Applied {
        match result {
            Ok(reading) => self.land(ticket, Ok(reading)),
            Err(error) => self.fail(ticket, &error),
        }
    }

    /// Records a failed read. The slot keeps its last good value.
    pub fn fail(&self, ticket: Ticket, error: &ClientError) -> Applied {
        warn!(resource = %ticket.resource, %error, "read failed");
        self.land(ticket, Err(error.to_string()))
    }

    fn land(&self, ticket: Ticket, outcome: std::result::Result<Reading, String>) -> Applied {
        let mut inner = self.lock();
        let slot = inner.slot(ticket.resource);
        if ticket.seq <= slot.applied_seq {
            debug!(
                resource = %ticket.resource,
                seq = ticket.seq,
                applied = slot.applied_seq,
                "discarding stale read"
            );
            return Applied::Stale;
        }

        slot.applied_seq = ticket.seq;
        match outcome {
            Ok(reading) if reading.resource() == ticket.resource => {
                slot.value = Some(reading);
                slot.error = None;
                slot.is_stale = false;
            }
            Ok(reading) => {
                slot.error = Some(format!(
                    "read for {} returned {}",
                    ticket.resource,
                    reading.resource()
                ));
            }
            Err(message) => slot.error = Some(message),
        }
        inner.notify(ticket.resource);
        Applied::Fresh
    }

    /// Replaces a slot with a locally known value, superseding every read
    /// already in flight for it.
    pub fn overwrite(&self, reading: Reading) {
        let resource = reading.resource();
        let mut inner = self.lock();
        let seq = inner.claim();
        let slot = inner.slot(resource);
        slot.value = Some(reading);
        slot.error = None;
        slot.is_stale = false;
        slot.applied_seq = seq;
        inner.notify(resource);
    }

    /// Edits the cached entry list in place. Returns `false`, and leaves the
    /// slot alone, when no list has been loaded yet.
    pub fn update_entries(&self, edit: impl FnOnce(&mut EntryList)) -> bool {
        let mut inner = self.lock();
        let seq = inner.claim();
        let slot = inner.slot(Resource::Entries);
        let Some(Reading::Entries(list)) = slot.value.as_mut() else {
            return false;
        };
        edit(list);
        slot.applied_seq = seq;
        slot.error = None;
        inner.notify(Resource::Entries);
        true
    }

    /// Marks a slot for refetch and drops any read already in flight for it.
    /// The current value stays visible until the refetch lands.
    pub fn invalidate(&self, resource: Resource) {
        let mut inner = self.lock();
        let seq = inner.claim();
        let slot = inner.slot(resource);
        slot.applied_seq = seq;
        slot.is_stale = true;
        inner.notify(resource);
    }

    #[must_use]
    pub fn stale(&self) -> Vec<Resource> {
        let inner = self.lock();
        Resource::ALL
            .into_iter()
            .filter(|&resource| inner.slots[slot_index(resource)].is_stale)
            .collect()
    }

    /// Receives the resource of every slot change from now on. Dropping the
    /// receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<Resource> {
        let (sender, receiver) = mpsc::channel();
        self.lock().subscribers.push(sender);
        receiver
    }

    fn view<T>(&self, resource: Resource, extract: impl FnOnce(&Reading) -> Option<T>) -> View<T> {
        let inner = self.lock();
        let slot = &inner.slots[slot_index(resource)];
        View {
            value: slot.value.as_ref().and_then(extract),
            error: slot.error.clone(),
            is_stale: slot.is_stale,
        }
    }

    #[must_use]
    pub fn health(&self) -> View<Health> {
        self.view(Resource::Health, |reading| match reading {
            Reading::Health(health) => Some(*health),
            _ => None,
        })
    }

    #[must_use]
    pub fn pause(&self) -> View<PauseState> {
        self.view(Resource::Pause, |reading| match reading {
            Reading::Pause(pause) => Some(*pause),
            _ => None,
        })
    }

    #[must_use]
    pub fn entries(&self) -> View<EntryList> {
        self.view(Resource::Entries, |reading| match reading {
            Reading::Entries(list) => Some(list.clone()),
            _ => None,
        })
    }

    #[must_use]
    pub fn scroll(&self) -> View<ScrollPosition> {
        self.view(Resource::Scroll, |reading| match reading {
            Reading::Scroll(scroll) => Some(*scroll),
            _ => None,
        })
    }

    #[must_use]
    pub fn flash(&self) -> View<FlashState> {
        self.view(Resource::Flash, |reading| match reading {
            Reading::Flash(flash) => Some(*flash),
            _ => None,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            health: self.health(),
            pause: self.pause(),
            entries: self.entries(),
            scroll: self.scroll(),
            flash: self.flash(),
        }
    }
}
