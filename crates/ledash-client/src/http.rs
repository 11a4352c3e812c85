#![forbid(unsafe_code)]

//! Binding for the driver's own HTTP API.

use std::slice;
use std::time::Duration;

use ledash_core::{DeleteChoice, Direction, FlashState, TextEntry};
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::info;

use crate::api::{Ack, DriverApi, EntryList, Health, PauseState, Removed, ScrollPosition};
use crate::error::Result;
use crate::schema::decode;
use crate::transport::{Transport, Verb};

#[derive(Serialize)]
struct SetPauseRequest {
    should_pause: bool,
}

#[derive(Serialize)]
struct AddEntriesRequest<'a> {
    entries: &'a [TextEntry],
}

#[derive(Serialize)]
struct DeleteEntriesRequest {
    choice: DeleteChoice,
}

#[derive(Serialize)]
struct ReorderEntryRequest {
    entry: usize,
    direction: Direction,
}

#[derive(Serialize)]
struct ScrollEntriesRequest {
    direction: Direction,
}

#[derive(Serialize)]
struct FlashRequest {
    should_flash: bool,
}

/// Talks to the driver at `base_url` (scheme, host and port, no trailing
/// path).
#[derive(Debug, Clone)]
pub struct HttpDriver {
    transport: Transport,
}

impl HttpDriver {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let transport = Transport::new(base_url, timeout, HeaderMap::new())?;
        info!(base_url = transport.base_url(), "driver client ready");
        Ok(Self { transport })
    }
}

impl DriverApi for HttpDriver {
    fn backend(&self) -> &'static str {
        "http"
    }

    fn get_health(&self) -> Result<Health> {
        decode("health.get", &self.transport.get("/health")?)
    }

    fn get_pause(&self) -> Result<PauseState> {
        decode("pause.get", &self.transport.get("/pause")?)
    }

    fn set_pause(&self, should_pause: bool) -> Result<PauseState> {
        let body = self
            .transport
            .send(Verb::Put, "/pause", &SetPauseRequest { should_pause })?;
        decode("pause.set", &body)
    }

    fn get_entries(&self) -> Result<EntryList> {
        decode("entries.get", &self.transport.get("/entries")?)
    }

    fn add_entry(&self, entry: &TextEntry) -> Result<()> {
        let request = AddEntriesRequest {
            entries: slice::from_ref(entry),
        };
        let body = self.transport.send(Verb::Post, "/entries", &request)?;
        decode::<Ack>("entries.add", &body).map(|_| ())
    }

    fn delete_entries(&self, choice: DeleteChoice) -> Result<Removed> {
        let body = self
            .transport
            .send(Verb::Delete, "/entries", &DeleteEntriesRequest { choice })?;
        decode("entries.delete", &body)
    }

    fn patch_entry_order(&self, entry: usize, direction: Direction) -> Result<()> {
        let body = self.transport.send(
            Verb::Patch,
            "/entries/order",
            &ReorderEntryRequest { entry, direction },
        )?;
        decode::<Ack>("entries.order.patch", &body).map(|_| ())
    }

    fn get_scroll(&self) -> Result<ScrollPosition> {
        decode("entries.scroll.get", &self.transport.get("/entries/scroll")?)
    }

    fn post_scroll(&self, direction: Direction) -> Result<ScrollPosition> {
        let body = self.transport.send(
            Verb::Post,
            "/entries/scroll",
            &ScrollEntriesRequest { direction },
        )?;
        decode("entries.scroll.post", &body)
    }

    fn get_flash(&self) -> Result<FlashState> {
        decode("flash.get", &self.transport.get("/flash")?)
    }

    fn post_flash(&self, is_active: bool) -> Result<()> {
        let body = self.transport.send(
            Verb::Post,
            "/flash",
            &FlashRequest {
                should_flash: is_active,
            },
        )?;
        decode::<Ack>("flash.post", &body).map(|_| ())
    }
}
