#![forbid(unsafe_code)]

//! Binding for the hosted datastore (PostgREST surface).
//!
//! The panel's global state is the singleton row of `panels` keyed by the
//! panel id; entries are rows of `entries` with an integer `order` column and
//! the entry itself in a JSON `data` column. Operations that touch several
//! rows (single delete, reorder) are issued as independent requests, so a
//! concurrent writer can observe an intermediate order.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ledash_core::window::{clamp_scroll, neighbor, step_scroll};
use ledash_core::{DeleteChoice, Direction, FlashState, TextEntry};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::api::{DriverApi, EntryList, EntrySummary, Health, PauseState, Removed, ScrollPosition};
use crate::error::{ClientError, Result};
use crate::schema::decode;
use crate::transport::{Transport, Verb};

/// Panel the dashboard drives unless configured otherwise.
pub const DEFAULT_PANEL_ID: &str = "75097deb-6b35-4db2-a49e-ad638de4256c";

/// How recently the panel must have reported in to count as healthy.
pub const DEFAULT_HEALTH_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
struct PanelRow {
    is_paused: bool,
    scroll: usize,
    flash: FlashState,
    #[serde(default)]
    last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EntryRow {
    id: RowId,
    order: i64,
    data: TextEntry,
}

/// Whether `last_seen` falls within `window` of `now`. Timestamps slightly in
/// the future (clock skew) count as recent.
#[must_use]
pub fn is_recent(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    last_seen.is_some_and(|seen| now.signed_duration_since(seen).num_milliseconds() <= window_ms)
}

#[derive(Debug, Clone)]
pub struct PanelStore {
    transport: Transport,
    panel_id: String,
    health_window: Duration,
}

impl PanelStore {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        panel_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let panel_id = panel_id.trim();
        if panel_id.is_empty() {
            return Err(ClientError::config("panel id cannot be empty"));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let invalid = |_| ClientError::config("api key contains invalid header characters");
            headers.insert(
                HeaderName::from_static("apikey"),
                HeaderValue::from_str(key).map_err(invalid)?,
            );
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid)?,
            );
        }

        let transport = Transport::new(base_url, timeout, headers)?;
        info!(base_url = transport.base_url(), panel_id, "datastore client ready");
        Ok(Self {
            transport,
            panel_id: panel_id.to_string(),
            health_window: DEFAULT_HEALTH_WINDOW,
        })
    }

    #[must_use]
    pub fn with_health_window(mut self, window: Duration) -> Self {
        self.health_window = window;
        self
    }

    fn panel_path(&self) -> String {
        format!("/panels?id=eq.{}", self.panel_id)
    }

    fn panel(&self, operation: &'static str) -> Result<PanelRow> {
        let body = self
            .transport
            .get(&format!("{}&select=*", self.panel_path()))?;
        decode::<Vec<PanelRow>>(operation, &body)?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::PanelNotFound {
                panel_id: self.panel_id.clone(),
            })
    }

    fn patch_panel(&self, patch: &serde_json::Value) -> Result<()> {
        self.transport
            .send(Verb::Patch, &self.panel_path(), patch)
            .map(|_| ())
    }

    /// Entry rows sorted by `order`; the position in the result is the slot.
    fn rows(&self, operation: &'static str) -> Result<Vec<EntryRow>> {
        let body = self.transport.get(&format!(
            "/entries?panel_id=eq.{}&select=*&order=order.asc",
            self.panel_id
        ))?;
        let mut rows = decode::<Vec<EntryRow>>(operation, &body)?;
        rows.sort_by_key(|row| row.order);
        Ok(rows)
    }

    fn set_row_order(&self, id: &RowId, order: usize) -> Result<()> {
        self.transport
            .send(
                Verb::Patch,
                &format!("/entries?id=eq.{id}"),
                &json!({ "order": order }),
            )
            .map(|_| ())
    }
}

impl DriverApi for PanelStore {
    fn backend(&self) -> &'static str {
        "datastore"
    }

    fn get_health(&self) -> Result<Health> {
        let panel = self.panel("health.get")?;
        Ok(Health {
            is_healthy: is_recent(panel.last_seen, Utc::now(), self.health_window),
        })
    }

    fn get_pause(&self) -> Result<PauseState> {
        Ok(PauseState {
            is_paused: self.panel("pause.get")?.is_paused,
        })
    }

    fn set_pause(&self, should_pause: bool) -> Result<PauseState> {
        let previous = self.panel("pause.set")?.is_paused;
        self.patch_panel(&json!({ "is_paused": should_pause }))?;
        Ok(PauseState {
            is_paused: previous,
        })
    }

    fn get_entries(&self) -> Result<EntryList> {
        let entries = self
            .rows("entries.get")?
            .into_iter()
            .map(|row| EntrySummary::from(row.data))
            .collect();
        Ok(EntryList { entries })
    }

    fn add_entry(&self, entry: &TextEntry) -> Result<()> {
        let order = self.rows("entries.add")?.len();
        self.transport
            .send(
                Verb::Post,
                "/entries",
                &json!({ "panel_id": self.panel_id, "order": order, "data": entry }),
            )
            .map(|_| ())
    }

    fn delete_entries(&self, choice: DeleteChoice) -> Result<Removed> {
        match choice {
            DeleteChoice::All => {
                let path = format!("/entries?panel_id=eq.{}", self.panel_id);
                let request = self
                    .transport
                    .request(Verb::Delete, &path)
                    .header("prefer", "return=representation");
                let body = self.transport.dispatch(Verb::Delete, &path, request)?;
                let removed = decode::<Vec<serde_json::Value>>("entries.delete", &body)?.len();
                self.patch_panel(&json!({ "scroll": 0 }))?;
                Ok(Removed {
                    num_removed: removed,
                })
            }
            DeleteChoice::Single(index) => {
                let rows = self.rows("entries.delete")?;
                let count = rows.len();
                let row = rows
                    .get(index)
                    .ok_or(ClientError::OutOfRange { index, count })?;
                self.transport
                    .send(
                        Verb::Delete,
                        &format!("/entries?id=eq.{}", row.id),
                        &json!({}),
                    )
                    .map(|_| ())?;
                for (slot, later) in rows.iter().enumerate().skip(index + 1) {
                    self.set_row_order(&later.id, slot - 1)?;
                }

                let panel = self.panel("entries.delete")?;
                let clamped = clamp_scroll(panel.scroll, count - 1);
                if clamped != panel.scroll {
                    self.patch_panel(&json!({ "scroll": clamped }))?;
                }
                Ok(Removed { num_removed: 1 })
            }
        }
    }

    fn patch_entry_order(&self, entry: usize, direction: Direction) -> Result<()> {
        let rows = self.rows("entries.order.patch")?;
        let Some(other) = neighbor(entry, direction, rows.len()) else {
            debug!(entry, %direction, "reorder at boundary ignored");
            return Ok(());
        };
        self.set_row_order(&rows[entry].id, other)?;
        self.set_row_order(&rows[other].id, entry)
    }

    fn get_scroll(&self) -> Result<ScrollPosition> {
        Ok(ScrollPosition {
            scroll: self.panel("entries.scroll.get")?.scroll,
        })
    }

    fn post_scroll(&self, direction: Direction) -> Result<ScrollPosition> {
        let panel = self.panel("entries.scroll.post")?;
        let count = self.rows("entries.scroll.post")?.len();
        let scroll = step_scroll(panel.scroll, direction, count);
        if scroll != panel.scroll {
            self.patch_panel(&json!({ "scroll": scroll }))?;
        }
        Ok(ScrollPosition { scroll })
    }

    fn get_flash(&self) -> Result<FlashState> {
        Ok(self.panel("flash.get")?.flash)
    }

    fn post_flash(&self, is_active: bool) -> Result<()> {
        let flash = self.panel("flash.post")?.flash.with_active(is_active);
        self.patch_panel(&json!({ "flash": flash }))
    }
}
