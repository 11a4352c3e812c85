#![forbid(unsafe_code)]

//! Remote client for an LED text panel.
//!
//! [`DriverApi`] is the typed operation set; [`HttpDriver`], [`PanelStore`]
//! and [`MemoryDriver`] reach the panel through the driver's HTTP API, the
//! hosted datastore, or process memory. [`Cache`] holds what a front end
//! shows, [`Poller`] keeps it fresh and [`Dashboard`] performs writes with the
//! matching cache update.
//!
//! ```no_run
//! use ledash_client::{ClientConfig, Resource};
//!
//! # fn main() -> ledash_client::Result<()> {
//! let dashboard = ClientConfig::default().dashboard()?;
//! let _poll = dashboard.poller().spawn().expect("poll thread");
//! dashboard.set_pause(true)?;
//! assert_eq!(dashboard.cache().pause().value.map(|p| p.is_paused), Some(true));
//! # let _ = Resource::ALL;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod datastore;
pub mod error;
pub mod http;
pub mod memory;
pub mod poll;
mod schema;
mod transport;

pub use api::{
    DriverApi, EntryList, EntrySummary, Health, PauseState, Reading, Removed, Resource,
    ScrollPosition, fetch,
};
pub use cache::{Applied, Cache, CacheSnapshot, Ticket, View};
pub use config::{BackendKind, ClientConfig, DatastoreConfig};
pub use dashboard::{Dashboard, FlashPulse};
pub use datastore::PanelStore;
pub use error::{ClientError, ErrorKind, Result};
pub use http::HttpDriver;
pub use memory::MemoryDriver;
pub use poll::{PollHandle, Poller, TickReport};
