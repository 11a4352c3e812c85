use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::Result;

/// Environment variable holding the log filter, e.g. `ledash_client=debug`.
pub const LOG_ENV: &str = "LEDASH_LOG";

/// Installs the stderr log subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_names(true),
        )
        .with(filter)
        .try_init();
}

#[must_use]
pub fn now_utc_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Writes results either as human-readable lines or as one JSON document per
/// result.
#[derive(Debug, Clone, Copy)]
pub struct CliOutput {
    json: bool,
}

impl CliOutput {
    #[must_use]
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    #[must_use]
    pub fn is_json(self) -> bool {
        self.json
    }

    pub fn emit<T: Serialize>(self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        let line = if self.json {
            serde_json::to_string(value)?
        } else {
            text()
        };
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
        Ok(())
    }

    /// A note for humans; suppressed in JSON mode so stdout stays parseable.
    pub fn note(self, message: &str) {
        if !self.json {
            eprintln!("{message}");
        }
    }
}

#[must_use]
pub fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
