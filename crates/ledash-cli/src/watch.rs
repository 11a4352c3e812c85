use std::thread;
use std::time::Duration;

use clap::Args;
use ledash_client::{CacheSnapshot, ClientConfig, Dashboard, TickReport, View};
use serde::Serialize;

use crate::entries::render_list;
use crate::error::{CliError, Result};
use crate::util::{CliOutput, now_utc_iso, on_off};

#[derive(Debug, Clone, Default, Args)]
pub struct WatchArgs {
    /// Milliseconds between polls; defaults to the configured interval.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many polls instead of running until interrupted.
    #[arg(long)]
    pub ticks: Option<u64>,
}

#[derive(Debug, Serialize)]
struct WatchFrame<'a> {
    at: String,
    tick: u64,
    fresh: usize,
    failed: usize,
    #[serde(flatten)]
    view: &'a CacheSnapshot,
}

pub fn run_watch(
    dashboard: &Dashboard,
    config: &ClientConfig,
    args: &WatchArgs,
    out: CliOutput,
) -> Result<()> {
    let interval = match args.interval_ms {
        Some(0) => return Err(CliError::invalid("--interval-ms must be positive")),
        Some(ms) => Duration::from_millis(ms),
        None => config.poll_interval(),
    };
    let poller = dashboard.poller();

    let mut tick = 0;
    loop {
        tick += 1;
        let report = poller.tick();
        let view = dashboard.cache().snapshot();
        let frame = WatchFrame {
            at: now_utc_iso(),
            tick,
            fresh: report.fresh,
            failed: report.failed,
            view: &view,
        };
        out.emit(&frame, || render_frame(&frame.at, tick, report, &view))?;

        if args.ticks.is_some_and(|limit| tick >= limit) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

fn render_frame(at: &str, tick: u64, report: TickReport, view: &CacheSnapshot) -> String {
    let mut lines = vec![format!(
        "── tick {tick} at {at} ({} fresh, {} failed) ──",
        report.fresh, report.failed
    )];
    lines.push(format!(
        "health: {}",
        show(&view.health, |health| {
            let state = if health.is_healthy { "healthy" } else { "unhealthy" };
            state.to_string()
        })
    ));
    lines.push(format!(
        "paused: {}",
        show(&view.pause, |pause| on_off(pause.is_paused).to_string())
    ));
    lines.push(format!(
        "flash:  {}",
        show(&view.flash, |flash| on_off(flash.is_active).to_string())
    ));
    lines.push(format!(
        "scroll: {}",
        show(&view.scroll, |scroll| scroll.scroll.to_string())
    ));

    match &view.entries.value {
        Some(list) => {
            let scroll = view.scroll.value.map_or(0, |position| position.scroll);
            lines.push(render_list(list, scroll));
        }
        None => lines.push(format!("entries: {}", show(&view.entries, |_| String::new()))),
    }
    lines.join("\n")
}

fn show<T>(view: &View<T>, render: impl FnOnce(&T) -> String) -> String {
    let mut shown = match &view.value {
        Some(value) => render(value),
        None if view.error.is_some() => "unavailable".to_string(),
        None => "loading".to_string(),
    };
    if let Some(error) = &view.error {
        shown.push_str(&format!(" (last read failed: {error})"));
    }
    shown
}
