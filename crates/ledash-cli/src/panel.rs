use clap::Subcommand;
use ledash_client::Dashboard;
use ledash_core::Direction;
use serde_json::json;

use crate::error::Result;
use crate::util::{CliOutput, on_off};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub enum PauseCommand {
    #[default]
    Status,
    On,
    Off,
    Toggle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub enum ScrollCommand {
    #[default]
    Status,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub enum FlashCommand {
    #[default]
    Status,
    /// Blink once and wait until the flash is off again.
    Pulse,
}

pub fn run_health(dashboard: &Dashboard, out: CliOutput) -> Result<()> {
    let health = dashboard.api().get_health()?;
    out.emit(&health, || {
        format!(
            "{} ({})",
            if health.is_healthy { "healthy" } else { "unhealthy" },
            dashboard.api().backend()
        )
    })
}

pub fn run_pause(dashboard: &Dashboard, command: PauseCommand, out: CliOutput) -> Result<()> {
    let pause = match command {
        PauseCommand::Status => dashboard.api().get_pause()?,
        PauseCommand::On => dashboard.set_pause(true)?,
        PauseCommand::Off => dashboard.set_pause(false)?,
        PauseCommand::Toggle => dashboard.toggle_pause()?,
    };
    out.emit(&pause, || format!("paused: {}", on_off(pause.is_paused)))
}

pub fn run_scroll(dashboard: &Dashboard, command: ScrollCommand, out: CliOutput) -> Result<()> {
    let position = match command {
        ScrollCommand::Status => dashboard.api().get_scroll()?,
        ScrollCommand::Up => dashboard.scroll(Direction::Up)?,
        ScrollCommand::Down => dashboard.scroll(Direction::Down)?,
    };
    out.emit(&position, || format!("scroll: {}", position.scroll))
}

pub fn run_flash(dashboard: &Dashboard, command: FlashCommand, out: CliOutput) -> Result<()> {
    match command {
        FlashCommand::Status => {
            let flash = dashboard.api().get_flash()?;
            out.emit(&flash, || {
                format!(
                    "flash: {} ({} of {} steps lit)",
                    on_off(flash.is_active),
                    flash.on_steps,
                    flash.total_steps
                )
            })
        }
        FlashCommand::Pulse => {
            let pulse = dashboard.flash()?;
            out.note("flashing...");
            pulse.wait()?;
            out.emit(&json!({ "flashed": true }), || "flash done".to_string())
        }
    }
}
