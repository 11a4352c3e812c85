use std::ops::RangeInclusive;

use clap::{Args, Subcommand};
use ledash_client::{Dashboard, EntryList};
use ledash_core::compose::{ColorMode, MARQUEE_SPEED_RANGE, RAINBOW_SPEED_RANGE};
use ledash_core::window::visible_range;
use ledash_core::{ColorSpec, ComposerAction, ComposerState, Direction, Rgb, TextEntryOptions};
use serde_json::json;

use crate::error::{CliError, Result};
use crate::util::CliOutput;

#[derive(Debug, Clone, Default, Subcommand)]
pub enum EntriesCommand {
    /// Print every entry; `*` marks the ones currently on the panel.
    #[default]
    List,

    /// Queue a new entry at the end.
    Add(AddArgs),

    /// Delete the entry at INDEX.
    Remove { index: usize },

    /// Delete every entry.
    Clear,

    /// Swap the entry at INDEX with its neighbor.
    Move { index: usize, direction: Direction },
}

#[derive(Debug, Clone, Default, Args)]
pub struct AddArgs {
    /// Message text, 1 to 64 characters.
    pub text: String,

    /// Solid color as hex (`ff8000`, `#f80`).
    #[arg(long, conflicts_with = "rainbow")]
    pub color: Option<String>,

    /// Cycle through the rainbow instead of a solid color.
    #[arg(long)]
    pub rainbow: bool,

    /// Give each letter its own rainbow phase.
    #[arg(long, requires = "rainbow")]
    pub per_letter: bool,

    /// Rainbow cycle speed, 1 to 50.
    #[arg(long, requires = "rainbow")]
    pub rainbow_speed: Option<u32>,

    /// Scroll the text horizontally at this speed, 1 to 15.
    #[arg(long, conflicts_with = "no_marquee")]
    pub marquee_speed: Option<u32>,

    /// Keep the text still (ignored for texts over 12 characters).
    #[arg(long)]
    pub no_marquee: bool,

    /// Start from a random color and speeds before applying the flags.
    #[arg(long)]
    pub random: bool,
}

impl AddArgs {
    /// Runs the flags through the composer so the result obeys the same rules
    /// as an interactive edit.
    pub fn compose(&self) -> Result<ComposerState> {
        let mut state = if self.random {
            ComposerState::random(&mut rand::rng())
        } else {
            ComposerState::new()
        };

        let mut actions = vec![ComposerAction::SetText(self.text.clone())];
        if let Some(hex) = &self.color {
            hex.parse::<Rgb>()?;
            actions.push(ComposerAction::SetHexColor(hex.clone()));
        }
        if self.rainbow {
            actions.push(ComposerAction::SelectMode(ColorMode::Rainbow));
            actions.push(ComposerAction::SetRainbowPerLetter(self.per_letter));
        }
        if let Some(speed) = self.rainbow_speed {
            check_range("rainbow speed", speed, &RAINBOW_SPEED_RANGE)?;
            actions.push(ComposerAction::SetRainbowSpeed(speed));
        }
        if let Some(speed) = self.marquee_speed {
            check_range("marquee speed", speed, &MARQUEE_SPEED_RANGE)?;
            actions.push(ComposerAction::SetMarquee(true));
            actions.push(ComposerAction::SetMarqueeSpeed(speed));
        }
        if self.no_marquee {
            actions.push(ComposerAction::SetMarquee(false));
        }

        for action in actions {
            state = state.reduce(action);
        }
        Ok(state)
    }
}

fn check_range(name: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(CliError::invalid(format!(
        "{name} must be between {} and {}, got {value}",
        range.start(),
        range.end()
    )))
}

pub fn run_entries(dashboard: &Dashboard, command: EntriesCommand, out: CliOutput) -> Result<()> {
    match command {
        EntriesCommand::List => {
            let list = dashboard.api().get_entries()?;
            let scroll = dashboard.api().get_scroll()?.scroll;
            out.emit(&list, || render_list(&list, scroll))
        }
        EntriesCommand::Add(args) => {
            let composer = args.compose()?;
            if composer.marquee().is_forced && args.no_marquee {
                out.note("text is longer than 12 characters; marquee stays on");
            }
            let entry = composer.entry()?;
            dashboard.submit(&composer)?;
            out.emit(&entry, || format!("added: {}", describe(&entry.text, &entry.options)))
        }
        EntriesCommand::Remove { index } => {
            let removed = dashboard.remove_entry(index)?;
            out.emit(&removed, || format!("removed entry {index}"))
        }
        EntriesCommand::Clear => {
            let removed = dashboard.clear_entries()?;
            out.emit(&removed, || format!("removed {} entries", removed.num_removed))
        }
        EntriesCommand::Move { index, direction } => {
            dashboard.move_entry(index, direction)?;
            out.emit(&json!({ "entry": index, "direction": direction }), || {
                format!("moved entry {index} {}", direction.as_str().to_ascii_lowercase())
            })
        }
    }
}

pub fn render_list(list: &EntryList, scroll: usize) -> String {
    if list.is_empty() {
        return "no entries".to_string();
    }
    let visible = visible_range(scroll, list.len());
    list.entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if visible.contains(&index) { '*' } else { ' ' };
            match &entry.options {
                Some(options) => format!("{marker} {index:>2}  {}", describe(&entry.text, options)),
                None => format!("{marker} {index:>2}  {}", entry.text),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(text: &str, options: &TextEntryOptions) -> String {
    let color = match options.color {
        ColorSpec::Rgb(rgb) => rgb.to_string(),
        ColorSpec::Rainbow(rainbow) if rainbow.is_per_letter => {
            format!("rainbow per letter, speed {}", rainbow.speed)
        }
        ColorSpec::Rainbow(rainbow) => format!("rainbow, speed {}", rainbow.speed),
    };
    if options.marquee.is_enabled() {
        format!("{text}  [{color}; marquee {}]", options.marquee.speed)
    } else {
        format!("{text}  [{color}]")
    }
}
