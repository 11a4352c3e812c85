#![forbid(unsafe_code)]

//! `ledash`: terminal front end for an LED text panel.

pub mod cli;
pub mod entries;
pub mod error;
pub mod panel;
pub mod util;
pub mod watch;

pub use cli::{Cli, Commands, ConnectionArgs, run, run_from_env, run_with};
pub use error::{CliError, Result};
