#![forbid(unsafe_code)]

use clap::Parser;
use ledash_cli::util::CliOutput;
use ledash_cli::{Cli, run_with};
use ledash_client::{BackendKind, ClientConfig, Dashboard};
use ledash_core::ColorSpec;

struct Session {
    config: ClientConfig,
    dashboard: Dashboard,
}

impl Session {
    fn new() -> Self {
        let config = ClientConfig {
            backend: BackendKind::Memory,
            flash_duration_ms: 20,
            ..ClientConfig::default()
        };
        let dashboard = config.dashboard().expect("memory dashboard");
        Self { config, dashboard }
    }

    fn run(&self, args: &[&str]) -> ledash_cli::Result<()> {
        let cli = Cli::try_parse_from(std::iter::once("ledash").chain(args.iter().copied()))
            .expect("arguments parse");
        run_with(&self.dashboard, &self.config, cli.command, CliOutput::new(true))
    }

    fn texts(&self) -> Vec<String> {
        self.dashboard
            .api()
            .get_entries()
            .expect("entries")
            .entries
            .into_iter()
            .map(|entry| entry.text)
            .collect()
    }
}

#[test]
fn entry_lifecycle() {
    let session = Session::new();
    session.run(&["entries", "add", "first", "--color", "00ff00"]).expect("add");
    session
        .run(&["entries", "add", "second", "--rainbow", "--per-letter", "--rainbow-speed", "7"])
        .expect("add");
    session.run(&["entries", "add", "third"]).expect("add");
    assert_eq!(session.texts(), ["first", "second", "third"]);

    let stored = session.dashboard.api().get_entries().expect("entries");
    assert!(matches!(
        stored.entries[1].options.map(|options| options.color),
        Some(ColorSpec::Rainbow(_))
    ));

    session.run(&["entries", "move", "2", "up"]).expect("move");
    assert_eq!(session.texts(), ["first", "third", "second"]);

    session.run(&["entries", "remove", "0"]).expect("remove");
    assert_eq!(session.texts(), ["third", "second"]);

    session.run(&["entries"]).expect("list");
    session.run(&["entries", "clear"]).expect("clear");
    assert!(session.texts().is_empty());
}

#[test]
fn refused_moves_exit_with_usage_code() {
    let session = Session::new();
    session.run(&["entries", "add", "only"]).expect("add");

    let error = session.run(&["entries", "move", "0", "up"]).expect_err("edge");
    assert_eq!(error.exit_code(), 2);
    let error = session.run(&["scroll", "up"]).expect_err("top");
    assert_eq!(error.exit_code(), 2);
    let error = session.run(&["entries", "remove", "5"]).expect_err("missing");
    assert_eq!(error.exit_code(), 3);
}

#[test]
fn empty_and_overlong_text_is_rejected() {
    let session = Session::new();
    assert!(session.run(&["entries", "add", ""]).is_err());
    let long = "x".repeat(65);
    assert!(session.run(&["entries", "add", &long]).is_err());
    assert!(session.texts().is_empty());
}

#[test]
fn pause_scroll_and_flash() {
    let session = Session::new();
    session.run(&["pause", "on"]).expect("pause");
    assert!(session.dashboard.api().get_pause().expect("pause").is_paused);
    session.run(&["pause", "toggle"]).expect("toggle");
    assert!(!session.dashboard.api().get_pause().expect("pause").is_paused);

    session.run(&["entries", "add", "a"]).expect("add");
    session.run(&["scroll", "down"]).expect("scroll");
    assert_eq!(session.dashboard.api().get_scroll().expect("scroll").scroll, 1);

    session.run(&["flash", "pulse"]).expect("flash");
    assert!(!session.dashboard.api().get_flash().expect("flash").is_active);
    session.run(&["health"]).expect("health");
}

#[test]
fn bounded_watch_returns() {
    let session = Session::new();
    session
        .run(&["watch", "--ticks", "2", "--interval-ms", "5"])
        .expect("watch");
    assert!(session.dashboard.cache().snapshot().pause.value.is_some());
}

#[test]
fn incompatible_color_flags_do_not_parse() {
    let both = ["ledash", "entries", "add", "x", "--color", "fff", "--rainbow"];
    assert!(Cli::try_parse_from(both).is_err());
    assert!(Cli::try_parse_from(["ledash", "entries", "add", "x", "--per-letter"]).is_err());
}
