#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = ledash_cli::run_from_env() {
        eprintln!("ledash: {error}");
        std::process::exit(error.exit_code());
    }
}
