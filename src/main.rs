use std::io;
use std::process::ExitCode;

use clap::Parser;
use tidytuesday::cli::{Cli, run};
use tidytuesday::{SystemBrowser, SystemClock};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; `RUST_LOG` overrides the `-v` level and
/// `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tidytuesday={level}")));

    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut stdout = io::stdout().lock();
    match run(&cli, &SystemClock, &SystemBrowser, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
