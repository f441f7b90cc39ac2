#![forbid(unsafe_code)]

//! Typist demo binary entry point.

use std::time::Duration;

use typist_demo::cli::Opts;
use typist_demo::error::DemoError;
use typist_demo::host::{self, Stage};
use typist_demo::logging;
use typist_demo::presets;
use typist_demo::session::TerminalSession;

fn main() {
    let opts = Opts::parse();
    if let Err(err) = run(&opts) {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

fn run(opts: &Opts) -> Result<(), DemoError> {
    if let Some(path) = &opts.log_path {
        logging::init(path, &opts.log_filter)?;
    }

    let specs = match &opts.config_path {
        Some(path) => presets::load_regions(path)?,
        None => opts.preset.regions(),
    };
    tracing::info!(
        preset = opts.preset.name(),
        config = ?opts.config_path,
        regions = specs.len(),
        "starting demo"
    );

    // Regions are validated before the terminal is taken over.
    let mut stage = Stage::new(specs, crossterm::terminal::size()?, opts.speed, opts.seed)?;
    let session = TerminalSession::new()?;
    let (cols, rows) = session.size()?;
    stage.resize(cols, rows);
    let exit_after = (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms));
    host::run(&mut stage, &session, exit_after)
}
