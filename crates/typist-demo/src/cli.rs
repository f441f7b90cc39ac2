#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `TYPIST_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use crate::error::DemoError;
use crate::presets::Preset;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Accepted `--speed` range.
pub const SPEED_RANGE: std::ops::RangeInclusive<f64> = 1e-3..=1e3;

const HELP_TEXT: &str = "\
Typist Demo - typing animations in the terminal

USAGE:
    typist-demo [OPTIONS]

OPTIONS:
    --preset=NAME        Built-in page: 'landing' (default), 'showcase' or 'fold'
    --config=FILE        Load regions from a JSON file instead of a preset
    --speed=FACTOR       Time-scale multiplier, 0.001 to 1000 (default: 1.0)
    --seed=N             Seed variable-speed typing for reproducible runs
    --exit-after-ms=N    Auto-quit after N milliseconds (0 = never)
    --log=PATH           Write logs to PATH (filter from TYPIST_LOG)
    --help, -h           Show this help message
    --version, -V        Show version

PRESETS:
    landing     Multi-line hero paragraph typed once
    showcase    Looping, colored, variable-speed lines
    fold        A region below the first screen that starts when scrolled into view

KEYBINDINGS:
    Up / Down        Scroll one row
    PgUp / PgDn      Scroll one screen
    r                Restart every region
    q / Esc / Ctrl+C Quit

ENVIRONMENT VARIABLES:
    TYPIST_DEMO_PRESET          Override --preset
    TYPIST_DEMO_CONFIG          Override --config
    TYPIST_DEMO_SPEED           Override --speed
    TYPIST_DEMO_SEED            Override --seed
    TYPIST_DEMO_EXIT_AFTER_MS   Override --exit-after-ms
    TYPIST_DEMO_LOG             Override --log
    TYPIST_LOG                  Log filter directives (default: info)";

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the demo.
    Run(Opts),
    /// Print usage.
    Help,
    /// Print the version.
    Version,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Built-in page to show when no config file is given.
    pub preset: Preset,
    /// JSON region file.
    pub config_path: Option<PathBuf>,
    /// Time-scale multiplier applied to wall time.
    pub speed: f64,
    /// Base seed for variable-speed draws.
    pub seed: Option<u64>,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    /// Log file.
    pub log_path: Option<PathBuf>,
    /// `EnvFilter` directives.
    pub log_filter: String,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            preset: Preset::Landing,
            config_path: None,
            speed: 1.0,
            seed: None,
            exit_after_ms: 0,
            log_path: None,
            log_filter: "info".into(),
        }
    }
}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked to; prints the error and
    /// exits non-zero on bad input.
    pub fn parse() -> Self {
        match Self::try_parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("typist-demo {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(err.exit_code());
            }
        }
    }

    /// Parse `args` (without the program name), reading overrides through
    /// `env`.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags. Unparseable environment values are
    /// ignored; unparseable flags are errors.
    pub fn try_parse_from<I, S>(
        args: I,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Command, DemoError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = env("TYPIST_DEMO_PRESET")
            && let Some(preset) = Preset::from_name(&val)
        {
            opts.preset = preset;
        }
        if let Some(val) = env("TYPIST_DEMO_CONFIG")
            && !val.is_empty()
        {
            opts.config_path = Some(PathBuf::from(val));
        }
        if let Some(val) = env("TYPIST_DEMO_SPEED")
            && let Ok(speed) = parse_speed(&val)
        {
            opts.speed = speed;
        }
        if let Some(val) = env("TYPIST_DEMO_SEED")
            && let Ok(n) = val.parse()
        {
            opts.seed = Some(n);
        }
        if let Some(val) = env("TYPIST_DEMO_EXIT_AFTER_MS")
            && let Ok(n) = val.parse()
        {
            opts.exit_after_ms = n;
        }
        if let Some(val) = env("TYPIST_DEMO_LOG")
            && !val.is_empty()
        {
            opts.log_path = Some(PathBuf::from(val));
        }
        if let Some(val) = env("TYPIST_LOG")
            && !val.is_empty()
        {
            opts.log_filter = val;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                other => {
                    if let Some(val) = other.strip_prefix("--preset=") {
                        opts.preset = Preset::from_name(val).ok_or_else(|| {
                            DemoError::Usage(format!("Unknown preset: {val}"))
                        })?;
                    } else if let Some(val) = other.strip_prefix("--config=") {
                        opts.config_path = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--speed=") {
                        opts.speed = parse_speed(val)?;
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = Some(parse_flag("--seed", val)?);
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = parse_flag("--exit-after-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--log=") {
                        opts.log_path = Some(PathBuf::from(val));
                    } else {
                        return Err(DemoError::Usage(format!("Unknown argument: {other}")));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }
}

fn parse_flag<T: FromStr>(flag: &str, val: &str) -> Result<T, DemoError> {
    val.parse()
        .map_err(|_| DemoError::Usage(format!("Invalid {flag} value: {val}")))
}

fn parse_speed(val: &str) -> Result<f64, DemoError> {
    let speed: f64 = parse_flag("--speed", val)?;
    if SPEED_RANGE.contains(&speed) {
        Ok(speed)
    } else {
        Err(DemoError::Usage(format!(
            "Invalid --speed value: {val} (must be between {} and {})",
            SPEED_RANGE.start(),
            SPEED_RANGE.end()
        )))
    }
}
