//! Logging configuration and initialization.
//!
//! Presets pick a baseline of `semparse::*` target levels; `--log` flags
//! override single targets and `RUST_LOG`, when set, replaces both.

use clap::{Args, ValueEnum};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging preset levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Lifecycle events and failures
    #[default]
    Production,
    /// Info for every semparse target
    Verbose,
    Debug,
    Trace,
    /// Warnings and errors only
    Quiet,
}

/// Logging flags shared by the server binary.
#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Enable verbose logging (INFO level for all targets)
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Enable trace logging
    #[arg(long)]
    pub trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Set log level for specific targets (e.g. "cluster=debug").
    /// Targets are prefixed with "semparse::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    pub overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub format: LogFormat,
}

/// Resolved logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Target overrides in the order given; later entries win.
    pub overrides: Vec<(String, Level)>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_args(args: &LogArgs) -> Self {
        // Most restrictive flag wins
        let preset = if args.quiet {
            LogPreset::Quiet
        } else if args.trace {
            LogPreset::Trace
        } else if args.debug {
            LogPreset::Debug
        } else if args.verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Production
        };

        let overrides = args
            .overrides
            .iter()
            .flat_map(|s| s.split(','))
            .filter_map(parse_override)
            .collect();

        Self {
            preset,
            overrides,
            format: args.format,
        }
    }

    /// Filter directives for the preset followed by overrides.
    pub fn directives(&self) -> Vec<String> {
        let base: &[&str] = match self.preset {
            LogPreset::Production => &[
                "semparse::startup=info",
                "semparse::api=info",
                "semparse::session=info",
                "semparse::acquire=warn",
                "semparse::cluster=info",
                "semparse::export=info",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &["semparse=info", "tower_http=info"],
            LogPreset::Debug => &["semparse=debug", "tower_http=debug"],
            LogPreset::Trace => &["semparse=trace", "tower_http=trace"],
            LogPreset::Quiet => &["semparse=warn", "tower_http=error"],
        };

        base.iter()
            .map(|d| d.to_string())
            .chain(
                self.overrides
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level.as_str().to_lowercase())),
            )
            .collect()
    }

    /// Build an EnvFilter, preferring `RUST_LOG` when it is set.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.directives().join(",")).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Parse `target=level`, qualifying bare targets with `semparse::`.
fn parse_override(part: &str) -> Option<(String, Level)> {
    let (target, level) = part.split_once('=')?;
    let target = target.trim();
    let level = Level::from_str(level.trim()).ok()?;
    if target.is_empty() {
        return None;
    }

    let target = if target.starts_with("semparse") || target == "tower_http" {
        target.to_string()
    } else {
        format!("semparse::{}", target)
    };
    Some((target, level))
}

/// Initialize the tracing subscriber with the given configuration.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}
