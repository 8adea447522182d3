use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::KNOWN_KEYS;
use crate::theme::ThemeMode;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskly",
    version,
    about = "Taskly: a small task list with light and dark themes",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Override a tasklyrc setting, e.g. `--set settings.slide.ms=150`.
    #[arg(
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = clap::builder::ValueParser::new(parse_setting),
        action = ArgAction::Append
    )]
    pub settings: Vec<(String, String)>,

    /// Start in this theme (light or dark).
    #[arg(
        long = "theme",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<ThemeMode>())
    )]
    pub theme: Option<ThemeMode>,

    #[arg(long = "no-color")]
    pub no_color: bool,

    #[arg(long = "tasklyrc")]
    pub tasklyrc: Option<PathBuf>,

    /// Read shell commands from this file instead of stdin.
    #[arg(long = "script")]
    pub script: Option<PathBuf>,
}

impl GlobalCli {
    /// Config overrides in the order they apply. `--theme` and `--no-color`
    /// win over `--set`.
    pub fn config_overrides(&self) -> Vec<(String, String)> {
        let mut out = self.settings.clone();
        if let Some(mode) = self.theme {
            out.push(("theme".to_string(), mode.as_str().to_string()));
        }
        if self.no_color {
            out.push(("color".to_string(), "off".to_string()));
        }
        out
    }
}

fn parse_setting(s: &str) -> anyhow::Result<(String, String)> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
    let key = k.trim();
    if !KNOWN_KEYS.contains(&key) {
        return Err(anyhow!(
            "unknown setting: {key} (one of {})",
            KNOWN_KEYS.join(", ")
        ));
    }
    Ok((key.to_string(), v.trim().to_string()))
}

fn default_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) | (0, 0) => "warn",
        (0, 1) => "info",
        (0, 2) => "debug",
        (0, _) => "trace",
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
