pub mod cli;
pub mod commands;
pub mod config;
pub mod navigation;
pub mod render;
pub mod screens;
pub mod state;
pub mod store;
pub mod task;
pub mod theme;

use std::ffi::OsString;
use std::fs;
use std::io::{self, BufReader, IsTerminal};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting taskly"
    );

    let overrides = cli.config_overrides();
    debug!(?overrides, "command line overrides");

    let mut cfg = config::Config::load(cli.tasklyrc.as_deref())?;
    cfg.apply_overrides(overrides);

    let theme = cfg.theme()?;
    let slide = cfg.slide()?;
    let renderer = render::Renderer::new(&cfg)?;
    let state = state::AppState::shared(theme);

    let stdout = io::stdout();
    let mut shell = commands::Shell::new(state, slide, renderer, stdout.lock());

    match cli.script.as_deref() {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            shell.run(BufReader::new(file), None)?;
        }
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal().then(|| cfg.prompt());
            shell.run(stdin.lock(), prompt.as_deref())?;
        }
    }

    info!("done");
    Ok(())
}
