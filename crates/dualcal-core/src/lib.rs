pub mod bucket;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod format;
pub mod grid;
pub mod html;
pub mod jalali;
pub mod registry;
pub mod render;
pub mod task;
pub mod widget;

use std::ffi::OsString;
use std::io;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting dualcal"
  );
  debug!(?cli.rc_overrides, "rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )
  .context("failed to load config")?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;

  let clock = Rc::new(
    clock::ZonedClock::new(
      cfg.reference_timezone()
    )
  );

  let mut out = io::stdout().lock();
  commands::dispatch(
    &cfg,
    clock,
    cli.command,
    &mut out
  )?;

  info!("done");
  Ok(())
}
