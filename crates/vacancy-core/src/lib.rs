pub mod calendar;
pub mod changes;
pub mod date_range_filter;
pub mod datetime;
pub mod editor;
pub mod messages;
pub mod month;
pub mod panel;
pub mod plan;

#[cfg(feature = "host")]
pub mod cli;
#[cfg(feature = "host")]
pub mod commands;
#[cfg(feature = "host")]
pub mod config;
#[cfg(feature = "host")]
pub mod datastore;
#[cfg(feature = "host")]
pub mod render;

#[cfg(feature = "host")]
use std::ffi::OsString;

#[cfg(feature = "host")]
use anyhow::Context;
#[cfg(feature = "host")]
use clap::Parser;
#[cfg(feature = "host")]
use tracing::{
  debug,
  info
};

/// Optional catalog in the data
/// directory overriding bundled text.
#[cfg(feature = "host")]
const MESSAGES_OVERRIDE_FILE: &str =
  "messages.toml";

#[cfg(feature = "host")]
#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting vacancy CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.vacancyrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let mut store =
    datastore::DataStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;

  let mut catalog =
    messages::Catalog::english();
  let overrides =
    data_dir.join(MESSAGES_OVERRIDE_FILE);
  if overrides.exists() {
    catalog.merge(
      messages::Catalog::load(
        &overrides
      )?
    );
  }

  let mut renderer =
    render::Renderer::new(
      &cfg, catalog
    )?;
  let inv = cli::Invocation::parse(
    &cfg, cli.rest
  )?;

  commands::dispatch(
    &mut store,
    &cfg,
    &mut renderer,
    inv
  )
}
