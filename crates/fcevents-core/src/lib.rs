pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod config;
pub mod dimension;
pub mod filter;
pub mod program;
#[cfg(feature = "cli")]
pub mod render;
pub mod state;
pub mod sync;
pub mod weekday;
pub mod widget;

#[cfg(feature = "cli")]
pub use driver::{
  run,
  run_to
};

#[cfg(feature = "cli")]
mod driver {
  use std::ffi::OsString;
  use std::io::{
    self,
    Write
  };

  use anyhow::Context;
  use clap::Parser;
  use tracing::{
    debug,
    info
  };

  use crate::sync::MemorySurface;
  use crate::widget::Widget;
  use crate::{
    cli,
    config,
    program,
    render
  };

  pub fn run(
    raw_args: Vec<OsString>
  ) -> anyhow::Result<()> {
    run_to(raw_args, io::stdout().lock())
  }

  /// Same as [`run`], printing the listing
  /// to `out`.
  #[tracing::instrument(skip_all)]
  pub fn run_to<W>(
    raw_args: Vec<OsString>,
    out: W
  ) -> anyhow::Result<()>
  where
    W: Write
  {
    let cli =
      cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(
      cli.verbose,
      cli.quiet
    )?;

    info!(
      verbose = cli.verbose,
      quiet = cli.quiet,
      "starting fcevents CLI"
    );

    let cfg = config::Config::load(
      cli.config.as_deref()
    )?;
    debug!(files = ?cfg.loaded_files, "catalog sources");

    let renderer =
      render::Renderer::new(&cli.color)?;

    let entries =
      program::load_listing(&cli.listing)
        .context(
          "failed to load program \
           listing"
        )?;

    let mut widget = Widget::init(
      cfg.catalog,
      entries,
      MemorySurface::new()
    )?;
    let frame = widget.apply_selection(
      cli.category.as_deref(),
      cli.filter_values()
    )?;

    renderer.write_frame(
      out,
      &frame,
      widget.entries(),
      widget.catalog()
    )?;

    info!(
      visible = frame.visible_count,
      "done"
    );
    Ok(())
  }
}
