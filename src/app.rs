use std::{
    env,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use config_store::Override;
use log::info;
use schemas::Flavor;

use crate::{registry::build_registry, report::write_report, resolve::resolve};

const CONFIG_DIR_VAR: &str = "CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = "conf";

/// Resolves the configuration given on the command line and prints its report.
///
/// Every argument is a `key=value` override. The config directory is read
/// from `CONFIG_DIR`, falling back to `conf`.
///
/// # Errors
/// Any failure while building the registry, resolving or printing.
pub fn run(flavor: Flavor) -> Result<()> {
    let config_dir =
        PathBuf::from(env::var(CONFIG_DIR_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into()));
    let overrides = Override::parse_all(env::args().skip(1)).context("parsing overrides")?;

    let store = build_registry(flavor).context("building schema registry")?;
    let config = resolve(&store, Some(config_dir.as_path()), &overrides, flavor)
        .context("resolving configuration")?;

    info!("reporting resolved configuration");
    let mut out = io::stdout().lock();
    write_report(&mut out, &config)?;
    out.flush()?;
    Ok(())
}
