use std::{env, io};

use anyhow::Context;
use iniconf::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let path = env::args().nth(1).context("expected path as first argument")?;
    let config = Config::read_file(&path).with_context(|| format!("failed to read {path}"))?;

    tracing::info!(sections = config.sections().count(), "parsed {path}");

    config.write_to(io::stdout().lock(), None)?;
    Ok(())
}
