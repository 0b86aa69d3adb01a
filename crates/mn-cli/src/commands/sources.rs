//! Sources command for showing what `list` will fetch.

use std::io::Write;

use anyhow::Result;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    if config.sources.is_empty() {
        writeln!(writer, "No sources configured.")?;
        return Ok(());
    }

    writeln!(writer, "Sources (timeout {}s):", config.request_timeout_secs)?;
    for source in &config.sources {
        writeln!(writer, "- {}: {}", source.name(), source.location())?;
    }

    Ok(())
}
