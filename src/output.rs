//! Output formatting and persistence for computed summaries.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

/// Prints a summary as pretty JSON on stdout.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a summary as JSON to `path`, replacing any previous contents.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    debug!(path, "writing summary JSON");
    let file = File::create(path).with_context(|| format!("cannot create output file {path}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path, "summary written");
    Ok(())
}

/// Routes a summary to a file when a path is given, stdout otherwise.
pub fn emit(output: Option<&str>, value: &impl Serialize) -> Result<()> {
    match output {
        Some(path) => write_json(path, value),
        None => print_json(value),
    }
}
