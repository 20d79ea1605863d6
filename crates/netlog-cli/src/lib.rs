use anyhow::{Context, Result};
use clap::CommandFactory;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::Level;

/// Logs go to stderr; stdout carries only usage and summary lines.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::INFO)
        .init();
}

/// Report missing arguments the way the tools always have: a short message
/// and the usage line on stdout, then a clean exit.
pub fn print_usage<A: CommandFactory>(message: &str) {
    println!("{message}");
    println!("{}", A::command().render_usage());
}

/// Create (or truncate) `path` and hand a buffered writer to `write`.
pub fn write_output<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("Failed to write output file {}", path.display()))?;
    Ok(())
}
