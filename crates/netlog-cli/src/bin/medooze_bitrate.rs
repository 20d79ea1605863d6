use anyhow::Result;
use clap::Parser;
use netlog_abstract::BucketConfig;
use netlog_cli::{init_logging, print_usage, write_output};
use netlog_loader::bitrate::extract_bitrate;
use netlog_loader::{PacketLogSource, read_source};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const OUTPUT: &str = "medooze_results.csv";

#[derive(Parser, Debug)]
#[command(
    name = "medooze-bitrate",
    author,
    version,
    about = "Annotate a packet log with per-bucket bitrates and feedback averages"
)]
struct Args {
    /// Pipe-separated packet log.
    packet_log: Option<PathBuf>,

    /// Anything after the expected files is ignored.
    #[arg(hide = true)]
    _extra: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let Some(packet_log) = args.packet_log else {
        print_usage::<Args>("Not enough args");
        return Ok(());
    };

    init_logging();

    let input = match read_source(&packet_log) {
        Ok(input) => input,
        Err(err) => {
            warn!("[{}] {}", PacketLogSource::LABEL, err);
            return Ok(());
        }
    };

    let report = extract_bitrate(&input, &BucketConfig::default());
    write_output(Path::new(OUTPUT), |out| report.write_csv(out))?;
    info!(
        "Wrote {} rows over {} buckets and {} feedback reports to {}",
        report.len(),
        report.table().len(),
        report.groups().len(),
        OUTPUT
    );
    Ok(())
}
