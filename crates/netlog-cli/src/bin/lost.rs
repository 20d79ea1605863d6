use anyhow::Result;
use clap::Parser;
use netlog_abstract::BucketConfig;
use netlog_cli::{init_logging, print_usage, write_output};
use netlog_loader::correlate_loss;
use std::path::{Path, PathBuf};
use tracing::info;

const OUTPUT: &str = "lost.csv";

#[derive(Parser, Debug)]
#[command(
    name = "lost",
    author,
    version,
    about = "Bucket packet-log and QUIC losses per time unit into lost.csv"
)]
struct Args {
    /// Pipe-separated packet log.
    packet_log: Option<PathBuf>,

    /// qlog file, either a traces document or line-delimited records.
    qlog: Option<PathBuf>,

    /// Anything after the expected files is ignored.
    #[arg(hide = true)]
    _extra: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (Some(packet_log), Some(qlog)) = (args.packet_log, args.qlog) else {
        print_usage::<Args>("Not enough args");
        return Ok(());
    };

    init_logging();
    info!("Correlating {} with {}", packet_log.display(), qlog.display());

    let report = correlate_loss(&packet_log, &qlog, BucketConfig::default());
    write_output(Path::new(OUTPUT), |out| report.write_csv(out))?;
    info!("Wrote {} buckets to {}", report.table.len(), OUTPUT);

    for summary in report.summaries() {
        println!("{summary}");
    }
    Ok(())
}
