use anyhow::Result;
use clap::Parser;
use netlog_cli::{init_logging, print_usage, write_output};
use netlog_loader::congestion::extract_congestion;
use netlog_loader::{EventSource, QlogSource, read_source};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const WINDOW_OUTPUT: &str = "quic_cwnd.csv";
const RTT_OUTPUT: &str = "quic_rtt.csv";

#[derive(Parser, Debug)]
#[command(
    name = "quic-cwnd",
    author,
    version,
    about = "Extract congestion window and RTT samples from a qlog file"
)]
struct Args {
    /// qlog file, either a traces document or line-delimited records.
    qlog: Option<PathBuf>,

    /// Anything after the expected files is ignored.
    #[arg(hide = true)]
    _extra: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let Some(qlog) = args.qlog else {
        print_usage::<Args>("Error, you must provide a filename");
        return Ok(());
    };

    init_logging();

    let streams = match read_source(&qlog).and_then(|input| QlogSource.streams(&input)) {
        Ok(streams) => streams,
        Err(err) => {
            warn!("[{}] {}", QlogSource::LABEL, err);
            return Ok(());
        }
    };

    let series = extract_congestion(&streams);
    write_output(Path::new(WINDOW_OUTPUT), |out| series.write_window_csv(out))?;
    write_output(Path::new(RTT_OUTPUT), |out| series.write_rtt_csv(out))?;
    info!(
        "Wrote {} window and {} rtt samples",
        series.window.len(),
        series.rtt.len()
    );
    Ok(())
}
