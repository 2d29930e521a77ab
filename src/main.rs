use clap::Parser;

/// Entry point for the sargraph sar log parser.
///
/// Reads a sar log from a file, standard input or a local command and
/// exports its series as CSV or a JSON summary.
///
/// # Errors
///
/// Returns an error if the configuration or the source cannot be opened, or
/// if the log has no valid banner line.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=info sargraph --command "LC_ALL=C sar -A" --csv sar.csv
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = sargraph::cli::Args::parse();
    sargraph::run(args).await
}
