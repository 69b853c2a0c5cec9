//! dbeaver-provision CLI Entry Point
//!
//! Reads the descriptor list and output directory (flags or environment),
//! writes `data-sources.json` and `credentials-config.json`, and prints a
//! short report to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use dbeaver_provision::config::{CONNECTIONS_ENV, DIR_ENV};
use dbeaver_provision::{
    logging, provision, ErrorEnvelope, Metadata, ProvisionReport, Settings, SuccessEnvelope,
};

/// Generate DBeaver connection and credential files from connection descriptors
#[derive(Parser)]
#[command(name = "dbeaver-provision")]
#[command(version)]
struct Cli {
    /// JSON array of connection descriptors
    #[arg(long, env = CONNECTIONS_ENV, hide_env_values = true)]
    connections: Option<String>,

    /// DBeaver workspace directory to write into (created if missing)
    #[arg(long, env = DIR_ENV)]
    dir: Option<PathBuf>,

    /// Print a JSON envelope instead of the text report
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

const COMMAND: &str = "provision";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet).context("Could not set up logging")?;

    let started = Instant::now();
    match run(&cli) {
        Ok(report) => {
            if cli.json {
                let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                let envelope = SuccessEnvelope::new(COMMAND, report, Metadata::new(elapsed));
                println!("{}", serde_json::to_string(&envelope)?);
            } else {
                println!("{}", report.summary);
            }
            Ok(())
        }
        Err(err) if cli.json => {
            println!("{}", serde_json::to_string(&ErrorEnvelope::from_error(COMMAND, &err))?);
            std::process::exit(1);
        }
        Err(err) => Err(anyhow::Error::new(err).context("Provisioning failed")),
    }
}

fn run(cli: &Cli) -> dbeaver_provision::Result<ProvisionReport> {
    let settings = Settings::new(cli.connections.clone(), cli.dir.clone())?;
    let descriptors = settings.descriptors()?;
    let output = provision(&descriptors)?;

    settings.ensure_output_dir()?;
    let (data_sources, credentials) = output.write_to(&settings.output_dir)?;

    Ok(ProvisionReport {
        summary: output.summary,
        files: vec![data_sources.display().to_string(), credentials.display().to_string()],
        diagnostics: output.diagnostics,
    })
}
