//! gen-cashflow entry point: CLI wiring, config overrides and output files.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gen_cashflow::config::RunConfig;
use gen_cashflow::io::export::{export_layout_json, export_ledger_csv, export_series_csv};
use gen_cashflow::pipeline::{self, PipelineOutcome};

#[derive(Parser, Debug)]
#[command(name = "gen-cashflow")]
#[command(about = "Project the 25-year cashflow of on-site generation systems from simulation results")]
struct Cli {
    /// Load the run from a TOML config file
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Use a built-in tariff preset (flat_rate, time_of_use)
    #[arg(long)]
    preset: Option<String>,

    /// Simulation result table (CSV)
    #[arg(long)]
    results: Option<PathBuf>,

    /// Building descriptor with the generation system financial lines
    #[arg(long)]
    descriptor: Option<PathBuf>,

    /// Annual discount rate in percent
    #[arg(long)]
    discount: Option<f64>,

    /// Currency label for the report
    #[arg(long)]
    currency: Option<String>,

    /// Write the per-generator ledger as CSV
    #[arg(long)]
    ledger_out: Option<PathBuf>,

    /// Write the chart layout as JSON
    #[arg(long)]
    layout_out: Option<PathBuf>,

    /// Write the parsed series with their headers as CSV
    #[arg(long)]
    series_out: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> Result<RunConfig> {
        let mut config = if let Some(path) = &self.config {
            RunConfig::from_toml_file(path)?
        } else if let Some(name) = &self.preset {
            RunConfig::from_preset(name)?
        } else {
            RunConfig::flat_rate()
        };

        if let Some(results) = &self.results {
            config.inputs.results = Some(results.clone());
        }
        if let Some(descriptor) = &self.descriptor {
            config.inputs.descriptor = Some(descriptor.clone());
        }
        if self.discount.is_some() {
            config.finance.discount_percent = self.discount;
        }
        if let Some(currency) = &self.currency {
            config.finance.currency = Some(currency.clone());
        }
        if let Some(path) = &self.ledger_out {
            config.output.ledger_csv = Some(path.clone());
        }
        if let Some(path) = &self.layout_out {
            config.output.layout_json = Some(path.clone());
        }
        if let Some(path) = &self.series_out {
            config.output.series_csv = Some(path.clone());
        }
        Ok(config)
    }
}

fn write_outputs(config: &RunConfig, outcome: &PipelineOutcome) -> Result<()> {
    let output = &config.output;

    if let (Some(path), Some(parsed)) = (&output.series_csv, &outcome.parsed) {
        let series: Vec<_> = parsed.all_series().collect();
        export_series_csv(&series, path).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "series written");
    }
    if let (Some(path), Some(cashflow)) = (&output.ledger_csv, &outcome.cashflow) {
        export_ledger_csv(cashflow, path).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "ledger written");
    }
    if let (Some(path), Some(layout)) = (&output.layout_json, &outcome.layout) {
        export_layout_json(layout, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "chart layout written");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.load_config()?;
    let outcome = pipeline::run(&config);

    // Series parsed before a failure are still worth writing.
    write_outputs(&config, &outcome)?;

    if let Some(report) = &outcome.report {
        println!("{report}");
    }

    if let Some(error) = outcome.error {
        bail!("{error} ({:?})", error.kind());
    }
    Ok(())
}
