use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use reservation_details::ReservationDetails;
use reservation_report::{
    ApiClient, ApiConfig, DetailsQuery, ReportConfig, ReservationReport, load_record, print_report, to_json,
    write_breakdown_csv,
};

#[derive(Parser, Debug)]
#[command(name = "reservation-report", version, about = "Display and export JHMH reservation details")]
struct Cli {
    /// Path to config.toml (optional)
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Reporting API base URL
    #[arg(long, global = true, env = "JHMH_API_BASE_URL")]
    base_url: Option<String>,

    /// Reporting API key
    #[arg(long, global = true, env = "JHMH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one reservation
    Show {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        flags: QueryFlags,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write the financial breakdown of one reservation to CSV
    Export {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        flags: QueryFlags,
        #[arg(short, long, default_value = "breakdown.csv")]
        output: PathBuf,
    },
    /// Check that the reporting API is up
    Health,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Source {
    /// Confirmation code to fetch from the API
    #[arg(long)]
    code: Option<String>,
    /// Read the record from a JSON file instead (`-` for stdin)
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct QueryFlags {
    #[arg(long)]
    include_logs: bool,
    #[arg(long)]
    include_audit_note: bool,
    #[arg(long)]
    force_trace: bool,
    #[arg(long)]
    force_value: bool,
}

impl QueryFlags {
    fn to_query(&self) -> DetailsQuery {
        let set = |flag: bool| flag.then_some(true);
        DetailsQuery {
            include_logs: set(self.include_logs),
            include_audit_note: set(self.include_audit_note),
            force_trace: set(self.force_trace),
            force_value: set(self.force_value),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn api_client(config: &ReportConfig) -> Result<ApiClient> {
    let base_url = config
        .api
        .base_url
        .clone()
        .context("No API base URL. Set [api].base_url in config.toml, --base-url or JHMH_API_BASE_URL")?;
    let api_key = config.api.api_key.clone().unwrap_or_else(|| {
        warn!("no API key configured, requests will be sent without credentials");
        String::new()
    });

    let client = ApiClient::new(&ApiConfig::new(base_url, api_key).with_timeout(config.timeout()))?;
    Ok(client)
}

async fn resolve_record(config: &ReportConfig, source: &Source, flags: &QueryFlags) -> Result<ReservationDetails> {
    if let Some(path) = &source.file {
        let record = load_record(path)?;
        info!(path = %path.display(), fields = record.len(), "loaded reservation from file");
        return Ok(record);
    }

    let code = source.code.as_deref().unwrap_or_default();
    let client = api_client(config)?;
    let record = client
        .fetch_reservation(code, &flags.to_query())
        .await
        .with_context(|| format!("Failed to fetch reservation {code}"))?;
    info!(code, fields = record.len(), "fetched reservation");
    Ok(record)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "reservation_report=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ReportConfig::load(&cli.config)?.with_overrides(cli.base_url, cli.api_key);

    match cli.command {
        Command::Show { source, flags, format } => {
            let record = resolve_record(&config, &source, &flags).await?;
            let report = ReservationReport::build_with_currency(&record, Utc::now(), &config.display.currency);
            match format {
                OutputFormat::Text => print_report(&report),
                OutputFormat::Json => println!("{}", to_json(&report)?),
            }
        }
        Command::Export { source, flags, output } => {
            let record = resolve_record(&config, &source, &flags).await?;
            let report = ReservationReport::build_with_currency(&record, Utc::now(), &config.display.currency);
            write_breakdown_csv(&output, &report)?;
            println!("  Generated: {}", output.display());
        }
        Command::Health => {
            let health = api_client(&config)?.health().await?;
            println!(
                "  API: {} ({})",
                if health.healthy { "OK" } else { "DÉGRADÉE" },
                health.message
            );
            if !health.healthy {
                bail!("Reporting API reports status {:?}", health.status.as_deref().unwrap_or("unknown"));
            }
        }
    }

    Ok(())
}
