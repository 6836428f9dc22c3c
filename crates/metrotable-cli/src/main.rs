use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use metrotable_client::{HtmlTableParser, ReqwestFetcher};
use metrotable_core::config::{DEFAULT_PAGE_URL, DEFAULT_SECTION_ANCHOR};
use metrotable_core::models::{Population, ResultSet};
use metrotable_core::{PipelineConfig, TablePipeline};

#[derive(Parser)]
#[command(name = "metrotable", version, about = "Wikipedia metropolitan area table extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print the extracted rows
    Fetch {
        /// Canonical URL of the article
        #[arg(long, env = "METROTABLE_PAGE_URL", default_value = DEFAULT_PAGE_URL)]
        page_url: String,

        /// Anchor of the section holding the table
        #[arg(long, env = "METROTABLE_SECTION_ANCHOR", default_value = DEFAULT_SECTION_ANCHOR)]
        anchor: String,

        /// Timeout for each upstream stage, in seconds
        #[arg(long, env = "METROTABLE_STAGE_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("metrotable=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            page_url,
            anchor,
            timeout_secs,
            format,
        } => {
            let config = PipelineConfig::new(&page_url, &anchor, timeout_secs)?;
            cmd_fetch(config, format).await?;
        }
    }

    Ok(())
}

async fn cmd_fetch(config: PipelineConfig, format: OutputFormat) -> Result<()> {
    let fetcher = ReqwestFetcher::with_timeout(config.stage_timeout)
        .context("Failed to create HTTP client")?;
    let pipeline = TablePipeline::new(fetcher, HtmlTableParser::new(), config);

    let result = pipeline.run().await?;
    if result.is_sentinel() {
        tracing::warn!("Section table contained no data rows");
    }

    let stdout = std::io::stdout();
    match format {
        OutputFormat::Json => {
            let mut out = stdout.lock();
            writeln!(out, "{}", result.to_pretty_json()?)?;
        }
        OutputFormat::Csv => write_csv(&result, stdout.lock())?,
    }

    Ok(())
}

/// Write records as CSV. The no-data sentinel produces only the header.
fn write_csv<W: Write>(result: &ResultSet, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["name", "country", "population", "url"])?;

    for record in result.records() {
        let population = match &record.population {
            Some(Population::Count(n)) => n.to_string(),
            Some(Population::Decimal(f)) => f.to_string(),
            Some(Population::Text(text)) => text.clone(),
            None => String::new(),
        };
        wtr.write_record([
            record.name.as_deref().unwrap_or_default(),
            record.country.as_deref().unwrap_or_default(),
            population.as_str(),
            record.url.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
