// src/main.rs
mod edgar;
mod extractors;
mod input;
mod pipeline;
mod storage;
mod utils;

use clap::Parser;
use edgar::{EdgarClient, EdgarEndpoints, EdgarFetcher, FetchConfig, RatePolicy};
use extractors::SubsidiaryExtractor;
use pipeline::{CompanyQuery, Pipeline};
use std::path::PathBuf;
use storage::CsvSink;
use utils::AppError;

/// Command Line Interface for the SEC Exhibit 21 subsidiary extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file with the companies to process (header: company_name,ticker)
    #[arg(short, long)]
    companies: Option<PathBuf>,

    /// Ticker symbol for a single-company run (ignored when --companies is given)
    #[arg(short, long)]
    ticker: Option<String>,

    /// Company name used to label a single-company run (defaults to the ticker)
    #[arg(long)]
    company_name: Option<String>,

    /// First fiscal year to process
    #[arg(long, default_value = "2018")]
    start_year: u32,

    /// Last fiscal year to process
    #[arg(long, default_value = "2024")]
    end_year: u32,

    /// Output directory for the per-company datasets
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// User-Agent sent to EDGAR; SEC requires identifying contact details
    #[arg(long)]
    user_agent: Option<String>,
}

impl Args {
    fn company_list(&self) -> Result<Vec<CompanyQuery>, AppError> {
        if let Some(path) = &self.companies {
            return input::load_company_list(path);
        }
        if let Some(ticker) = &self.ticker {
            let company_name = self
                .company_name
                .clone()
                .unwrap_or_else(|| ticker.to_uppercase());
            return Ok(vec![CompanyQuery {
                company_name,
                ticker: ticker.clone(),
            }]);
        }
        Err(AppError::Config(
            "Provide either --companies <csv> or --ticker <symbol>".to_string(),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    if args.start_year > args.end_year {
        return Err(AppError::Config(format!(
            "start_year {} is after end_year {}",
            args.start_year, args.end_year
        )));
    }

    let companies = args.company_list()?;

    // 3. Wire up the fetch layer and pipeline
    let rate = RatePolicy::default();
    let mut fetch_config = FetchConfig::default();
    if let Some(user_agent) = args.user_agent {
        fetch_config.user_agent = user_agent;
    }
    let fetcher = EdgarFetcher::new(fetch_config, rate.clone())?;
    let client = EdgarClient::new(fetcher, EdgarEndpoints::default());
    let sink = CsvSink::new(&args.output_dir).map_err(AppError::Storage)?;

    let mut pipeline = Pipeline::new(
        client,
        SubsidiaryExtractor::new(),
        rate,
        sink,
        args.start_year,
        args.end_year,
    );

    // 4. Run the batch
    let summary = pipeline.run(&companies).await?;
    tracing::info!(
        "Processing finished. Completed: {}, Skipped: {}",
        summary.companies_completed,
        summary.companies_skipped
    );

    if summary.companies_completed == 0 {
        return Err(AppError::Processing(format!(
            "No companies completed ({} skipped)",
            summary.companies_skipped
        )));
    }

    Ok(())
}
