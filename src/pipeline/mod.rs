// src/pipeline/mod.rs
use crate::edgar::{EdgarClient, RatePolicy};
use crate::extractors::SubsidiaryExtractor;
use crate::storage::OutputSink;
use crate::utils::AppError;
use serde::Deserialize;
use std::collections::HashMap;

/// One company to process, as loaded from the input list.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyQuery {
    pub company_name: String,
    pub ticker: String,
}

/// Terminal failure state of a (company, year) pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NoFiling,
    NoExhibit,
    NoExtractableData,
}

impl FailureReason {
    /// Human-readable reason for the output's Notes column.
    pub fn as_note(&self) -> &'static str {
        match self {
            FailureReason::NoFiling => "10-K filing not found",
            FailureReason::NoExhibit => "Exhibit 21 not found",
            FailureReason::NoExtractableData => "Exhibit 21 found but no data extracted",
        }
    }
}

/// One extracted subsidiary, stamped with its company and filing year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsidiaryRecord {
    pub company_name: String,
    pub year: u32,
    pub subsidiary_name: String,
    pub jurisdiction: Option<String>,
}

/// Every (company, year) pair resolves to exactly one of these, so the
/// output sink never sees a silently missing year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearResult {
    Rows(Vec<SubsidiaryRecord>),
    Failure(FailureReason),
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub companies_completed: usize,
    pub companies_skipped: usize,
}

/// Drives the four-stage resolution per (company, year):
/// ticker -> CIK (once per company, cached per run), then per year
/// filing -> exhibit -> extraction, short-circuiting each year to its
/// failure reason. Strictly sequential; the rate policy supplies the
/// year-level and company-level courtesy delays on top of the fetcher's
/// per-request delay.
pub struct Pipeline<S: OutputSink> {
    client: EdgarClient,
    extractor: SubsidiaryExtractor,
    rate: RatePolicy,
    sink: S,
    start_year: u32,
    end_year: u32,
    // Negative lookups are cached too; a ticker is never re-derived in a run.
    cik_cache: HashMap<String, Option<String>>,
}

impl<S: OutputSink> Pipeline<S> {
    pub fn new(
        client: EdgarClient,
        extractor: SubsidiaryExtractor,
        rate: RatePolicy,
        sink: S,
        start_year: u32,
        end_year: u32,
    ) -> Self {
        Self {
            client,
            extractor,
            rate,
            sink,
            start_year,
            end_year,
            cik_cache: HashMap::new(),
        }
    }

    /// Processes the whole batch. A company that fails unexpectedly is
    /// logged and skipped; the batch always runs to the end.
    pub async fn run(&mut self, companies: &[CompanyQuery]) -> Result<RunSummary, AppError> {
        let mut summary = RunSummary::default();

        for query in companies {
            tracing::info!("Starting extraction for {} ({})", query.company_name, query.ticker);
            match self.process_company(query).await {
                Ok(true) => summary.companies_completed += 1,
                Ok(false) => summary.companies_skipped += 1,
                Err(e) => {
                    tracing::error!("Skipping {} after error: {}", query.company_name, e);
                    summary.companies_skipped += 1;
                }
            }
            self.rate.between_companies().await;
        }

        Ok(summary)
    }

    /// Returns Ok(false) when the company's identifier could not be
    /// resolved; that aborts all of its years and is reported once.
    async fn process_company(&mut self, query: &CompanyQuery) -> Result<bool, AppError> {
        let Some(cik) = self.resolve_cik_cached(&query.ticker).await else {
            tracing::error!(
                "Could not resolve CIK for {} ({}), skipping all years",
                query.company_name,
                query.ticker
            );
            return Ok(false);
        };

        let mut years = Vec::new();
        for year in self.start_year..=self.end_year {
            tracing::info!("Processing {} year {}...", query.ticker, year);
            let result = self.process_year(&cik, query, year).await;
            years.push((year, result));
            self.rate.between_years().await;
        }

        self.sink.persist(&query.company_name, &years)?;
        Ok(true)
    }

    /// The per-year state machine. Each stage's not-found and fetch-failure
    /// outcomes collapse into that stage's failure terminal.
    async fn process_year(&self, cik: &str, query: &CompanyQuery, year: u32) -> YearResult {
        let filing = match self.client.locate_annual_filing(cik, year).await {
            Ok(Some(filing)) => filing,
            Ok(None) => return YearResult::Failure(FailureReason::NoFiling),
            Err(e) => {
                tracing::warn!("Filing lookup failed for CIK {} year {}: {}", cik, year, e);
                return YearResult::Failure(FailureReason::NoFiling);
            }
        };

        let exhibit = match self.client.locate_exhibit21(&filing).await {
            Ok(Some(exhibit)) => exhibit,
            Ok(None) => return YearResult::Failure(FailureReason::NoExhibit),
            Err(e) => {
                tracing::warn!(
                    "Exhibit lookup failed for accession {}: {}",
                    filing.accession,
                    e
                );
                return YearResult::Failure(FailureReason::NoExhibit);
            }
        };

        let html = match self.client.download_exhibit(&exhibit).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Exhibit download failed from {}: {}", exhibit.url, e);
                return YearResult::Failure(FailureReason::NoExtractableData);
            }
        };

        let parsed = self.extractor.extract(&html);
        if parsed.is_empty() {
            return YearResult::Failure(FailureReason::NoExtractableData);
        }

        let records = parsed
            .into_iter()
            .map(|p| SubsidiaryRecord {
                company_name: query.company_name.clone(),
                year,
                subsidiary_name: p.name,
                jurisdiction: p.jurisdiction,
            })
            .collect();
        YearResult::Rows(records)
    }

    async fn resolve_cik_cached(&mut self, ticker: &str) -> Option<String> {
        if let Some(cached) = self.cik_cache.get(ticker) {
            return cached.clone();
        }
        let resolved = match self.client.resolve_cik(ticker).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("CIK lookup failed for {}: {}", ticker, e);
                None
            }
        };
        self.cik_cache.insert(ticker.to_string(), resolved.clone());
        resolved
    }
}
