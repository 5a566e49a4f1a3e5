// src/edgar/client.rs
use crate::edgar::fetcher::EdgarFetcher;
use crate::edgar::models::{
    CompanySubmission, ExhibitLocation, FilingIndex, FilingReference, TickerEntry,
};
use crate::utils::error::EdgarError;
use std::collections::HashMap;

const ANNUAL_REPORT_FORM: &str = "10-K";

/// Base URLs for the three EDGAR surfaces. Injected at construction so tests
/// can point the client at a local mock server.
#[derive(Debug, Clone)]
pub struct EdgarEndpoints {
    /// Full URL of the ticker-to-CIK lookup file.
    pub ticker_lookup_url: String,
    /// Host serving the structured submissions records.
    pub data_base: String,
    /// Host serving filing archives (document indexes and the documents).
    pub archives_base: String,
}

impl Default for EdgarEndpoints {
    fn default() -> Self {
        Self {
            ticker_lookup_url: "https://www.sec.gov/files/company_tickers.json".to_string(),
            data_base: "https://data.sec.gov".to_string(),
            archives_base: "https://www.sec.gov/Archives".to_string(),
        }
    }
}

/// The three registry lookups plus the exhibit download, layered over the
/// retrying fetcher. Every lookup returns `Ok(None)` when the registry has
/// no matching record; `Err` carries fetch failures, which callers collapse
/// into the same not-found handling after logging.
pub struct EdgarClient {
    fetcher: EdgarFetcher,
    endpoints: EdgarEndpoints,
}

impl EdgarClient {
    pub fn new(fetcher: EdgarFetcher, endpoints: EdgarEndpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// Resolves a ticker symbol to its zero-padded 10-digit CIK.
    /// Ticker comparison is case-insensitive.
    pub async fn resolve_cik(&self, ticker: &str) -> Result<Option<String>, EdgarError> {
        let table: HashMap<String, TickerEntry> = self
            .fetcher
            .fetch_json(&self.endpoints.ticker_lookup_url)
            .await?;

        for entry in table.values() {
            if entry.ticker.eq_ignore_ascii_case(ticker) {
                return Ok(Some(format!("{:010}", entry.cik_str)));
            }
        }

        tracing::warn!("CIK not found for ticker: {}", ticker);
        Ok(None)
    }

    /// Finds the 10-K filed in `year` for the given CIK. The submissions
    /// record lists filings newest-first, so the first index match is the
    /// most recent qualifying filing within the year.
    pub async fn locate_annual_filing(
        &self,
        cik: &str,
        year: u32,
    ) -> Result<Option<FilingReference>, EdgarError> {
        let url = format!("{}/submissions/CIK{}.json", self.endpoints.data_base, cik);
        let submission: CompanySubmission = self.fetcher.fetch_json(&url).await?;
        let recent = &submission.filings.recent;
        let year_prefix = year.to_string();

        for (i, form) in recent.form.iter().enumerate() {
            if form != ANNUAL_REPORT_FORM {
                continue;
            }
            let (Some(filing_date), Some(accession)) =
                (recent.filingDate.get(i), recent.accessionNumber.get(i))
            else {
                return Err(EdgarError::Parse(format!(
                    "Submissions record for CIK {} has ragged filing arrays",
                    cik
                )));
            };
            if filing_date.starts_with(&year_prefix) {
                return Ok(Some(FilingReference {
                    cik: cik.to_string(),
                    year,
                    accession: accession.replace('-', ""),
                }));
            }
        }

        tracing::warn!("No {} found for CIK {} in year {}", ANNUAL_REPORT_FORM, cik, year);
        Ok(None)
    }

    /// Scans the filing's document index for an Exhibit 21 document and
    /// returns its full archive URL.
    pub async fn locate_exhibit21(
        &self,
        filing: &FilingReference,
    ) -> Result<Option<ExhibitLocation>, EdgarError> {
        let index_url = filing.index_url(&self.endpoints.archives_base);
        let index: FilingIndex = self.fetcher.fetch_json(&index_url).await?;

        for item in &index.directory.item {
            if is_exhibit21_name(&item.name) {
                let url = filing.document_url(&self.endpoints.archives_base, &item.name);
                return Ok(Some(ExhibitLocation {
                    filing: filing.clone(),
                    url,
                }));
            }
        }

        tracing::warn!(
            "Exhibit 21 not found for CIK {} with accession {}",
            filing.cik,
            filing.accession
        );
        Ok(None)
    }

    /// Downloads the exhibit document body for the extractor.
    pub async fn download_exhibit(&self, exhibit: &ExhibitLocation) -> Result<String, EdgarError> {
        self.fetcher.fetch_text(&exhibit.url).await
    }
}

/// Exhibit 21 naming heuristic: the name carries the exhibit number, is not
/// a cover-page exhibit, and has an HTML extension. Filers are inconsistent
/// ("ex21.htm", "ex-21_1.htm", "exhibit211.htm", ...) so this stays loose.
fn is_exhibit21_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("21")
        && !name.contains("cover")
        && (name.ends_with(".htm") || name.ends_with(".html"))
}
