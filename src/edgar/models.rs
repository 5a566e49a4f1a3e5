// src/edgar/models.rs
#![allow(non_snake_case)]
use serde::Deserialize;

/// Slice of the EDGAR company submission index we actually read.
/// Example: https://data.sec.gov/submissions/CIK0000915389.json
#[derive(Debug, Deserialize)]
pub struct CompanySubmission {
    pub filings: Filings,
}

#[derive(Debug, Deserialize)]
pub struct Filings {
    pub recent: FilingsList,
}

/// Parallel arrays: the i-th form corresponds to the i-th date and accession.
#[derive(Debug, Deserialize)]
pub struct FilingsList {
    pub accessionNumber: Vec<String>,
    pub filingDate: Vec<String>,
    pub form: Vec<String>,
}

/// One entry of the ticker lookup file (company_tickers.json).
#[derive(Debug, Deserialize)]
pub struct TickerEntry {
    pub cik_str: u64,
    pub ticker: String,
}

/// Per-filing document index (index.json inside the accession directory).
#[derive(Debug, Deserialize)]
pub struct FilingIndex {
    pub directory: FilingDirectory,
}

#[derive(Debug, Deserialize)]
pub struct FilingDirectory {
    pub item: Vec<FilingIndexItem>,
}

#[derive(Debug, Deserialize)]
pub struct FilingIndexItem {
    pub name: String,
}

/// One qualifying 10-K submission for a (CIK, year) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingReference {
    /// Zero-padded 10-digit CIK.
    pub cik: String,
    pub year: u32,
    /// Accession number with separators stripped.
    pub accession: String,
}

impl FilingReference {
    /// Archive paths use the CIK without its zero padding.
    pub fn cik_unpadded(&self) -> &str {
        self.cik.trim_start_matches('0')
    }

    /// URL of the filing's document index.
    pub fn index_url(&self, archives_base: &str) -> String {
        format!(
            "{}/edgar/data/{}/{}/index.json",
            archives_base,
            self.cik_unpadded(),
            self.accession
        )
    }

    /// URL of a named document inside the filing.
    pub fn document_url(&self, archives_base: &str, name: &str) -> String {
        format!(
            "{}/edgar/data/{}/{}/{}",
            archives_base,
            self.cik_unpadded(),
            self.accession,
            name
        )
    }
}

/// A located Exhibit 21 document within a filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhibitLocation {
    pub filing: FilingReference,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_urls_drop_cik_padding() {
        let filing = FilingReference {
            cik: "0000915389".to_string(),
            year: 2020,
            accession: "000091538920000044".to_string(),
        };
        assert_eq!(
            filing.index_url("https://www.sec.gov/Archives"),
            "https://www.sec.gov/Archives/edgar/data/915389/000091538920000044/index.json"
        );
        assert_eq!(
            filing.document_url("https://www.sec.gov/Archives", "ex21.htm"),
            "https://www.sec.gov/Archives/edgar/data/915389/000091538920000044/ex21.htm"
        );
    }
}
