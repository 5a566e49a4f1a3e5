// src/input/mod.rs
use crate::pipeline::CompanyQuery;
use crate::utils::AppError;
use std::path::Path;

/// Loads the company batch from a CSV file with header
/// `company_name,ticker`.
pub fn load_company_list(path: &Path) -> Result<Vec<CompanyQuery>, AppError> {
    let mut reader = csv::Reader::from_path(path).map_err(AppError::Input)?;

    let mut companies = Vec::new();
    for row in reader.deserialize::<CompanyQuery>() {
        companies.push(row?);
    }

    if companies.is_empty() {
        return Err(AppError::Config(format!(
            "Company list {} contains no entries",
            path.display()
        )));
    }

    tracing::info!("Loaded {} companies from {}", companies.len(), path.display());
    Ok(companies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_ordered_company_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "company_name,ticker").unwrap();
        writeln!(file, "EASTMAN CHEMICAL CO,EMN").unwrap();
        writeln!(file, "Apple Inc.,AAPL").unwrap();

        let companies = load_company_list(file.path()).unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].ticker, "EMN");
        assert_eq!(companies[1].company_name, "Apple Inc.");
    }

    #[test]
    fn empty_list_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "company_name,ticker").unwrap();

        assert!(matches!(
            load_company_list(file.path()),
            Err(AppError::Config(_))
        ));
    }
}
