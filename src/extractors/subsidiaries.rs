// src/extractors/subsidiaries.rs
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;

// --- CSS Selectors (Lazy Static) ---
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("Failed to compile CELL_SELECTOR"));

/// One extracted (name, jurisdiction) pair, before the pipeline stamps it
/// with company and year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSubsidiary {
    pub name: String,
    pub jurisdiction: Option<String>,
}

/// Extracts subsidiary listings from an Exhibit 21 HTML document.
///
/// Exhibit formatting is not standardized across filers or years, so this
/// degrades in two tiers: structured table rows first, and a line-based text
/// heuristic when the document has no usable tables. An empty result means
/// neither tier recovered anything.
pub struct SubsidiaryExtractor;

impl SubsidiaryExtractor {
    pub fn new() -> Self {
        Self {}
    }

    pub fn extract(&self, html_content: &str) -> Vec<ParsedSubsidiary> {
        let document = Html::parse_document(html_content);

        let from_tables = self.extract_from_tables(&document);
        if !from_tables.is_empty() {
            tracing::debug!("Extracted {} subsidiaries from tables", from_tables.len());
            return from_tables;
        }

        let from_text = self.extract_from_text(&document);
        tracing::debug!(
            "No table rows found, text fallback produced {} entries",
            from_text.len()
        );
        from_text
    }

    /// Tier 1: every row of every table. A row with two or more non-empty
    /// cells yields (first cell, second cell). Document order is preserved
    /// and duplicates are kept.
    fn extract_from_tables(&self, document: &Html) -> Vec<ParsedSubsidiary> {
        let mut parsed = Vec::new();

        for table in document.select(&TABLE_SELECTOR) {
            for row in table.select(&ROW_SELECTOR) {
                let cells: Vec<String> = row
                    .select(&CELL_SELECTOR)
                    .map(|cell| clean_cell_text(&cell.text().collect::<String>()))
                    .filter(|text| !text.is_empty())
                    .collect();

                if cells.len() >= 2 {
                    parsed.push(ParsedSubsidiary {
                        name: cells[0].clone(),
                        jurisdiction: Some(cells[1].clone()),
                    });
                }
            }
        }

        parsed
    }

    /// Tier 2: visible text lines that look like subsidiary names. Lines are
    /// kept when, after stripping leading bullets and whitespace, they are
    /// longer than two characters and start with an uppercase letter.
    /// Deduplicated by exact (case-sensitive) text equality; no jurisdiction
    /// is available at this tier, and no ordering is guaranteed.
    fn extract_from_text(&self, document: &Html) -> Vec<ParsedSubsidiary> {
        let text = document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join("\n");

        let mut seen = HashSet::new();
        let mut parsed = Vec::new();

        for raw_line in text.lines() {
            let line = strip_bullet(raw_line);
            if line.len() <= 2 {
                continue;
            }
            let starts_upper = line.chars().next().is_some_and(|c| c.is_uppercase());
            if !starts_upper {
                continue;
            }
            if seen.insert(line.to_string()) {
                parsed.push(ParsedSubsidiary {
                    name: line.to_string(),
                    jurisdiction: None,
                });
            }
        }

        parsed
    }
}

/// Collapses whitespace (including non-breaking spaces) inside a cell.
fn clean_cell_text(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips leading list markers and whitespace from a candidate line.
fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, '•' | '·' | '●' | '○' | '▪' | '-' | '*' | '\u{2023}')
    })
    .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<ParsedSubsidiary> {
        SubsidiaryExtractor::new().extract(html)
    }

    #[test]
    fn table_rows_preserve_order() {
        let html = r#"
            <html><body>
            <table>
              <tr><td>Acme GmbH</td><td>Germany</td></tr>
              <tr><td>Acme Ltd</td><td>UK</td></tr>
            </table>
            </body></html>
        "#;

        let parsed = extract(html);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Acme GmbH");
        assert_eq!(parsed[0].jurisdiction.as_deref(), Some("Germany"));
        assert_eq!(parsed[1].name, "Acme Ltd");
        assert_eq!(parsed[1].jurisdiction.as_deref(), Some("UK"));
    }

    #[test]
    fn empty_cells_are_skipped_when_counting() {
        // Layout tables often pad rows with empty spacer cells
        let html = r#"
            <table>
              <tr><td></td><td>Acme GmbH</td><td>&nbsp;</td><td>Germany</td></tr>
              <tr><td>Acme Holdings</td><td></td></tr>
            </table>
        "#;

        let parsed = extract(html);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Acme GmbH");
        assert_eq!(parsed[0].jurisdiction.as_deref(), Some("Germany"));
    }

    #[test]
    fn table_duplicates_are_kept() {
        let html = r#"
            <table>
              <tr><td>Acme Ltd</td><td>UK</td></tr>
              <tr><td>Acme Ltd</td><td>UK</td></tr>
            </table>
        "#;
        assert_eq!(extract(html).len(), 2);
    }

    #[test]
    fn text_fallback_strips_bullets_and_dedups_exactly() {
        let html = r#"
            <html><body>
            <p>Acme Corp</p>
            <p>•Acme Corp</p>
            <p>ACME Holdings Inc.</p>
            <p>of the registrant</p>
            <p>Zy</p>
            </body></html>
        "#;

        let parsed = extract(html);
        let names: Vec<&str> = parsed.iter().map(|p| p.name.as_str()).collect();
        // Bullet variant collapses into the plain one; lowercase-initial and
        // two-character lines are filtered out.
        assert!(names.contains(&"Acme Corp"));
        assert!(names.contains(&"ACME Holdings Inc."));
        assert_eq!(parsed.len(), 2);
        assert!(parsed.iter().all(|p| p.jurisdiction.is_none()));
    }

    #[test]
    fn text_dedup_is_case_sensitive() {
        let html = "<p>Acme Corp</p><p>ACME CORP</p>";
        let parsed = extract(html);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn tables_win_over_text_fallback() {
        let html = r#"
            <p>Subsidiaries Of The Registrant</p>
            <table><tr><td>Acme GmbH</td><td>Germany</td></tr></table>
        "#;
        let parsed = extract(html);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].jurisdiction.as_deref(), Some("Germany"));
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(extract("<html><body></body></html>").is_empty());
    }
}
