// 📄 Filing Model - Entities, filings and the records we persist
// Entity → FilingRef → AnnouncementRecord (one-to-many at each step)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// ENTITY
// ============================================================================

/// A registrant from the registry directory (ticker → CIK)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub ticker: String,

    /// Registry identifier, always 10 digits zero-padded
    pub identifier: String,
}

impl Entity {
    pub fn new(ticker: impl Into<String>, identifier: impl Into<String>) -> Self {
        Entity {
            ticker: ticker.into(),
            identifier: identifier.into(),
        }
    }

    /// Build an entity from the numeric CIK the directory returns
    pub fn from_cik(ticker: impl Into<String>, cik: u64) -> Self {
        Entity::new(ticker, pad_cik(cik))
    }
}

/// Zero-pad a CIK to the 10 digits the submissions endpoint expects
pub fn pad_cik(cik: u64) -> String {
    format!("{:010}", cik)
}

// ============================================================================
// FILING REFERENCE
// ============================================================================

/// One filing of one entity, as listed by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRef {
    pub entity: Entity,
    pub filing_date: NaiveDate,

    /// NNNNNNNNNN-NN-NNNNNN
    pub accession_number: String,

    /// Primary document URL (empty when the registry did not name one)
    pub document_url: String,

    /// Filing index page, used to locate the document when `document_url` is empty
    pub index_url: String,
}

impl FilingRef {
    pub fn has_document_url(&self) -> bool {
        !self.document_url.is_empty()
    }

    /// Same filing, pointing at a resolved document
    pub fn with_document_url(mut self, url: String) -> Self {
        self.document_url = url;
        self
    }
}

/// Check the 10-2-6 digit accession pattern
pub fn is_well_formed_accession(accession: &str) -> bool {
    let parts: Vec<&str> = accession.split('-').collect();
    if parts.len() != 3 {
        return false;
    }

    parts
        .iter()
        .zip([10usize, 2, 6])
        .all(|(part, len)| part.len() == len && part.chars().all(|c| c.is_ascii_digit()))
}

// ============================================================================
// ANNOUNCEMENT RECORD (the persisted unit)
// ============================================================================

/// One keyword match inside one filing
///
/// Serialized column names are the flat sink header. No wall-clock fields:
/// two runs over identical responses produce identical rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    pub ticker: String,

    #[serde(rename = "cik")]
    pub identifier: String,

    pub filing_date: NaiveDate,
    pub accession_number: String,
    pub document_url: String,
    pub matched_keyword: String,

    /// Empty when the name heuristic found nothing
    pub extracted_name: String,

    pub context_snippet: String,
}

impl AnnouncementRecord {
    /// Attach extracted fields to the filing they came from
    pub fn from_filing(
        filing: &FilingRef,
        matched_keyword: String,
        extracted_name: String,
        context_snippet: String,
    ) -> Self {
        AnnouncementRecord {
            ticker: filing.entity.ticker.clone(),
            identifier: filing.entity.identifier.clone(),
            filing_date: filing.filing_date,
            accession_number: filing.accession_number.clone(),
            document_url: filing.document_url.clone(),
            matched_keyword,
            extracted_name,
            context_snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_cik() {
        assert_eq!(pad_cik(320193), "0000320193");
        assert_eq!(Entity::from_cik("AAPL", 320193).identifier, "0000320193");
    }

    #[test]
    fn test_accession_pattern() {
        assert!(is_well_formed_accession("0000320193-24-000006"));
        assert!(!is_well_formed_accession("000032019324000006"));
        assert!(!is_well_formed_accession("0000320193-24-00006"));
        assert!(!is_well_formed_accession("000032019A-24-000006"));
        assert!(!is_well_formed_accession(""));
    }

    #[test]
    fn test_record_traces_to_filing() {
        let filing = FilingRef {
            entity: Entity::new("AAPL", "0000320193"),
            filing_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            accession_number: "0000320193-24-000006".to_string(),
            document_url: "https://www.sec.gov/Archives/edgar/data/0000320193/000032019324000006/a8-k.htm".to_string(),
            index_url: String::new(),
        };

        let record = AnnouncementRecord::from_filing(
            &filing,
            "product".to_string(),
            "Vision Pro".to_string(),
            "the new Vision Pro product line".to_string(),
        );

        assert_eq!(record.ticker, "AAPL");
        assert_eq!(record.identifier, "0000320193");
        assert_eq!(record.accession_number, filing.accession_number);
        assert_eq!(record.document_url, filing.document_url);
    }
}
