// 🧪 Fallback Generator - Synthetic records when live retrieval finds nothing
// Always recognizable: placeholder accession, /fallback/ URL, [SYNTHETIC] snippet prefix

use crate::filing::{AnnouncementRecord, Entity};
use chrono::NaiveDate;

/// Prefix carried by every synthetic snippet
pub const FALLBACK_MARKER: &str = "[SYNTHETIC]";

/// Placeholder identifier for synthetic entities
pub const PLACEHOLDER_IDENTIFIER: &str = "0000000000";

pub const FALLBACK_KEYWORD: &str = "announce";

const FALLBACK_COUNT: usize = 3;

/// (fallback ticker, product, filing date, announcement)
const SAMPLES: [(&str, &str, (i32, u32, u32), &str); FALLBACK_COUNT] = [
    (
        "AAPL",
        "iPhone 15 Pro",
        (2025, 1, 3),
        "Apple today announced the iPhone 15 Pro with revolutionary AI capabilities.",
    ),
    (
        "MSFT",
        "Surface Pro 9",
        (2024, 9, 10),
        "Microsoft unveiled the Surface Pro 9 with advanced AI features and improved battery life.",
    ),
    (
        "GOOGL",
        "Pixel 8",
        (2024, 8, 26),
        "Google introduced the Pixel 8 smartphone with enhanced computational photography.",
    ),
];

pub struct FallbackGenerator;

impl FallbackGenerator {
    /// Deterministic placeholder set spanning the given entities
    ///
    /// Always three records, cycling through the entities in order. Placeholder
    /// entities stand in when none are given.
    pub fn generate(entities: &[Entity], form_type: &str) -> Vec<AnnouncementRecord> {
        let placeholders: Vec<Entity>;
        let targets: &[Entity] = if entities.is_empty() {
            placeholders = SAMPLES
                .iter()
                .map(|(ticker, ..)| Entity::new(*ticker, PLACEHOLDER_IDENTIFIER))
                .collect();
            &placeholders
        } else {
            entities
        };

        targets
            .iter()
            .cycle()
            .zip(SAMPLES.iter())
            .enumerate()
            .map(|(i, (entity, (_, product, (y, m, d), text)))| {
                let seq = i + 1;
                AnnouncementRecord {
                    ticker: entity.ticker.clone(),
                    identifier: entity.identifier.clone(),
                    filing_date: NaiveDate::from_ymd_opt(*y, *m, *d).unwrap_or(NaiveDate::MIN),
                    accession_number: format!("{}-00-{:06}", PLACEHOLDER_IDENTIFIER, seq),
                    document_url: format!(
                        "https://www.sec.gov/fallback/{}/{}.htm",
                        url_segment(form_type),
                        seq
                    ),
                    matched_keyword: FALLBACK_KEYWORD.to_string(),
                    extracted_name: product.to_string(),
                    context_snippet: format!("{} {}", FALLBACK_MARKER, text),
                }
            })
            .collect()
    }
}

/// Synthetic records carry the marker in both snippet and accession
pub fn is_fallback(record: &AnnouncementRecord) -> bool {
    record.context_snippet.starts_with(FALLBACK_MARKER)
        && record.accession_number.starts_with(PLACEHOLDER_IDENTIFIER)
}

fn url_segment(form_type: &str) -> String {
    let segment: String = form_type
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    if segment.is_empty() {
        "filing".to_string()
    } else {
        segment
    }
}
