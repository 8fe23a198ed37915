// 🔄 Pipeline - Directory → filings → documents → records → sink
// Linear run. Single failures are skipped; only an empty result triggers fallback.

use crate::config::Config;
use crate::extractor::AnnouncementExtractor;
use crate::fallback::{FallbackGenerator, PLACEHOLDER_IDENTIFIER};
use crate::filing::{AnnouncementRecord, Entity, FilingRef};
use crate::normalizer::TextNormalizer;
use crate::registry::FilingRegistry;
use crate::sink::RecordSink;
use anyhow::Result;
use tracing::{info, warn};

// ============================================================================
// RUN OUTCOME
// ============================================================================

/// Where the final records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub entities_processed: usize,
    pub filings_seen: usize,
    pub filings_skipped: usize,
    pub records_extracted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub records: Vec<AnnouncementRecord>,
    pub provenance: Provenance,
    pub stats: RunStats,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline<R: FilingRegistry> {
    config: Config,
    registry: R,
    normalizer: TextNormalizer,
    extractor: AnnouncementExtractor,
}

impl<R: FilingRegistry> Pipeline<R> {
    pub fn new(config: Config, registry: R) -> Self {
        let extractor = AnnouncementExtractor::new(config.window_chars, config.max_snippet_chars);
        Pipeline {
            config,
            registry,
            normalizer: TextNormalizer::new(),
            extractor,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Run and hand the final records to `sink` in one write
    pub fn run_into<S: RecordSink>(&mut self, sink: &mut S) -> Result<PipelineOutcome> {
        let outcome = self.run();
        sink.write_all(&outcome.records)?;
        Ok(outcome)
    }

    /// Full pass over the selected entities. Never fails.
    pub fn run(&mut self) -> PipelineOutcome {
        let mut stats = RunStats::default();

        let directory = self.registry.fetch_entity_directory();
        if directory.is_empty() {
            warn!("Failed to get company tickers");
            let (records, provenance) =
                Self::finalize(Vec::new(), &self.configured_placeholders(), &self.config.form_type);
            return PipelineOutcome {
                records,
                provenance,
                stats,
            };
        }

        let entities = self.select_entities(&directory);
        let mut records = Vec::new();

        for entity in &entities {
            info!("Processing company {} (CIK: {})", entity.ticker, entity.identifier);
            stats.entities_processed += 1;

            let filings = self.registry.fetch_filings(
                entity,
                &self.config.form_type,
                self.config.max_filings_per_company,
            );

            if filings.is_empty() {
                warn!("No recent filings found for {}", entity.ticker);
                continue;
            }

            for filing in filings {
                stats.filings_seen += 1;
                match self.process_filing(filing) {
                    Some(found) => {
                        stats.records_extracted += found.len();
                        records.extend(found);
                    }
                    None => stats.filings_skipped += 1,
                }
            }
        }

        info!(
            "Extracted {} product-related records from {} filings ({} skipped)",
            stats.records_extracted, stats.filings_seen, stats.filings_skipped
        );

        let (records, provenance) = Self::finalize(records, &entities, &self.config.form_type);
        PipelineOutcome {
            records,
            provenance,
            stats,
        }
    }

    /// Terminal decision: live records pass through, an empty set becomes fallback data
    pub fn finalize(
        records: Vec<AnnouncementRecord>,
        entities: &[Entity],
        form_type: &str,
    ) -> (Vec<AnnouncementRecord>, Provenance) {
        if !records.is_empty() {
            return (records, Provenance::Live);
        }

        let fallback = FallbackGenerator::generate(entities, form_type);
        warn!(
            "No product-related filings found; created {} fallback records (simulated data)",
            fallback.len()
        );
        (fallback, Provenance::Fallback)
    }

    /// Watchlist tickers in watchlist order, or directory order without one
    fn select_entities(&self, directory: &[Entity]) -> Vec<Entity> {
        let limit = self.config.max_companies;

        if self.config.tickers.is_empty() {
            return directory.iter().take(limit).cloned().collect();
        }

        let mut selected = Vec::new();
        for ticker in &self.config.tickers {
            if selected.len() >= limit {
                info!("Reached maximum number of companies ({})", limit);
                break;
            }

            match directory.iter().find(|e| e.ticker.eq_ignore_ascii_case(ticker)) {
                Some(entity) => selected.push(entity.clone()),
                None => warn!("Ticker {} not found in SEC database", ticker),
            }
        }

        selected
    }

    /// Watchlist entities without registry identifiers (directory unavailable)
    fn configured_placeholders(&self) -> Vec<Entity> {
        self.config
            .tickers
            .iter()
            .take(self.config.max_companies)
            .map(|t| Entity::new(t.to_uppercase(), PLACEHOLDER_IDENTIFIER))
            .collect()
    }

    /// Records for one filing, or None when the filing had to be skipped
    fn process_filing(&mut self, filing: FilingRef) -> Option<Vec<AnnouncementRecord>> {
        let filing = if filing.has_document_url() {
            filing
        } else {
            match self
                .registry
                .resolve_document_url(&filing, &self.config.form_type)
            {
                Some(url) => filing.with_document_url(url),
                None => {
                    warn!(
                        "Could not get document URL for filing {}",
                        filing.accession_number
                    );
                    return None;
                }
            }
        };

        let document = match self.registry.fetch_document(&filing) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping filing {}: {}", filing.accession_number, e);
                return None;
            }
        };

        let text = self
            .normalizer
            .normalize(&document.bytes, document.content_type.as_deref());
        if text.is_empty() {
            warn!("Could not get text for filing {}", filing.accession_number);
            return None;
        }
        info!("Extracted {} characters from filing document", text.chars().count());

        let found = self.extractor.extract(&text, &self.config.keywords);
        if found.is_empty() {
            info!(
                "No product information found in filing {}",
                filing.accession_number
            );
        }

        Some(
            found
                .into_iter()
                .map(|a| {
                    info!(
                        "Added product filing for {}: '{}' ({})",
                        filing.entity.ticker,
                        a.extracted_name.as_str(),
                        a.matched_keyword
                    );
                    AnnouncementRecord::from_filing(
                        &filing,
                        a.matched_keyword,
                        a.extracted_name.as_str().to_string(),
                        a.context_snippet,
                    )
                })
                .collect(),
        )
    }
}
