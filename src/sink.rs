// 💾 Record Sinks - Where the finished record list goes
// One write per run; the CSV file is rewritten from scratch every time

use crate::filing::AnnouncementRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Accepts the whole ordered record list once, at the end of a run
pub trait RecordSink {
    fn write_all(&mut self, records: &[AnnouncementRecord]) -> Result<()>;
}

/// Header row of the flat output
pub const CSV_HEADER: [&str; 8] = [
    "ticker",
    "cik",
    "filing_date",
    "accession_number",
    "document_url",
    "matched_keyword",
    "extracted_name",
    "context_snippet",
];

// ============================================================================
// CSV SINK
// ============================================================================

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvSink {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn write_all(&mut self, records: &[AnnouncementRecord]) -> Result<()> {
        // Writer::from_path truncates: no append/merge with earlier runs
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .with_context(|| format!("Failed to create output file: {}", self.path.display()))?;

        // Written explicitly so an empty run still yields a header
        writer
            .write_record(CSV_HEADER)
            .context("Failed to write CSV header")?;

        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("Failed to write record {}", record.accession_number))?;
        }

        writer.flush().context("Failed to flush CSV output")?;

        info!("Saved {} results to {}", records.len(), self.path.display());
        Ok(())
    }
}

// ============================================================================
// MEMORY SINK
// ============================================================================

/// Keeps the last written batch; handy for tests and demos
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<AnnouncementRecord>,
    pub writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn write_all(&mut self, records: &[AnnouncementRecord]) -> Result<()> {
        self.records = records.to_vec();
        self.writes += 1;
        Ok(())
    }
}
