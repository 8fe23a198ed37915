// Filing Announcements - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod filing;
pub mod normalizer;
pub mod pipeline;
pub mod rate_limiter;
pub mod registry;
pub mod sink;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, RegistryError, RegistryResult};
pub use extractor::{Announcement, AnnouncementExtractor, NameGuess};
pub use fallback::{is_fallback, FallbackGenerator, FALLBACK_MARKER};
pub use filing::{is_well_formed_accession, AnnouncementRecord, Entity, FilingRef};
pub use normalizer::TextNormalizer;
pub use pipeline::{Pipeline, PipelineOutcome, Provenance, RunStats};
pub use rate_limiter::RateLimiter;
pub use registry::{EdgarClient, Endpoints, FetchedDocument, FilingRegistry};
pub use sink::{CsvSink, MemorySink, RecordSink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
