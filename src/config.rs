// ⚙️ Run Configuration - Explicit settings passed into the pipeline
// Defaults mirror the registry's fair-access policy (declared User-Agent, ≤10 req/s)

use crate::error::ConfigError;
use anyhow::{Context as AnyhowContext, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const USER_AGENT_HEADER: &str = "User-Agent";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Headers sent with every registry request (User-Agent is mandatory)
    pub headers: BTreeMap<String, String>,

    /// Minimum seconds between two requests
    pub request_delay_secs: f64,

    pub max_filings_per_company: usize,
    pub max_companies: usize,

    /// Announcement keywords, matched case-insensitively, reported with this casing
    pub keywords: Vec<String>,

    /// Form type to keep from each entity's filing list
    pub form_type: String,

    /// Watchlist of tickers, in processing order. Empty = directory order.
    pub tickers: Vec<String>,

    /// Characters of context taken on each side of a match
    pub window_chars: usize,

    /// Hard bound on snippet length
    pub max_snippet_chars: usize,

    pub output_path: PathBuf,

    /// Per-request transport timeout
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            USER_AGENT_HEADER.to_string(),
            "Sample Company Name AdminContact@example.com".to_string(),
        );
        headers.insert("Accept-Encoding".to_string(), "gzip, deflate".to_string());

        Config {
            headers,
            request_delay_secs: 0.2,
            max_filings_per_company: 5,
            max_companies: 5,
            keywords: [
                "new product",
                "launch",
                "announce",
                "introduce",
                "unveil",
                "release",
                "innovation",
                "technology",
                "product",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            form_type: "8-K".to_string(),
            tickers: ["AAPL", "MSFT", "GOOGL", "AMZN", "META"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            window_chars: 150,
            max_snippet_chars: 300,
            output_path: PathBuf::from("sec_8k_product_filings.csv"),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let user_agent = self
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(USER_AGENT_HEADER))
            .map(|(_, value)| value.trim())
            .unwrap_or("");
        if user_agent.is_empty() {
            return Err(ConfigError::MissingSetting("headers.User-Agent"));
        }

        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::MissingSetting("keywords"));
        }

        if self.form_type.trim().is_empty() {
            return Err(ConfigError::MissingSetting("form_type"));
        }

        // Must also fit a Duration, or the limiter cannot be built
        if Duration::try_from_secs_f64(self.request_delay_secs).is_err() {
            return Err(ConfigError::Invalid {
                name: "request_delay_secs",
                reason: format!(
                    "must be a non-negative number of seconds, got {}",
                    self.request_delay_secs
                ),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        for (name, value) in [
            ("max_filings_per_company", self.max_filings_per_company),
            ("max_companies", self.max_companies),
            ("max_snippet_chars", self.max_snippet_chars),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    name,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }
}
