// 🏛️ Registry Client - EDGAR directory, filing lists and documents
// Every request goes through the rate limiter; every failure becomes "empty" at this boundary

use crate::config::Config;
use crate::error::{RegistryError, RegistryResult};
use crate::filing::{is_well_formed_accession, Entity, FilingRef};
use crate::rate_limiter::RateLimiter;
use anyhow::{Context as AnyhowContext, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// ============================================================================
// REGISTRY TRAIT
// ============================================================================

/// Raw document body plus the Content-Type the server reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Source of entities, filings and documents
///
/// Directory and filing lookups swallow their failures (logged, empty result).
/// Document fetches report them so the caller can skip the filing.
pub trait FilingRegistry {
    /// Ticker → identifier directory, in registry order
    fn fetch_entity_directory(&mut self) -> Vec<Entity>;

    /// At most `limit` filings of `form_type`, most recent first
    fn fetch_filings(&mut self, entity: &Entity, form_type: &str, limit: usize) -> Vec<FilingRef>;

    fn fetch_document(&mut self, filing: &FilingRef) -> RegistryResult<FetchedDocument>;

    /// Locate the primary document through the filing index page
    fn resolve_document_url(&mut self, _filing: &FilingRef, _form_type: &str) -> Option<String> {
        None
    }
}

// ============================================================================
// ENDPOINTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// company_tickers.json
    pub directory_url: String,

    /// Prefix for CIK##########.json
    pub submissions_base: String,

    /// Prefix for /Archives/edgar/data/...
    pub archives_base: String,

    /// Host used to absolutize relative links on index pages
    pub site_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            directory_url: "https://www.sec.gov/files/company_tickers.json".to_string(),
            submissions_base: "https://data.sec.gov/submissions".to_string(),
            archives_base: "https://www.sec.gov/Archives/edgar/data".to_string(),
            site_base: "https://www.sec.gov".to_string(),
        }
    }
}

impl Endpoints {
    pub fn submissions_url(&self, entity: &Entity) -> String {
        format!("{}/CIK{}.json", self.submissions_base, entity.identifier)
    }

    /// Folder holding every file of one filing
    pub fn filing_folder(&self, entity: &Entity, accession: &str) -> String {
        format!(
            "{}/{}/{}",
            self.archives_base,
            unpadded_cik(&entity.identifier),
            accession.replace('-', "")
        )
    }
}

/// Archive paths use the CIK without leading zeros
fn unpadded_cik(identifier: &str) -> &str {
    let trimmed = identifier.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

// ============================================================================
// RESPONSE PARSING
// ============================================================================

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    cik_str: u64,
    ticker: String,
}

/// company_tickers.json: `{"0": {"cik_str": 320193, "ticker": "AAPL", ...}, ...}`
pub fn parse_directory(body: &[u8]) -> RegistryResult<Vec<Entity>> {
    let raw: HashMap<String, DirectoryEntry> = serde_json::from_slice(body)?;

    let mut keyed: Vec<(u64, String, DirectoryEntry)> = raw
        .into_iter()
        .map(|(key, entry)| (key.parse::<u64>().unwrap_or(u64::MAX), key, entry))
        .collect();
    keyed.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    Ok(keyed
        .into_iter()
        .map(|(_, _, entry)| Entity::from_cik(entry.ticker, entry.cik_str))
        .collect())
}

#[derive(Debug, Deserialize)]
struct Submissions {
    filings: SubmissionFilings,
}

#[derive(Debug, Deserialize)]
struct SubmissionFilings {
    recent: RecentFilings,
}

/// Column-oriented: index i across every vector describes one filing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    form: Vec<String>,
    accession_number: Vec<String>,
    filing_date: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
}

/// CIK##########.json → filings of `form_type`, registry order (newest first)
pub fn parse_submissions(
    body: &[u8],
    entity: &Entity,
    form_type: &str,
    limit: usize,
    endpoints: &Endpoints,
) -> RegistryResult<Vec<FilingRef>> {
    let submissions: Submissions = serde_json::from_slice(body)?;
    let recent = submissions.filings.recent;

    let mut filings = Vec::new();

    for (i, form) in recent.form.iter().enumerate() {
        if filings.len() >= limit {
            break;
        }
        if form != form_type {
            continue;
        }

        let (accession, date) = match (recent.accession_number.get(i), recent.filing_date.get(i)) {
            (Some(accession), Some(date)) => (accession, date),
            _ => {
                warn!("Row {} of {} filings is missing columns, skipping", i, entity.ticker);
                continue;
            }
        };

        if !is_well_formed_accession(accession) {
            warn!("Malformed accession number '{}' for {}, skipping", accession, entity.ticker);
            continue;
        }

        let filing_date = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                warn!("Bad filing date '{}' on {}: {}", date, accession, e);
                continue;
            }
        };

        let folder = endpoints.filing_folder(entity, accession);
        let primary = recent
            .primary_document
            .get(i)
            .map(|d| d.trim())
            .unwrap_or("");

        let document_url = if primary.is_empty() {
            String::new()
        } else {
            format!("{}/{}", folder, primary)
        };

        filings.push(FilingRef {
            entity: entity.clone(),
            filing_date,
            accession_number: accession.clone(),
            document_url,
            index_url: format!("{}/{}-index.htm", folder, accession),
        });
    }

    Ok(filings)
}

/// Find the `form_type` document link in a filing index page
///
/// Looks at the "Document Format Files" table: column 2 is the description,
/// column 3 holds the link.
pub fn parse_index_page(html: &str, form_type: &str, site_base: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse(r#"table[summary="Document Format Files"]"#).ok()?;
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;
    let link_selector = Selector::parse("a").ok()?;

    let form_lower = form_type.to_lowercase();
    let form_phrase = format!("form {}", form_lower);

    let table = document.select(&table_selector).next()?;

    for row in table.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() < 3 {
            continue;
        }

        let description = cells[1].text().collect::<String>().trim().to_lowercase();
        if description != form_lower && !description.contains(&form_phrase) {
            continue;
        }

        let Some(href) = cells[2]
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        return Some(if href.starts_with('/') {
            format!("{}{}", site_base.trim_end_matches('/'), href)
        } else {
            href.to_string()
        });
    }

    None
}

// ============================================================================
// EDGAR CLIENT
// ============================================================================

pub struct EdgarClient {
    http: Client,
    limiter: RateLimiter,
    endpoints: Endpoints,
}

impl EdgarClient {
    /// Blocking client carrying the configured identification headers
    pub fn new(config: &Config) -> Result<Self> {
        EdgarClient::with_endpoints(config, Endpoints::default())
    }

    pub fn with_endpoints(config: &Config, endpoints: Endpoints) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let header_value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            headers.insert(header_name, header_value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(EdgarClient {
            http,
            limiter: RateLimiter::from_secs_f64(config.request_delay_secs),
            endpoints,
        })
    }

    /// Rate-limited GET; non-2xx is a retrieval error
    fn get(&mut self, url: &str) -> RegistryResult<FetchedDocument> {
        self.limiter.wait();
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| RegistryError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Retrieval {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .map_err(|e| RegistryError::transport(url, e))?
            .to_vec();

        Ok(FetchedDocument { bytes, content_type })
    }
}

impl FilingRegistry for EdgarClient {
    fn fetch_entity_directory(&mut self) -> Vec<Entity> {
        let url = self.endpoints.directory_url.clone();
        info!("Fetching company tickers from {}", url);

        let result = self.get(&url).and_then(|doc| parse_directory(&doc.bytes));
        match result {
            Ok(entities) => {
                info!("Loaded {} company tickers", entities.len());
                entities
            }
            Err(e) => {
                error!("Error loading company tickers: {}", e);
                Vec::new()
            }
        }
    }

    fn fetch_filings(&mut self, entity: &Entity, form_type: &str, limit: usize) -> Vec<FilingRef> {
        let url = self.endpoints.submissions_url(entity);
        info!(
            "Fetching recent filings for {} (CIK: {}) from {}",
            entity.ticker, entity.identifier, url
        );

        let endpoints = self.endpoints.clone();
        let result = self
            .get(&url)
            .and_then(|doc| parse_submissions(&doc.bytes, entity, form_type, limit, &endpoints));

        match result {
            Ok(filings) => {
                info!("Found {} {} filings for {}", filings.len(), form_type, entity.ticker);
                filings
            }
            Err(e) => {
                error!("Error fetching filings for {}: {}", entity.ticker, e);
                Vec::new()
            }
        }
    }

    fn fetch_document(&mut self, filing: &FilingRef) -> RegistryResult<FetchedDocument> {
        if !filing.has_document_url() {
            return Err(RegistryError::Parse(format!(
                "filing {} has no document URL",
                filing.accession_number
            )));
        }

        info!("Fetching filing document: {}", filing.document_url);
        let document = self.get(&filing.document_url)?;
        debug!("Received {} bytes for {}", document.bytes.len(), filing.accession_number);

        Ok(document)
    }

    fn resolve_document_url(&mut self, filing: &FilingRef, form_type: &str) -> Option<String> {
        info!("Fetching document URL from index page: {}", filing.index_url);

        let page = match self.get(&filing.index_url) {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to fetch index page: {}", e);
                return None;
            }
        };

        let html = String::from_utf8_lossy(&page.bytes);
        let url = parse_index_page(&html, form_type, &self.endpoints.site_base);
        match &url {
            Some(u) => info!("Found {} document URL: {}", form_type, u),
            None => warn!("Could not find {} document URL in index page", form_type),
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMISSIONS: &str = r#"{
        "cik": "320193",
        "name": "Apple Inc.",
        "filings": {
            "recent": {
                "accessionNumber": [
                    "0000320193-24-000010",
                    "0000320193-24-000006",
                    "0000320193-23-000120",
                    "0000320193-23-000100"
                ],
                "filingDate": ["2024-02-02", "2024-01-10", "2023-11-03", "2023-08-04"],
                "form": ["10-Q", "8-K", "8-K", "8-K"],
                "primaryDocument": ["aapl-20231230.htm", "aapl-20240110.htm", "", "aapl-20230804.htm"]
            },
            "files": []
        }
    }"#;

    fn apple() -> Entity {
        Entity::new("AAPL", "0000320193")
    }

    #[test]
    fn test_parse_directory_orders_by_key() {
        let body = br#"{
            "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"},
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "10": {"cik_str": 1018724, "ticker": "AMZN", "title": "AMAZON COM INC"}
        }"#;

        let entities = parse_directory(body).unwrap();

        assert_eq!(
            entities,
            vec![
                Entity::new("AAPL", "0000320193"),
                Entity::new("MSFT", "0000789019"),
                Entity::new("AMZN", "0001018724"),
            ]
        );
    }

    #[test]
    fn test_parse_directory_rejects_garbage() {
        assert!(matches!(
            parse_directory(b"<html>rate limited</html>"),
            Err(RegistryError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_submissions_filters_form_and_builds_urls() {
        let filings =
            parse_submissions(SUBMISSIONS.as_bytes(), &apple(), "8-K", 10, &Endpoints::default())
                .unwrap();

        assert_eq!(filings.len(), 3);

        let first = &filings[0];
        assert_eq!(first.accession_number, "0000320193-24-000006");
        assert_eq!(first.filing_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(
            first.document_url,
            "https://www.sec.gov/Archives/edgar/data/320193/000032019324000006/aapl-20240110.htm"
        );
        assert_eq!(
            first.index_url,
            "https://www.sec.gov/Archives/edgar/data/320193/000032019324000006/0000320193-24-000006-index.htm"
        );

        // No primary document: left for index-page resolution
        assert!(!filings[1].has_document_url());
    }

    #[test]
    fn test_parse_submissions_respects_limit() {
        let filings =
            parse_submissions(SUBMISSIONS.as_bytes(), &apple(), "8-K", 2, &Endpoints::default())
                .unwrap();
        assert_eq!(filings.len(), 2);
        assert_eq!(filings[0].accession_number, "0000320193-24-000006");
        assert_eq!(filings[1].accession_number, "0000320193-23-000120");

        let none =
            parse_submissions(SUBMISSIONS.as_bytes(), &apple(), "8-K", 0, &Endpoints::default())
                .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_parse_submissions_skips_bad_rows() {
        let body = br#"{"filings": {"recent": {
            "accessionNumber": ["bogus", "0000320193-24-000006", "0000320193-24-000007"],
            "filingDate": ["2024-01-01", "not-a-date", "2024-01-12"],
            "form": ["8-K", "8-K", "8-K"]
        }}}"#;

        let filings = parse_submissions(body, &apple(), "8-K", 10, &Endpoints::default()).unwrap();

        assert_eq!(filings.len(), 1);
        assert_eq!(filings[0].accession_number, "0000320193-24-000007");
        assert!(filings[0].document_url.is_empty());
    }

    #[test]
    fn test_parse_submissions_missing_recent_is_parse_error() {
        let body = br#"{"cik": "320193", "filings": {}}"#;
        assert!(matches!(
            parse_submissions(body, &apple(), "8-K", 5, &Endpoints::default()),
            Err(RegistryError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_index_page_finds_form_document() {
        let html = r#"<html><body>
            <table class="tableFile" summary="Document Format Files">
              <tr><th>Seq</th><th>Description</th><th>Document</th><th>Type</th></tr>
              <tr><td>1</td><td>FORM 8-K</td>
                  <td><a href="/Archives/edgar/data/320193/000032019324000006/aapl-20240110.htm">aapl-20240110.htm</a></td>
                  <td>8-K</td></tr>
              <tr><td>2</td><td>PRESS RELEASE</td><td><a href="/ex99.htm">ex99.htm</a></td><td>EX-99.1</td></tr>
            </table></body></html>"#;

        let url = parse_index_page(html, "8-K", "https://www.sec.gov");

        assert_eq!(
            url.as_deref(),
            Some("https://www.sec.gov/Archives/edgar/data/320193/000032019324000006/aapl-20240110.htm")
        );
    }

    #[test]
    fn test_parse_index_page_without_table() {
        assert_eq!(parse_index_page("<html><p>nothing</p></html>", "8-K", "https://www.sec.gov"), None);
    }

    #[test]
    fn test_parse_index_page_keeps_absolute_links() {
        let html = r#"<table summary="Document Format Files">
            <tr><td>1</td><td>8-K</td><td><a href="https://mirror.example/doc.htm">doc</a></td></tr>
        </table>"#;

        assert_eq!(
            parse_index_page(html, "8-K", "https://www.sec.gov").as_deref(),
            Some("https://mirror.example/doc.htm")
        );
    }

    #[test]
    fn test_unpadded_cik() {
        assert_eq!(unpadded_cik("0000320193"), "320193");
        assert_eq!(unpadded_cik("0000000000"), "0");
    }

    #[test]
    fn test_client_rejects_bad_header() {
        let mut config = Config::default();
        config
            .headers
            .insert("Bad Header".to_string(), "value".to_string());
        assert!(EdgarClient::new(&config).is_err());
    }
}
