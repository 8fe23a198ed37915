use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filing_announcements::{Config, CsvSink, EdgarClient, Pipeline, PipelineOutcome, Provenance};

// Usage: filing-announcements [config.json] [output.csv]
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filing_announcements=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut config = match args.get(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(output) = args.get(2) {
        config.output_path = PathBuf::from(output);
    }

    // Fail before any network activity
    config.validate().context("Invalid configuration")?;

    info!(
        "Initializing SEC filing extractor v{} ({} filings, up to {} companies)",
        filing_announcements::VERSION,
        config.form_type,
        config.max_companies
    );

    let client = EdgarClient::new(&config)?;
    let mut sink = CsvSink::new(&config.output_path);
    let mut pipeline = Pipeline::new(config, client);

    let outcome = pipeline.run_into(&mut sink)?;
    print_summary(&outcome);

    if outcome.provenance == Provenance::Fallback {
        warn!(
            "Created fallback data with {} examples at {}",
            outcome.records.len(),
            sink.path().display()
        );
        warn!("NOTE: This is simulated data for demonstration purposes only.");
    }

    Ok(())
}

fn print_summary(outcome: &PipelineOutcome) {
    println!(
        "\n{:<8} {:<12} {:<30} {}",
        "Company", "Filing Date", "Product Name", "Product Context"
    );
    println!("{}", "━".repeat(100));

    for record in &outcome.records {
        let context: String = record.context_snippet.chars().take(60).collect();
        println!(
            "{:<8} {:<12} {:<30} {}",
            record.ticker,
            record.filing_date.format("%Y-%m-%d").to_string(),
            record.extracted_name,
            context
        );
    }

    println!(
        "\n{} records ({:?}) · {} companies · {} filings · {} skipped",
        outcome.records.len(),
        outcome.provenance,
        outcome.stats.entities_processed,
        outcome.stats.filings_seen,
        outcome.stats.filings_skipped
    );
}
