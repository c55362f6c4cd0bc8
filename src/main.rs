use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod clustering;
mod db;
mod errors;
mod metrics;
mod models;
mod report;
mod risk;

use crate::errors::AnalysisError;
use crate::models::{AnalysisResult, CreationDateHistogram};

#[derive(Parser)]
#[command(name = "starbuster")]
#[command(about = "Stargazer suspicion signals and shareable analysis records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Store an analysis payload and print its share link
    Store {
        #[arg(long)]
        json: PathBuf,
        #[arg(long, default_value_t = 30)]
        ttl_days: i64,
        #[arg(long, env = "STARBUSTER_BASE_URL", default_value = report::DEFAULT_BASE_URL)]
        base_url: String,
    },
    /// Show a stored, non-expired analysis
    Show {
        #[arg(long)]
        id: Uuid,
        #[arg(long, env = "STARBUSTER_BASE_URL", default_value = report::DEFAULT_BASE_URL)]
        base_url: String,
        /// Print the share card and risk band as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cluster account-creation dates from a histogram file
    #[command(group(
        ArgGroup::new("source")
            .args(["csv", "json"])
            .required(true)
            .multiple(false)
    ))]
    Cluster {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Generate a markdown report
    #[command(group(
        ArgGroup::new("source")
            .args(["json", "id"])
            .required(true)
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Delete analyses past their expiry
    PurgeExpired,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Reads an analysis payload, turning a service error body into an `AnalysisError`.
fn load_result(path: &Path) -> anyhow::Result<AnalysisResult> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        let status = value
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok());
        let err = AnalysisError::from_response(status, message);
        warn!(
            category = err.category().as_str(),
            detail = err.detail(),
            "analysis failed upstream"
        );
        return Err(err.into());
    }

    serde_json::from_value(value)
        .with_context(|| format!("{} is not an analysis payload", path.display()))
}

fn load_histogram(
    csv: Option<&Path>,
    json: Option<&Path>,
) -> anyhow::Result<CreationDateHistogram> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        date: String,
        count: u64,
    }

    if let Some(path) = csv {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut histogram = CreationDateHistogram::new();
        for result in reader.deserialize::<CsvRow>() {
            let row = result?;
            *histogram.entry(row.date).or_insert(0) += row.count;
        }
        return Ok(histogram);
    }

    let path = json.context("a histogram file is required")?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)?;

    // Accept either a bare histogram or a full analysis payload.
    let histogram = match value.pointer("/analysis/patterns/suspiciousCreationDates") {
        Some(nested) => serde_json::from_value(nested.clone())?,
        None => serde_json::from_value(value)?,
    };
    Ok(histogram)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Store {
            json,
            ttl_days,
            base_url,
        } => {
            let result = load_result(&json)?;
            let now = Utc::now();
            let ttl = Duration::days(ttl_days.max(1));
            let row = db::NewAnalysisRow::from_result(&result, now, ttl)?;
            let pool = connect().await?;
            let id = db::save_analysis(&pool, &row).await?;
            let card = report::share_card(id, &result.repository, &result.analysis, &base_url);

            println!("Stored {} as {id}.", result.repository.full_name);
            println!("Share: {}", card.url);
            println!("Expires: {}", row.expires_at.format("%Y-%m-%d %H:%M UTC"));
        }
        Commands::Show { id, base_url, json } => {
            let pool = connect().await?;
            let Some(stored) = db::fetch_analysis(&pool, id, Utc::now()).await? else {
                println!("Analysis not found.");
                return Ok(());
            };

            let card =
                report::share_card(stored.id, &stored.repository, &stored.analysis, &base_url);
            let band = risk::three_band_policy(stored.analysis.suspicion_score);
            if json {
                let payload = serde_json::json!({
                    "id": stored.id,
                    "shareCard": card,
                    "riskBand": band,
                    "display": band.display(),
                    "expiresAt": stored.expires_at,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            println!("{}", card.title);
            println!("{}", card.description);
            println!(
                "{} {} suspicion ({} analysis)",
                band.display().emoji,
                band.as_str(),
                card.analysis_label
            );
            println!(
                "- {} stars, {} analyzed",
                metrics::format_count(stored.repository.stars),
                stored.analysis.analyzed_sample
            );
            for indicator in &stored.analysis.suspicion_indicators {
                println!("- {indicator}");
            }
            println!(
                "Stored {} (expires {})",
                stored.created_at.format("%Y-%m-%d"),
                stored.expires_at.format("%Y-%m-%d")
            );
            println!("Share: {}", card.url);
        }
        Commands::Cluster { csv, json } => {
            let histogram = load_histogram(csv.as_deref(), json.as_deref())?;
            debug!(days = histogram.len(), "loaded creation-date histogram");
            let clusters = clustering::analyze_creation_dates(&histogram);
            println!("{}", serde_json::to_string_pretty(&clusters)?);
        }
        Commands::Report { json, id, out } => {
            let now = Utc::now();
            let result = match (json, id) {
                (Some(path), _) => load_result(&path)?,
                (None, Some(id)) => {
                    let pool = connect().await?;
                    let stored = db::fetch_analysis(&pool, id, now)
                        .await?
                        .ok_or_else(|| {
                            AnalysisError::new(errors::ErrorCategory::NotFound, id.to_string())
                        })?;
                    stored_to_result(stored)
                }
                (None, None) => anyhow::bail!("either --json or --id is required"),
            };

            let report = report::build_report(&result, now);
            std::fs::write(&out, report)?;
            info!(repo = %result.repository.full_name, "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::PurgeExpired => {
            let pool = connect().await?;
            let removed = db::purge_expired(&pool, Utc::now()).await?;
            println!("Removed {removed} expired analyses.");
        }
    }

    Ok(())
}

/// Rebuilds a renderable payload from a stored record.
fn stored_to_result(stored: models::StoredAnalysis) -> AnalysisResult {
    let analysis_type = if stored.analysis.patterns.advanced().is_some() {
        models::AnalysisType::Advanced
    } else {
        models::AnalysisType::Basic
    };

    AnalysisResult {
        id: Some(stored.id),
        metadata: models::Metadata {
            analyzed_at: stored.created_at,
            analysis_type,
            sample_size: stored.analysis.analyzed_sample,
            detailed_sample: stored.analysis.detailed_sample.unwrap_or(0),
            processing_time: 0,
        },
        repository: stored.repository,
        analysis: stored.analysis,
        share_url: None,
    }
}
