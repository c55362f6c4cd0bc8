use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Analysis, AnalysisResult, Repository, StoredAnalysis};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Column values for a new `analysis_results` row.
#[derive(Debug, Clone)]
pub struct NewAnalysisRow {
    pub id: Uuid,
    pub repo_owner: String,
    pub repo_name: String,
    pub repo_url: String,
    pub suspicion_score: i32,
    pub total_stars: i32,
    pub analyzed_sample: i32,
    pub analysis_type: &'static str,
    pub suspicion_indicators: Vec<String>,
    pub repository: Repository,
    pub analysis: Analysis,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewAnalysisRow {
    pub fn from_result(
        result: &AnalysisResult,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> anyhow::Result<Self> {
        let full_name = result.repository.full_name.as_str();
        let (owner, name) = full_name
            .split_once('/')
            .with_context(|| format!("repository name {full_name:?} is not owner/name"))?;

        Ok(Self {
            id: result.id.unwrap_or_else(Uuid::new_v4),
            repo_owner: owner.to_string(),
            repo_name: name.to_string(),
            repo_url: format!("https://github.com/{full_name}"),
            suspicion_score: result.analysis.suspicion_score.min(100) as i32,
            total_stars: i32::try_from(result.analysis.total_stars)
                .context("total stars out of range")?,
            analyzed_sample: i32::try_from(result.analysis.analyzed_sample)
                .context("analyzed sample out of range")?,
            analysis_type: result.metadata.analysis_type.as_str(),
            suspicion_indicators: result.analysis.suspicion_indicators.clone(),
            repository: result.repository.clone(),
            analysis: result.analysis.clone(),
            created_at: now,
            expires_at: now + ttl,
        })
    }
}

pub async fn save_analysis(pool: &PgPool, row: &NewAnalysisRow) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO analysis_results
        (id, repo_owner, repo_name, repo_url, suspicion_score, total_stars,
         analyzed_sample, analysis_type, suspicion_indicators, repository_data,
         analysis_data, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id
        "#,
    )
    .bind(row.id)
    .bind(&row.repo_owner)
    .bind(&row.repo_name)
    .bind(&row.repo_url)
    .bind(row.suspicion_score)
    .bind(row.total_stars)
    .bind(row.analyzed_sample)
    .bind(row.analysis_type)
    .bind(&row.suspicion_indicators)
    .bind(Json(&row.repository))
    .bind(Json(&row.analysis))
    .bind(row.created_at)
    .bind(row.expires_at)
    .fetch_one(pool)
    .await?
    .get("id");

    info!(%id, repo = %row.repo_url, expires_at = %row.expires_at, "stored analysis");
    Ok(id)
}

/// Loads a stored analysis. Expired and missing ids both yield `None`.
pub async fn fetch_analysis(
    pool: &PgPool,
    id: Uuid,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<StoredAnalysis>> {
    let row = sqlx::query(
        r#"
        SELECT id, repository_data, analysis_data, created_at, expires_at
        FROM analysis_results
        WHERE id = $1 AND expires_at > $2
        "#,
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        debug!(%id, "no live analysis");
        return Ok(None);
    };

    let Json(repository): Json<Repository> = row
        .try_get("repository_data")
        .context("stored repository data is malformed")?;
    let Json(analysis): Json<Analysis> = row
        .try_get("analysis_data")
        .context("stored analysis data is malformed")?;

    Ok(Some(StoredAnalysis {
        id: row.get("id"),
        repository,
        analysis,
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }))
}

pub async fn purge_expired(pool: &PgPool, now: DateTime<Utc>) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM analysis_results WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;

    info!(removed = result.rows_affected(), "purged expired analyses");
    Ok(result.rows_affected())
}
