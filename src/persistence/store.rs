//! SQLite-based plan history store

use crate::persistence::{PersistenceBackend, PlanSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

/// SQLite plan store
pub struct SqlitePlanStore {
    pool: SqlitePool,
}

impl SqlitePlanStore {
    /// Create a new SQLite store, creating the database file if needed
    pub async fn new(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))
            .context("Invalid database path")?
            .create_if_missing(true);

        // One long-lived connection keeps `:memory:` databases alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
        let db_dir = data_dir.join("pipeline-plan");
        std::fs::create_dir_all(&db_dir)
            .with_context(|| format!("Failed to create {}", db_dir.display()))?;

        let db_path = db_dir.join("plans.db");
        let db_path = db_path
            .to_str()
            .context("Database path is not valid UTF-8")?;
        Self::new(db_path).await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS plans (
                id TEXT PRIMARY KEY,
                pipeline_name TEXT NOT NULL,
                project TEXT NOT NULL,
                generated_at TEXT NOT NULL,
                stage_count INTEGER NOT NULL DEFAULT 0,
                action_count INTEGER NOT NULL DEFAULT 0,
                approval_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_plans_pipeline_name ON plans(pipeline_name);
            CREATE INDEX IF NOT EXISTS idx_plans_generated_at ON plans(generated_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to initialize plan history schema")?;

        Ok(())
    }

    /// Convert DateTime<Utc> to NaiveDateTime for SQLite
    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    /// Convert NaiveDateTime to DateTime<Utc>
    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn summary_from_row(row: &SqliteRow) -> Result<PlanSummary> {
        Ok(PlanSummary {
            plan_id: Uuid::parse_str(&row.get::<String, _>("id"))?,
            pipeline_name: row.get("pipeline_name"),
            project: row.get("project"),
            generated_at: Self::from_naive(row.get("generated_at")),
            stage_count: row.get::<i64, _>("stage_count") as usize,
            action_count: row.get::<i64, _>("action_count") as usize,
            approval_count: row.get::<i64, _>("approval_count") as usize,
        })
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for SqlitePlanStore {
    async fn save_plan(&self, plan: &PlanSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO plans
            (id, pipeline_name, project, generated_at, stage_count, action_count, approval_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(plan.plan_id.to_string())
        .bind(&plan.pipeline_name)
        .bind(&plan.project)
        .bind(Self::to_naive(plan.generated_at))
        .bind(plan.stage_count as i64)
        .bind(plan.action_count as i64)
        .bind(plan.approval_count as i64)
        .execute(&self.pool)
        .await
        .context("Failed to save plan")?;

        Ok(())
    }

    async fn load_plan(&self, plan_id: Uuid) -> Result<Option<PlanSummary>> {
        let row = sqlx::query(
            r#"
            SELECT id, pipeline_name, project, generated_at, stage_count, action_count, approval_count
            FROM plans
            WHERE id = ?1
            "#,
        )
        .bind(plan_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load plan")?;

        row.as_ref().map(Self::summary_from_row).transpose()
    }

    async fn list_plans(&self, pipeline_name: &str) -> Result<Vec<PlanSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, pipeline_name, project, generated_at, stage_count, action_count, approval_count
            FROM plans
            WHERE pipeline_name = ?1
            ORDER BY generated_at DESC
            "#,
        )
        .bind(pipeline_name)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list plans")?;

        rows.iter().map(Self::summary_from_row).collect()
    }

    async fn list_pipelines(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT pipeline_name
            FROM plans
            ORDER BY pipeline_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pipelines")?;

        Ok(rows.iter().map(|row| row.get("pipeline_name")).collect())
    }
}
