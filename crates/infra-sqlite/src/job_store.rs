// SQLite JobStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use nichenest_core::domain::{Job, JobId, Niche};
use nichenest_core::error::{AppError, Result};
use nichenest_core::port::{JobStore, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

pub struct SqliteJobStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Insert a job (used by the posting flow and by tests)
    pub async fn insert(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, title, company_name, location, salary,
                job_niche, notified, created_at, notified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(&job.company_name)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(job.niche.as_str())
        .bind(if job.notified { 1 } else { 0 })
        .bind(job.created_at)
        .bind(job.notified_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    /// Find job by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(JobRow::into_job))
    }

    /// Correct a job's niche (posting-flow edit)
    pub async fn update_niche(&self, id: &str, niche: &str) -> Result<()> {
        let result = sqlx::query("UPDATE jobs SET job_niche = ? WHERE id = ?")
            .bind(niche)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn find_unnotified(&self) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT * FROM jobs
            WHERE notified = 0
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(count = rows.len(), "Fetched unnotified jobs");
        Ok(rows.into_iter().map(JobRow::into_job).collect())
    }

    async fn mark_notified(&self, id: &JobId) -> Result<()> {
        let now = self.time_provider.now_millis();

        // Conditional update keeps the false -> true transition single-shot
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET notified = 1, notified_at = ?
            WHERE id = ? AND notified = 0
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT notified FROM jobs WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            return match exists {
                None => Err(AppError::NotFound(format!("Job {} not found", id))),
                Some(_) => Err(AppError::Conflict(format!("Job {} already notified", id))),
            };
        }
        Ok(())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    title: String,
    company_name: String,
    location: String,
    salary: String,
    job_niche: String,
    notified: i64, // SQLite boolean as integer
    created_at: i64,
    notified_at: Option<i64>,
}

impl JobRow {
    fn into_job(self) -> Job {
        Job {
            id: self.id,
            title: self.title,
            company_name: self.company_name,
            location: self.location,
            salary: self.salary,
            niche: Niche::new(self.job_niche),
            notified: self.notified != 0,
            created_at: self.created_at,
            notified_at: self.notified_at,
        }
    }
}
