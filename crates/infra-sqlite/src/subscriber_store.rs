// SQLite SubscriberStore Implementation
// Subscribers are users with the job-seeker role; employers carry no niches

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use nichenest_core::domain::{Niche, Subscriber};
use nichenest_core::error::Result;
use nichenest_core::port::SubscriberStore;
use sqlx::SqlitePool;

pub const ROLE_JOB_SEEKER: &str = "Job Seeker";
pub const ROLE_EMPLOYER: &str = "Employer";

pub struct SqliteSubscriberStore {
    pool: SqlitePool,
}

impl SqliteSubscriberStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a job seeker (used by the profile flow and by tests)
    pub async fn insert(&self, subscriber: &Subscriber, created_at: i64) -> Result<()> {
        let slot = |i: usize| subscriber.niches.get(i).map(Niche::as_str);

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, role,
                first_niche, second_niche, third_niche, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscriber.id)
        .bind(&subscriber.name)
        .bind(&subscriber.email)
        .bind(ROLE_JOB_SEEKER)
        .bind(slot(0))
        .bind(slot(1))
        .bind(slot(2))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for SqliteSubscriberStore {
    async fn find_all(&self) -> Result<Vec<Subscriber>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, first_niche, second_niche, third_niche
            FROM users
            WHERE role = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(ROLE_JOB_SEEKER)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRow::into_subscriber).collect())
    }

    /// Uses the per-slot indexes; `=` on TEXT is case-sensitive (BINARY collation)
    async fn find_by_niche(&self, niche: &Niche) -> Result<Vec<Subscriber>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, first_niche, second_niche, third_niche
            FROM users
            WHERE role = ?
              AND (first_niche = ? OR second_niche = ? OR third_niche = ?)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(ROLE_JOB_SEEKER)
        .bind(niche.as_str())
        .bind(niche.as_str())
        .bind(niche.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRow::into_subscriber).collect())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    first_niche: Option<String>,
    second_niche: Option<String>,
    third_niche: Option<String>,
}

impl UserRow {
    fn into_subscriber(self) -> Subscriber {
        let niches: Vec<String> = [self.first_niche, self.second_niche, self.third_niche]
            .into_iter()
            .flatten()
            .collect();
        Subscriber::new(self.id, self.name, self.email, niches)
    }
}
