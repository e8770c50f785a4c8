// src/services/faq_store.rs
//! SQLite-backed FAQ store.
//!
//! The schema and seed rows live in `fixtures/` and are compiled into the
//! binary. Queries use the runtime-checked `sqlx::query*` forms, so no
//! `DATABASE_URL` is needed at build time.

use std::str::FromStr;

use serde::Serialize;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info};

use super::answer;

pub const SCHEMA_SQL: &str = include_str!("../../fixtures/faq_schema.sql");
pub const SEED_SQL: &str = include_str!("../../fixtures/faq_seed.sql");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct FaqRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct FaqStore {
    pool: SqlitePool,
}

impl FaqStore {
    /// Open (or create) the database at `url` and apply the schema.
    ///
    /// `url` is a sqlx SQLite URL such as `sqlite://data.db` or `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // One long-lived connection; an in-memory database lives only as long as it does.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_script(SCHEMA_SQL).await?;
        debug!(url, "faq store ready");
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::connect("sqlite::memory:").await
    }

    /// Load the bundled seed rows if the table is empty. Returns rows inserted.
    pub async fn seed_defaults(&self) -> Result<u64, sqlx::Error> {
        if self.count().await? > 0 {
            debug!("faq store already populated, skipping seed");
            return Ok(0);
        }
        let result = sqlx::raw_sql(SEED_SQL).execute(&self.pool).await?;
        info!(rows = result.rows_affected(), "seeded faq store");
        Ok(result.rows_affected())
    }

    /// Execute a multi-statement SQL fixture script.
    pub async fn run_script(&self, sql: &str) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn insert(&self, question: &str, answer: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO questions_and_answers (question, answer) VALUES (?1, ?2)")
            .bind(question)
            .bind(answer)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// All records, ordered by id.
    pub async fn all(&self) -> Result<Vec<FaqRecord>, sqlx::Error> {
        sqlx::query_as::<_, FaqRecord>("SELECT id, question, answer FROM questions_and_answers ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM questions_and_answers")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn best_match(&self, query: &str) -> Result<Option<FaqRecord>, sqlx::Error> {
        let records = self.all().await?;
        Ok(answer::best_match(&records, query).cloned())
    }
}
