use anyhow::Result;
use sqlx::sqlite::SqlitePool;

use crate::models::StoredEmail;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // The store is read and written in one sequential pass per invocation.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        let schema = include_str!("../schema.sql");
        sqlx::query(schema).execute(&self.pool).await?;
        Ok(())
    }

    /// Re-ingesting a message replaces the whole row.
    pub async fn upsert_email(&self, email: &StoredEmail) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO emails (id, from_address, subject, date, snippet)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&email.id)
        .bind(&email.from_address)
        .bind(&email.subject)
        .bind(&email.date)
        .bind(&email.snippet)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_emails(&self) -> Result<Vec<StoredEmail>> {
        let emails = sqlx::query_as::<_, StoredEmail>(
            "SELECT id, from_address, subject, date, snippet FROM emails",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(emails)
    }
}
