use sqlx::{
    Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::env;

use crate::error::ElectionError;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new() -> Result<Self, ElectionError> {
        // Get database URL from environment or use a default
        let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:ballot_box.db".to_string());

        // Create database if it doesn't exist
        if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            Sqlite::create_database(&db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Private in-memory database, one connection so all callers share it.
    pub async fn in_memory() -> Result<Self, ElectionError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    // Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // Initialize the schema. The UNIQUE/PRIMARY KEY constraints carry the
    // ledger invariants: one candidate per (party, position), one registration
    // per voter, one ballot per (voter, position).
    async fn init_schema(pool: &SqlitePool) -> Result<(), ElectionError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                idx INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                party TEXT NOT NULL,
                position TEXT NOT NULL,
                vote_count INTEGER NOT NULL DEFAULT 0,
                UNIQUE (party, position)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS voters (
                voter_id INTEGER PRIMARY KEY,
                registered_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ballots (
                voter_id INTEGER NOT NULL,
                position TEXT NOT NULL,
                receipt TEXT NOT NULL,
                cast_at TEXT NOT NULL,
                PRIMARY KEY (voter_id, position)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
