#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use schema_ledger::Operation;
use sqlx::{Connection, Sqlite, SqliteConnection};

pub async fn connect() -> anyhow::Result<SqliteConnection> {
    Ok(SqliteConnection::connect("sqlite::memory:").await?)
}

pub async fn table_exists(conn: &mut SqliteConnection, name: &str) -> anyhow::Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}

pub async fn count_rows(conn: &mut SqliteConnection, table: &str) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT count(*) FROM {table}"))
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Runs one SQL statement and counts how often it was invoked.
pub struct Exec {
    sql: &'static str,
    calls: Arc<AtomicUsize>,
}

impl Exec {
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            calls: Arc::default(),
        }
    }

    pub fn counted(sql: &'static str, calls: &Arc<AtomicUsize>) -> Self {
        Self {
            sql,
            calls: calls.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Operation<Sqlite> for Exec {
    async fn execute(&self, connection: &mut SqliteConnection) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sqlx::query(self.sql).execute(connection).await?;

        Ok(())
    }
}

/// Always fails without touching the store.
pub struct Fail;

#[async_trait::async_trait]
impl Operation<Sqlite> for Fail {
    async fn execute(&self, _connection: &mut SqliteConnection) -> anyhow::Result<()> {
        anyhow::bail!("boom")
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
