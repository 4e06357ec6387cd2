use sqlx::SqliteConnection;

pub struct Operation;

#[async_trait::async_trait]
impl schema_ledger::Operation<sqlx::Sqlite> for Operation {
    async fn execute(&self, connection: &mut SqliteConnection) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&mut *connection)
        .await?;

        for i in 0..10 {
            sqlx::query("INSERT INTO entries (content) VALUES (?)")
                .bind(format!("Test {i}"))
                .execute(&mut *connection)
                .await?;
        }

        Ok(())
    }
}

pub struct Reverse;

#[async_trait::async_trait]
impl schema_ledger::Operation<sqlx::Sqlite> for Reverse {
    async fn execute(&self, connection: &mut SqliteConnection) -> anyhow::Result<()> {
        sqlx::query("DROP TABLE entries").execute(connection).await?;

        Ok(())
    }
}
