use sqlx::SqliteConnection;

/// Settings table shared by every deployment, safe to create repeatedly.
pub struct EnsureSettingsTable;

#[async_trait::async_trait]
impl schema_ledger::Operation<sqlx::Sqlite> for EnsureSettingsTable {
    async fn execute(&self, connection: &mut SqliteConnection) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(connection)
        .await?;

        Ok(())
    }
}
