use sqlx::SqliteConnection;

pub struct Operation;

#[async_trait::async_trait]
impl schema_ledger::Operation<sqlx::Sqlite> for Operation {
    async fn execute(&self, connection: &mut SqliteConnection) -> anyhow::Result<()> {
        sqlx::query("ALTER TABLE entries ADD COLUMN published BOOLEAN")
            .execute(connection)
            .await?;

        Ok(())
    }
}
