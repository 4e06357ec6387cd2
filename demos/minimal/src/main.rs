use schema_ledger::{Config, SqliteMigrator};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::EnvFilter;

mod migrations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let migrator = SqliteMigrator::with_config(
        migrations::registry()?,
        Config::default().table("__example_migrations_meta"),
    );

    let mut conn = pool.acquire().await?;
    migrator.run(&mut *conn).await?;

    // Nothing left to do on the second pass.
    let summary = migrator.run(&mut *conn).await?;
    tracing::info!("second pass skipped {:?}", summary.skipped);

    for record in migrator.applied(&mut *conn).await? {
        tracing::info!(
            "{} applied at {} ({})",
            record.name,
            record.applied_at,
            record.fingerprint
        );
    }

    let (entries, published) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT count(*), count(published) FROM entries",
    )
    .fetch_one(&mut *conn)
    .await?;
    tracing::info!("{entries} entries, {published} with a published flag");

    Ok(())
}
