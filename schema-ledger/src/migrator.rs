use std::collections::HashSet;

use chrono::Utc;
use sea_query_binder::SqlxValues;
use sqlx::{Connection, Database};

use crate::{
    config::Config,
    error::{Error, Result},
    fingerprint::fingerprint,
    meta::{AppliedMigration, MetaTable},
    migration::{Migration, Source},
    registry::Registry,
};

/// Type alias for a SQLite migrator.
#[cfg(feature = "sqlite")]
pub type SqliteMigrator = Migrator<sqlx::Sqlite>;

/// Type alias for a MySQL migrator.
///
/// MySQL commits DDL implicitly, so only data changes of a failed run are
/// rolled back.
#[cfg(feature = "mysql")]
pub type MySqlMigrator = Migrator<sqlx::MySql>;

/// Type alias for a PostgreSQL migrator.
#[cfg(feature = "postgres")]
pub type PostgresMigrator = Migrator<sqlx::Postgres>;

/// Outcome of a successful [`Migrator::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Migrations applied by this run, in order.
    pub applied: Vec<String>,
    /// Migrations already present in the ledger, in order.
    pub skipped: Vec<String>,
}

/// Applies the migrations of a [`Registry`] inside a single transaction.
///
/// # Example
///
/// ```rust,ignore
/// use schema_ledger::{Migration, Migrator, Registry, Source};
///
/// let mut registry = Registry::<sqlx::Sqlite>::new();
/// registry.register(Migration::new(
///     "m0001_create_entries",
///     Source::embedded(include_bytes!("migrations/m0001_create_entries.rs")),
///     CreateEntries,
/// ))?;
///
/// let mut conn = pool.acquire().await?;
/// Migrator::new(registry).run(&mut *conn).await?;
/// ```
pub struct Migrator<DB: Database> {
    registry: Registry<DB>,
    meta: MetaTable,
}

impl<DB: Database> Migrator<DB> {
    pub fn new(registry: Registry<DB>) -> Self {
        Self::with_config(registry, Config::default())
    }

    pub fn with_config(registry: Registry<DB>, config: Config) -> Self {
        Self {
            registry,
            meta: MetaTable::new(config.table),
        }
    }

    pub fn registry(&self) -> &Registry<DB> {
        &self.registry
    }

    /// Name of the ledger table.
    pub fn table(&self) -> &str {
        self.meta.table()
    }
}

impl<DB> Migrator<DB>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
    String: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
    i64: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
    usize: sqlx::ColumnIndex<DB::Row>,
{
    /// Applies every pending migration in registration order.
    ///
    /// Already applied migrations are verified against their recorded
    /// fingerprint and skipped. Either every pending migration is applied and
    /// recorded, or the transaction is rolled back and the store is left as it
    /// was before the call.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaEnsureFailed`] if the ledger table cannot be created
    /// - [`Error::IntegrityCheckFailed`] if a migration source cannot be read
    /// - [`Error::ChecksumMismatch`] if an applied migration's source changed
    /// - [`Error::ApplyFailed`] if a forward operation fails
    pub async fn run(&self, connection: &mut DB::Connection) -> Result<Summary> {
        let mut tx = connection.begin().await?;

        match self.apply(&mut *tx).await {
            Ok(summary) => {
                tx.commit().await?;

                tracing::info!(
                    "migrations done: {} applied, {} skipped",
                    summary.applied.len(),
                    summary.skipped.len()
                );

                Ok(summary)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!("rollback after failed migration run: {rollback}");
                }

                Err(err)
            }
        }
    }

    async fn apply(&self, connection: &mut DB::Connection) -> Result<Summary> {
        tracing::info!("ensuring ledger table `{}` exists", self.meta.table());
        self.meta.ensure_schema::<DB>(&mut *connection).await?;

        tracing::info!("will migrate over {} migrations", self.registry.len());

        let mut summary = Summary::default();

        for (i, migration) in self.registry.iter().enumerate() {
            let name = migration.name();
            tracing::debug!("({i}) migrating {name}");

            if let Some(existing) = self.meta.find::<DB>(&mut *connection, name).await? {
                if let Some(source) = migration.source() {
                    let actual = compute(migration, source)?;

                    if actual != existing.fingerprint {
                        tracing::error!(
                            "checksum mismatch for {name}: recorded {}, computed {actual}",
                            existing.fingerprint
                        );

                        return Err(Error::ChecksumMismatch {
                            name: name.to_owned(),
                            expected: existing.fingerprint,
                            actual,
                        });
                    }
                }

                tracing::info!("skip {name}, applied at {}", existing.applied_at);
                summary.skipped.push(name.to_owned());

                continue;
            }

            let fingerprint = match migration.source() {
                Some(source) => compute(migration, source)?,
                None => Utc::now().to_rfc3339(),
            };

            if let Err(source) = migration.forward().execute(&mut *connection).await {
                tracing::error!("migration {name} failed: {source:#}");

                return Err(Error::ApplyFailed {
                    name: name.to_owned(),
                    source,
                });
            }

            let record = AppliedMigration::new(name, fingerprint);
            self.meta.append::<DB>(&mut *connection, &record).await?;

            tracing::info!("applied {name} with fingerprint {}", record.fingerprint);
            summary.applied.push(record.name);
        }

        Ok(summary)
    }

    /// Returns the ledger rows in the order they were recorded.
    ///
    /// A store that was never migrated has no ledger table and yields an
    /// empty list; the table is not created.
    pub async fn applied(&self, connection: &mut DB::Connection) -> Result<Vec<AppliedMigration>> {
        if !self.meta.exists::<DB>(&mut *connection).await? {
            return Ok(Vec::new());
        }

        self.meta.list::<DB>(&mut *connection).await
    }

    /// Returns the names of registered migrations without a ledger row, in
    /// registration order. Nothing is applied or verified.
    pub async fn pending(&self, connection: &mut DB::Connection) -> Result<Vec<String>> {
        let applied = self
            .applied(connection)
            .await?
            .into_iter()
            .map(|record| record.name)
            .collect::<HashSet<_>>();

        Ok(self
            .registry
            .iter()
            .filter(|m| !applied.contains(m.name()))
            .map(|m| m.name().to_owned())
            .collect())
    }
}

fn compute<DB: Database>(migration: &Migration<DB>, source: &Source) -> Result<String> {
    fingerprint(source).map_err(|err| Error::IntegrityCheckFailed {
        name: migration.name().to_owned(),
        source: err,
    })
}
