//! Migration records and the operations they run.

use std::{fmt, path::PathBuf};

use sqlx::Database;

/// A single schema or data change executed against the migration transaction.
///
/// Implementations receive the connection of the enclosing transaction; every
/// statement they run is committed or rolled back together with the rest of
/// the migration pass.
///
/// # Example
///
/// ```rust,ignore
/// pub struct CreateEntries;
///
/// #[async_trait::async_trait]
/// impl schema_ledger::Operation<sqlx::Sqlite> for CreateEntries {
///     async fn execute(&self, connection: &mut sqlx::SqliteConnection) -> anyhow::Result<()> {
///         sqlx::query("CREATE TABLE entries (id INTEGER PRIMARY KEY, content TEXT NOT NULL)")
///             .execute(connection)
///             .await?;
///
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Operation<DB: Database>: Send + Sync {
    /// Runs the operation. The returned error must be the failure actually
    /// encountered, it is reported as the cause of the failed run.
    async fn execute(&self, connection: &mut DB::Connection) -> anyhow::Result<()>;
}

/// Where the defining unit of a migration lives, used to fingerprint it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A file read at run time.
    File(PathBuf),
    /// Bytes compiled into the binary, usually `include_bytes!` of the file
    /// that defines the migration.
    Embedded(&'static [u8]),
}

impl Source {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn embedded(bytes: &'static [u8]) -> Self {
        Self::Embedded(bytes)
    }
}

/// A registered migration.
///
/// Tracked migrations carry a [`Source`] whose fingerprint is recorded when
/// they are applied and verified on every later run. System migrations have
/// no source and are considered satisfied once their ledger row exists.
pub struct Migration<DB: Database> {
    name: String,
    source: Option<Source>,
    forward: Box<dyn Operation<DB>>,
    reverse: Option<Box<dyn Operation<DB>>>,
}

impl<DB: Database> Migration<DB> {
    /// Creates a fingerprint-tracked migration.
    pub fn new<O>(name: impl Into<String>, source: Source, forward: O) -> Self
    where
        O: Operation<DB> + 'static,
    {
        Self {
            name: name.into(),
            source: Some(source),
            forward: Box::new(forward),
            reverse: None,
        }
    }

    /// Creates a system migration, exempt from fingerprint verification.
    pub fn system<O>(name: impl Into<String>, forward: O) -> Self
    where
        O: Operation<DB> + 'static,
    {
        Self {
            name: name.into(),
            source: None,
            forward: Box::new(forward),
            reverse: None,
        }
    }

    /// Attaches a reverse operation. The migrator never runs it; it is kept
    /// for external tooling.
    pub fn reverse<O>(mut self, reverse: O) -> Self
    where
        O: Operation<DB> + 'static,
    {
        self.reverse = Some(Box::new(reverse));

        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn skip_fingerprint(&self) -> bool {
        self.source.is_none()
    }

    pub fn forward(&self) -> &dyn Operation<DB> {
        self.forward.as_ref()
    }

    pub fn reverse_operation(&self) -> Option<&dyn Operation<DB>> {
        self.reverse.as_deref()
    }
}

impl<DB: Database> fmt::Debug for Migration<DB> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("reversible", &self.reverse.is_some())
            .finish()
    }
}
