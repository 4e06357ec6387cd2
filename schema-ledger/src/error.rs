#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("migration ledger table could not be ensured: {0}")]
    SchemaEnsureFailed(#[source] sqlx::Error),

    #[error("fingerprint of migration `{name}` could not be computed: {source}")]
    IntegrityCheckFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("checksum mismatch for migration `{name}`: recorded {expected}, computed {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("migration `{name}` failed: {source}")]
    ApplyFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("migration `{0}` is already registered")]
    DuplicateMigration(String),

    #[error("'{0}' not supported, consider using SQLite, PostgreSQL or MySQL")]
    UnsupportedDatabase(String),

    #[error("sqlx `{0}`")]
    Sqlx(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
