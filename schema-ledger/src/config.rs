//! Runtime configuration for a [`Migrator`](crate::Migrator).

/// Default name of the table recording applied migrations.
pub const DEFAULT_TABLE: &str = "__migrations_meta";

/// Migrator configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the ledger table. Must be set before the first run against a
    /// store; changing it later makes every migration look pending.
    pub table: String,
}

impl Config {
    /// Sets the ledger table name.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_owned(),
        }
    }
}
