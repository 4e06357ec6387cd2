use sqlx::Database;

use crate::{
    error::{Error, Result},
    migration::{Migration, Operation},
};

/// Ordered collection of migrations.
///
/// Migrations are applied in the order they were registered. The registry is
/// append-only; once it is handed to a [`Migrator`](crate::Migrator) it can no
/// longer be changed.
pub struct Registry<DB: Database> {
    migrations: Vec<Migration<DB>>,
}

impl<DB: Database> Registry<DB> {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// Appends a migration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMigration`] if a migration with the same name
    /// is already registered.
    pub fn register(&mut self, migration: Migration<DB>) -> Result<()> {
        if self.get(migration.name()).is_some() {
            return Err(Error::DuplicateMigration(migration.name().to_owned()));
        }

        self.migrations.push(migration);

        Ok(())
    }

    /// Appends a system migration without a reverse operation.
    ///
    /// Use [`Registry::register_system_with_reverse`] to attach one.
    pub fn register_system<O>(&mut self, name: impl Into<String>, forward: O) -> Result<()>
    where
        O: Operation<DB> + 'static,
    {
        self.register(Migration::system(name, forward))
    }

    /// Appends a system migration together with its reverse operation. The
    /// reverse operation is stored, never run by the migrator.
    pub fn register_system_with_reverse<O, R>(
        &mut self,
        name: impl Into<String>,
        forward: O,
        reverse: R,
    ) -> Result<()>
    where
        O: Operation<DB> + 'static,
        R: Operation<DB> + 'static,
    {
        self.register(Migration::system(name, forward).reverse(reverse))
    }

    pub fn get(&self, name: &str) -> Option<&Migration<DB>> {
        self.migrations.iter().find(|m| m.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Migration<DB>> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

impl<DB: Database> Default for Registry<DB> {
    fn default() -> Self {
        Self::new()
    }
}
