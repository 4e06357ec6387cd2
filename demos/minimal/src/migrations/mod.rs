mod m0001_create_entries;
mod m0002_add_published;
mod system;

use schema_ledger::{Migration, Registry, Source};

/// Builds the registry in the order migrations must be applied.
pub fn registry() -> schema_ledger::Result<Registry<sqlx::Sqlite>> {
    let mut registry = Registry::new();

    registry.register_system("system_settings_table", system::EnsureSettingsTable)?;

    registry.register(
        Migration::new(
            "m0001_create_entries",
            Source::embedded(include_bytes!("m0001_create_entries.rs")),
            m0001_create_entries::Operation,
        )
        .reverse(m0001_create_entries::Reverse),
    )?;

    registry.register(Migration::new(
        "m0002_add_published",
        Source::embedded(include_bytes!("m0002_add_published.rs")),
        m0002_add_published::Operation,
    ))?;

    Ok(registry)
}
