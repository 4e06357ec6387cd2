//! Ordered, fingerprinted, all-or-nothing schema migrations for SQL databases.
//!
//! Migrations are registered in a [`Registry`] and applied by a [`Migrator`]
//! inside one transaction. Every applied migration gets a row in a ledger
//! table holding its name, a fingerprint of its defining source and the time
//! it was applied. On later runs the fingerprint is recomputed and compared,
//! so a migration edited after reaching a live database stops the run instead
//! of silently diverging.
//!
//! # Features
//!
//! - **`sqlite`** (default) - Enables SQLite database support
//! - **`mysql`** - Enables MySQL database support
//! - **`postgres`** - Enables PostgreSQL database support
//!
//! # Usage
//!
//! ```rust,ignore
//! use schema_ledger::{Config, Migration, Migrator, Registry, Source};
//!
//! let mut registry = Registry::<sqlx::Sqlite>::new();
//!
//! registry.register(Migration::new(
//!     "m0001_create_entries",
//!     Source::embedded(include_bytes!("migrations/m0001_create_entries.rs")),
//!     CreateEntries,
//! ))?;
//!
//! registry.register(
//!     Migration::new(
//!         "m0002_add_published",
//!         Source::embedded(include_bytes!("migrations/m0002_add_published.rs")),
//!         AddPublished,
//!     )
//!     .reverse(DropPublished),
//! )?;
//!
//! registry.register_system("system_audit_table", EnsureAuditTable)?;
//!
//! let migrator = Migrator::with_config(registry, Config::default().table("__app_migrations"));
//!
//! let mut conn = pool.acquire().await?;
//! migrator.run(&mut *conn).await?;
//! ```
//!
//! # Migrations
//!
//! - **Tracked** migrations ([`Migration::new`]) carry a [`Source`]. The
//!   SHA-256 of its raw bytes is recorded when the migration is applied and
//!   must match on every later run, otherwise the run fails with
//!   [`Error::ChecksumMismatch`]. Any byte change counts, including comments
//!   and formatting.
//! - **System** migrations ([`Migration::system`],
//!   [`Registry::register_system`]) have no source. They run once and are
//!   skipped forever after, whatever their current body.
//!
//! Reverse operations can be attached with [`Migration::reverse`]; the
//! migrator stores them but never runs them.
//!
//! # Ledger Table
//!
//! | Column | Type | Description |
//! |--------|------|-------------|
//! | `id` | INTEGER | Auto-increment, ledger order |
//! | `name` | VARCHAR(255) | Migration name (unique) |
//! | `fingerprint` | VARCHAR(128) | Hex digest, or application time for system migrations |
//! | `applied_at` | BIGINT | Application timestamp (seconds) |
//! | `applied_at_subsec` | BIGINT | Microseconds |
//!
//! The table is named `__migrations_meta` unless [`Config::table`] says
//! otherwise, and is created on the first run.

#![forbid(unsafe_code)]

mod config;
mod error;
mod fingerprint;
mod meta;
mod migration;
mod migrator;
mod registry;

pub use config::*;
pub use error::*;
pub use fingerprint::fingerprint;
pub use meta::{AppliedMigration, Meta, MetaTable};
pub use migration::*;
pub use migrator::*;
pub use registry::*;
