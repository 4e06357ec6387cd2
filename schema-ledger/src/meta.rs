//! Ledger of applied migrations.

use chrono::{DateTime, SubsecRound, Utc};
#[cfg(feature = "mysql")]
use sea_query::MysqlQueryBuilder;
#[cfg(feature = "postgres")]
use sea_query::PostgresQueryBuilder;
#[cfg(feature = "sqlite")]
use sea_query::SqliteQueryBuilder;
use sea_query::{
    Alias, Asterisk, ColumnDef, Expr, Func, Iden, Order, Query, SelectStatement, Table,
    TableCreateStatement,
};
use sea_query_binder::{SqlxBinder, SqlxValues};
use sqlx::Database;

use crate::error::{Error, Result};

/// Column identifiers of the ledger table.
///
/// The table name itself is configurable, see [`Config`](crate::Config).
#[derive(Iden, Clone, Copy)]
pub enum Meta {
    /// Insertion order
    Id,
    Name,
    Fingerprint,
    /// Seconds since the Unix epoch
    AppliedAt,
    /// Microseconds within the second
    AppliedAtSubsec,
}

/// A ledger row: one migration that was applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub name: String,
    /// Hex digest of the migration source, or the RFC 3339 time of
    /// application for system migrations.
    pub fingerprint: String,
    pub applied_at: DateTime<Utc>,
}

impl AppliedMigration {
    /// Creates a row stamped with the current time, truncated to the
    /// microsecond precision the ledger stores.
    pub fn new(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fingerprint: fingerprint.into(),
            applied_at: Utc::now().trunc_subsecs(6),
        }
    }

    fn from_row((name, fingerprint, secs, micros): (String, String, i64, i64)) -> Result<Self> {
        let applied_at = u32::try_from(micros)
            .ok()
            .and_then(|micros| micros.checked_mul(1_000))
            .and_then(|nanos| DateTime::from_timestamp(secs, nanos))
            .ok_or_else(|| {
                sqlx::Error::Decode(
                    format!("invalid applied_at for migration `{name}`: {secs}.{micros}").into(),
                )
            })?;

        Ok(Self {
            name,
            fingerprint,
            applied_at,
        })
    }
}

/// Access to the ledger table, always through the caller's connection so that
/// reads and writes join the enclosing transaction.
#[derive(Debug, Clone)]
pub struct MetaTable {
    table: String,
}

impl MetaTable {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn alias(&self) -> Alias {
        Alias::new(self.table.as_str())
    }

    fn create_statement(&self) -> TableCreateStatement {
        Table::create()
            .table(self.alias())
            .if_not_exists()
            .col(
                ColumnDef::new(Meta::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Meta::Name)
                    .string_len(255)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Meta::Fingerprint).string_len(128).not_null())
            .col(ColumnDef::new(Meta::AppliedAt).big_integer().not_null())
            .col(ColumnDef::new(Meta::AppliedAtSubsec).big_integer().not_null())
            .to_owned()
    }

    /// Creates the ledger table if it does not exist yet.
    pub async fn ensure_schema<DB>(&self, connection: &mut DB::Connection) -> Result<()>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    {
        let statement = build_schema::<DB>(&self.create_statement())?;

        sqlx::raw_sql(&statement)
            .execute(&mut *connection)
            .await
            .map_err(Error::SchemaEnsureFailed)?;

        Ok(())
    }

    /// Returns whether the ledger table exists, without creating it.
    pub async fn exists<DB>(&self, connection: &mut DB::Connection) -> Result<bool>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
        SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
        i64: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
        usize: sqlx::ColumnIndex<DB::Row>,
    {
        let statement = exists_statement::<DB>(&self.table)?;
        let (sql, values) = build_sqlx::<DB, _>(&statement)?;

        let (count,) = sqlx::query_as_with::<DB, (i64,), _>(&sql, values)
            .fetch_one(&mut *connection)
            .await?;

        Ok(count > 0)
    }

    /// Looks up the ledger row of migration `name`.
    pub async fn find<DB>(
        &self,
        connection: &mut DB::Connection,
        name: &str,
    ) -> Result<Option<AppliedMigration>>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
        SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
        String: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
        i64: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
        usize: sqlx::ColumnIndex<DB::Row>,
    {
        let statement = Query::select()
            .columns([
                Meta::Name,
                Meta::Fingerprint,
                Meta::AppliedAt,
                Meta::AppliedAtSubsec,
            ])
            .from(self.alias())
            .and_where(Expr::col(Meta::Name).eq(name))
            .limit(1)
            .to_owned();

        let (sql, values) = build_sqlx::<DB, _>(&statement)?;

        let row = sqlx::query_as_with::<DB, (String, String, i64, i64), _>(&sql, values)
            .fetch_optional(&mut *connection)
            .await?;

        row.map(AppliedMigration::from_row).transpose()
    }

    /// Inserts a ledger row.
    pub async fn append<DB>(
        &self,
        connection: &mut DB::Connection,
        record: &AppliedMigration,
    ) -> Result<()>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
        SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
    {
        let statement = Query::insert()
            .into_table(self.alias())
            .columns([
                Meta::Name,
                Meta::Fingerprint,
                Meta::AppliedAt,
                Meta::AppliedAtSubsec,
            ])
            .values_panic([
                record.name.clone().into(),
                record.fingerprint.clone().into(),
                record.applied_at.timestamp().into(),
                i64::from(record.applied_at.timestamp_subsec_micros()).into(),
            ])
            .to_owned();

        let (sql, values) = build_sqlx::<DB, _>(&statement)?;

        sqlx::query_with::<DB, _>(&sql, values)
            .execute(&mut *connection)
            .await?;

        Ok(())
    }

    /// Returns every ledger row in insertion order.
    pub async fn list<DB>(&self, connection: &mut DB::Connection) -> Result<Vec<AppliedMigration>>
    where
        DB: Database,
        for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
        SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
        String: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
        i64: for<'r> sqlx::Decode<'r, DB> + sqlx::Type<DB>,
        usize: sqlx::ColumnIndex<DB::Row>,
    {
        let statement = Query::select()
            .columns([
                Meta::Name,
                Meta::Fingerprint,
                Meta::AppliedAt,
                Meta::AppliedAtSubsec,
            ])
            .from(self.alias())
            .order_by(Meta::Id, Order::Asc)
            .to_owned();

        let (sql, values) = build_sqlx::<DB, _>(&statement)?;

        let rows = sqlx::query_as_with::<DB, (String, String, i64, i64), _>(&sql, values)
            .fetch_all(&mut *connection)
            .await?;

        rows.into_iter().map(AppliedMigration::from_row).collect()
    }
}

fn build_sqlx<DB: Database, S: SqlxBinder>(statement: &S) -> Result<(String, SqlxValues)> {
    match DB::NAME {
        #[cfg(feature = "sqlite")]
        "SQLite" => Ok(statement.build_sqlx(SqliteQueryBuilder)),
        #[cfg(feature = "mysql")]
        "MySQL" => Ok(statement.build_sqlx(MysqlQueryBuilder)),
        #[cfg(feature = "postgres")]
        "PostgreSQL" => Ok(statement.build_sqlx(PostgresQueryBuilder)),
        name => Err(Error::UnsupportedDatabase(name.to_owned())),
    }
}

fn exists_statement<DB: Database>(table: &str) -> Result<SelectStatement> {
    let mut statement = Query::select();
    statement.expr(Func::count(Expr::col(Asterisk)));

    match DB::NAME {
        "SQLite" => statement
            .from(Alias::new("sqlite_master"))
            .and_where(Expr::col(Alias::new("type")).eq("table")),
        "MySQL" => statement
            .from((Alias::new("information_schema"), Alias::new("tables")))
            .and_where(Expr::col(Alias::new("table_schema")).eq(Expr::cust("DATABASE()"))),
        "PostgreSQL" => statement
            .from((Alias::new("information_schema"), Alias::new("tables")))
            .and_where(Expr::col(Alias::new("table_schema")).eq(Expr::cust("current_schema()"))),
        name => return Err(Error::UnsupportedDatabase(name.to_owned())),
    };

    let column = if DB::NAME == "SQLite" {
        "name"
    } else {
        "table_name"
    };

    Ok(statement
        .and_where(Expr::col(Alias::new(column)).eq(table))
        .to_owned())
}

fn build_schema<DB: Database>(statement: &TableCreateStatement) -> Result<String> {
    match DB::NAME {
        #[cfg(feature = "sqlite")]
        "SQLite" => Ok(statement.to_string(SqliteQueryBuilder)),
        #[cfg(feature = "mysql")]
        "MySQL" => Ok(statement.to_string(MysqlQueryBuilder)),
        #[cfg(feature = "postgres")]
        "PostgreSQL" => Ok(statement.to_string(PostgresQueryBuilder)),
        name => Err(Error::UnsupportedDatabase(name.to_owned())),
    }
}
