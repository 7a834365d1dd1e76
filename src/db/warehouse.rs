use std::fmt::Display;

use thiserror::Error;

/// The SQL flavour a warehouse speaks.  Decides how the catalog renders
/// table layout and ingestion statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Redshift,
    DuckDb,
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Dialect::*;
        match self {
            Redshift => write!(f, "redshift"),
            DuckDb => write!(f, "duckdb"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("cannot connect: {0}")]
    Connect(String),
    #[error("not connected to the warehouse")]
    NotConnected,
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),
    #[error(transparent)]
    DuckDb(#[from] duckdb::Error),
    #[error("error closing connection: {0}")]
    Close(String),
}

/// One open connection to a warehouse.  Every `execute` call is its own
/// committed unit of work.
pub trait Warehouse {
    fn dialect(&self) -> Dialect;

    /// Run one statement (possibly several `;`-separated statements that make
    /// up a single catalog entry) and commit it.
    fn execute(&mut self, sql: &str) -> Result<(), WarehouseError>;

    /// Names of the user tables, sorted.
    fn list_tables(&mut self) -> Result<Vec<String>, WarehouseError>;

    fn close(self: Box<Self>) -> Result<(), WarehouseError>;
}

/// Stands in for a connection that could not be established.  Every
/// statement fails, closing is a no-op.
pub struct Disconnected {
    pub dialect: Dialect,
}

impl Warehouse for Disconnected {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn execute(&mut self, _sql: &str) -> Result<(), WarehouseError> {
        Err(WarehouseError::NotConnected)
    }

    fn list_tables(&mut self) -> Result<Vec<String>, WarehouseError> {
        Err(WarehouseError::NotConnected)
    }

    fn close(self: Box<Self>) -> Result<(), WarehouseError> {
        Ok(())
    }
}
