use std::path::Path;

use duckdb::{AccessMode, Config, Connection};

use super::warehouse::{Dialect, Warehouse, WarehouseError};

/// An embedded DuckDB database standing in for the cluster, used for local
/// runs and for exercising the catalog in tests.
pub struct DuckDbWarehouse {
    conn: Connection,
}

impl DuckDbWarehouse {
    /// Open (or create) a DuckDB file for reading and writing.
    pub fn open<P: AsRef<Path>>(duckdb_path: P) -> Result<DuckDbWarehouse, WarehouseError> {
        let config = Config::default().access_mode(AccessMode::ReadWrite)?;
        let conn = Connection::open_with_flags(duckdb_path, config)?;
        Ok(DuckDbWarehouse { conn })
    }

    pub fn open_in_memory() -> Result<DuckDbWarehouse, WarehouseError> {
        Ok(DuckDbWarehouse {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Warehouse for DuckDbWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn execute(&mut self, sql: &str) -> Result<(), WarehouseError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn list_tables(&mut self) -> Result<Vec<String>, WarehouseError> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name;",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<usize, String>(0))?
            .collect::<Result<Vec<String>, duckdb::Error>>()?;
        Ok(names)
    }

    fn close(self: Box<Self>) -> Result<(), WarehouseError> {
        self.conn
            .close()
            .map_err(|(_, e)| WarehouseError::Close(e.to_string()))
    }
}
