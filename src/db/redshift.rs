use log::error;
use tokio::{runtime::Runtime, task::JoinHandle};
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use crate::config::ClusterConfig;

use super::warehouse::{Dialect, Warehouse, WarehouseError};

const LIST_TABLES: &str = "SELECT tablename FROM pg_catalog.pg_tables \
WHERE schemaname != 'pg_catalog' AND schemaname != 'information_schema' \
ORDER BY tablename;";

/// A blocking connection to a Redshift cluster.  The runtime is
/// single-threaded: the connection task only makes progress while a call
/// blocks on it.
pub struct RedshiftWarehouse {
    runtime: Runtime,
    client: Client,
    connection: JoinHandle<()>,
}

/// Build the client config from the cluster parameters, in the fixed order
/// host, dbname, user, password, port.
pub fn pg_config(cluster: &ClusterConfig) -> tokio_postgres::Config {
    let mut config = tokio_postgres::Config::new();
    config
        .host(&cluster.host)
        .dbname(&cluster.db_name)
        .user(&cluster.db_user)
        .password(&cluster.db_password)
        .port(cluster.db_port);
    config
}

impl RedshiftWarehouse {
    pub fn connect(cluster: &ClusterConfig) -> Result<RedshiftWarehouse, WarehouseError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| WarehouseError::Connect(e.to_string()))?;
        let (client, connection) = runtime.block_on(pg_config(cluster).connect(NoTls))?;
        let connection = runtime.spawn(async move {
            if let Err(e) = connection.await {
                error!("connection error: {}", e);
            }
        });
        Ok(RedshiftWarehouse {
            runtime,
            client,
            connection,
        })
    }
}

impl Warehouse for RedshiftWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Redshift
    }

    fn execute(&mut self, sql: &str) -> Result<(), WarehouseError> {
        // simple query protocol, autocommit
        self.runtime.block_on(self.client.batch_execute(sql))?;
        Ok(())
    }

    fn list_tables(&mut self) -> Result<Vec<String>, WarehouseError> {
        let messages = self.runtime.block_on(self.client.simple_query(LIST_TABLES))?;
        let names = messages
            .iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::Row(row) => row.get(0).map(|s| s.to_string()),
                _ => None,
            })
            .collect();
        Ok(names)
    }

    fn close(self: Box<Self>) -> Result<(), WarehouseError> {
        let RedshiftWarehouse {
            runtime,
            client,
            connection,
        } = *self;
        // dropping the client sends Terminate and lets the connection task finish
        drop(client);
        runtime
            .block_on(connection)
            .map_err(|e| WarehouseError::Close(e.to_string()))
    }
}
