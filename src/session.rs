use std::path::PathBuf;

use log::{error, info};

use crate::{
    catalog::QueryCatalog,
    config::DwhConfig,
    db::{
        lib_duckdb::DuckDbWarehouse,
        redshift::RedshiftWarehouse,
        warehouse::{Dialect, Disconnected, Warehouse, WarehouseError},
    },
    report::RunReport,
};

/// Where a run sends its statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Redshift,
    DuckDb(PathBuf),
}

impl Target {
    pub fn dialect(&self) -> Dialect {
        match self {
            Target::Redshift => Dialect::Redshift,
            Target::DuckDb(_) => Dialect::DuckDb,
        }
    }

    /// `--duckdb <path>` selects a local database, otherwise the cluster.
    pub fn from_duckdb_path(path: Option<PathBuf>) -> Target {
        match path {
            Some(p) => Target::DuckDb(p),
            None => Target::Redshift,
        }
    }

    fn connect(&self, config: &DwhConfig) -> Result<Box<dyn Warehouse>, WarehouseError> {
        match self {
            Target::Redshift => {
                let params = config
                    .cluster
                    .params()
                    .into_iter()
                    .filter(|(name, _)| *name != "password")
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect::<Vec<String>>()
                    .join(" ");
                info!("connecting to redshift {} ...", params);
                Ok(Box::new(RedshiftWarehouse::connect(&config.cluster)?))
            }
            Target::DuckDb(path) => {
                info!("opening duckdb {} ...", path.display());
                Ok(Box::new(DuckDbWarehouse::open(path)?))
            }
        }
    }
}

/// Open one connection, or a `Disconnected` stand-in if that fails.  The
/// error, if any, is logged and returned alongside.
pub fn open(target: &Target, config: &DwhConfig) -> (Box<dyn Warehouse>, Option<String>) {
    match target.connect(config) {
        Ok(wh) => (wh, None),
        Err(e) => {
            error!("Issue in getting a connection: {}", e);
            (
                Box::new(Disconnected {
                    dialect: target.dialect(),
                }),
                Some(e.to_string()),
            )
        }
    }
}

/// Close the connection.  Failures are logged and returned, never raised.
pub fn close(warehouse: Box<dyn Warehouse>) -> Option<String> {
    match warehouse.close() {
        Ok(_) => {
            info!("connection closed");
            None
        }
        Err(e) => {
            error!("Issue in closing the connection: {}", e);
            Some(e.to_string())
        }
    }
}

/// Open a connection, build the catalog for its dialect, run `job` and close
/// the connection, whatever `job` did.
pub fn run<F>(target: &Target, config: &DwhConfig, job: F) -> RunReport
where
    F: FnOnce(&mut dyn Warehouse, &QueryCatalog) -> RunReport,
{
    let (mut warehouse, connection_error) = open(target, config);
    let catalog = QueryCatalog::new(config, warehouse.dialect());
    let mut report = job(warehouse.as_mut(), &catalog);
    report.connection_error = connection_error;
    report.close_error = close(warehouse);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::Step,
        config::tests::SAMPLE,
        etl::{load, provision},
    };

    #[test]
    fn target_from_args() {
        assert_eq!(Target::from_duckdb_path(None), Target::Redshift);
        assert_eq!(
            Target::from_duckdb_path(Some(PathBuf::from("dwh.duckdb"))).dialect(),
            Dialect::DuckDb
        );
    }

    #[test]
    fn unreachable_cluster_fails_every_statement() {
        let mut config = SAMPLE.parse::<DwhConfig>().unwrap();
        config.cluster.host = "127.0.0.1".to_string();
        config.cluster.db_port = 1;
        let report = run(&Target::Redshift, &config, provision);
        assert!(report.connection_error.is_some());
        assert!(report.close_error.is_none());
        assert_eq!(report.outcomes.len(), 14);
        assert_eq!(report.failed().count(), 14);
        assert!(report
            .failed()
            .all(|o| o.error.as_deref() == Some("not connected to the warehouse")));
        assert_eq!(report.exit_code(false), 0);
        assert_eq!(report.exit_code(true), 1);
    }

    #[test]
    fn local_provision_then_load() {
        let path = std::env::temp_dir().join(format!("dwh_etl_session_{}.duckdb", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut config = SAMPLE.parse::<DwhConfig>().unwrap();
        config.s3.log_data = "/definitely/not/here/*.json".to_string();
        config.s3.song_data = "/definitely/not/here/*.json".to_string();
        let target = Target::DuckDb(path.clone());

        let report = run(&target, &config, provision);
        assert!(report.is_success(), "{}", report.ascii_table());

        // the tables survive across runs, the copies fail on missing files
        let report = run(&target, &config, load);
        let _ = std::fs::remove_file(&path);
        assert!(report.connection_error.is_none());
        assert_eq!(report.failed().count(), 2);
        assert!(report.failed().all(|o| o.step == Step::Copy));
    }
}
