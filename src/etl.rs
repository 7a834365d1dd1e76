use log::{error, info};

use crate::{
    catalog::{QueryCatalog, Statement},
    db::warehouse::Warehouse,
    report::{RunReport, StatementOutcome},
};

/// Run each statement as its own unit of work.  A failure is logged and
/// recorded, then the next statement runs.
pub fn execute_statements(
    warehouse: &mut dyn Warehouse,
    statements: &[Statement],
    report: &mut RunReport,
) {
    for statement in statements {
        let outcome = match warehouse.execute(&statement.sql) {
            Ok(_) => {
                info!("{} {} ... ok", statement.step, statement.table);
                StatementOutcome {
                    table: statement.table,
                    step: statement.step,
                    error: None,
                }
            }
            Err(e) => {
                error!("{} {} failed: {}", statement.step, statement.table, e);
                StatementOutcome {
                    table: statement.table,
                    step: statement.step,
                    error: Some(e.to_string()),
                }
            }
        };
        report.push(outcome);
    }
}

pub fn drop_tables(warehouse: &mut dyn Warehouse, catalog: &QueryCatalog, report: &mut RunReport) {
    info!("dropping tables ...");
    execute_statements(warehouse, &catalog.drop_statements(), report);
}

pub fn create_tables(
    warehouse: &mut dyn Warehouse,
    catalog: &QueryCatalog,
    report: &mut RunReport,
) {
    info!("creating tables ...");
    execute_statements(warehouse, &catalog.create_statements(), report);
}

/// Fill the staging tables from the source datasets.
pub fn load_staging_tables(
    warehouse: &mut dyn Warehouse,
    catalog: &QueryCatalog,
    report: &mut RunReport,
) {
    info!("loading staging tables ...");
    execute_statements(warehouse, &catalog.copy_statements(), report);
}

/// Fill the fact and dimension tables from the staging tables.
pub fn insert_tables(
    warehouse: &mut dyn Warehouse,
    catalog: &QueryCatalog,
    report: &mut RunReport,
) {
    info!("inserting into final tables ...");
    execute_statements(warehouse, &catalog.insert_statements(), report);
}

/// Drop every table, then create them all again.
pub fn provision(warehouse: &mut dyn Warehouse, catalog: &QueryCatalog) -> RunReport {
    let mut report = RunReport::new();
    drop_tables(warehouse, catalog, &mut report);
    create_tables(warehouse, catalog, &mut report);
    report
}

/// Copy the sources into staging, then insert into the final tables.  The
/// inserts run even when a copy failed.
pub fn load(warehouse: &mut dyn Warehouse, catalog: &QueryCatalog) -> RunReport {
    let mut report = RunReport::new();
    load_staging_tables(warehouse, catalog, &mut report);
    insert_tables(warehouse, catalog, &mut report);
    report
}
