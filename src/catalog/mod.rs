//! Every SQL statement the two jobs run, addressable by table and step.
//!
//! The order in which the runners apply them lives in the `*_ORDER`
//! constants below.

pub mod copy;
pub mod schema;
pub mod transform;

use std::fmt::Display;

use crate::{config::DwhConfig, db::warehouse::Dialect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    StagingEvents,
    StagingSongs,
    Songplays,
    Users,
    Songs,
    Artists,
    Time,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::StagingEvents,
        Table::StagingSongs,
        Table::Songplays,
        Table::Users,
        Table::Songs,
        Table::Artists,
        Table::Time,
    ];

    pub fn name(&self) -> &'static str {
        use Table::*;
        match self {
            StagingEvents => "staging_events",
            StagingSongs => "staging_songs",
            Songplays => "songplays",
            Users => "users",
            Songs => "songs",
            Artists => "artists",
            Time => "time",
        }
    }

    pub fn is_staging(&self) -> bool {
        matches!(self, Table::StagingEvents | Table::StagingSongs)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Drop and create order: staging tables, then the fact, then the dimensions.
pub const PROVISION_ORDER: [Table; 7] = Table::ALL;

pub const COPY_ORDER: [Table; 2] = [Table::StagingEvents, Table::StagingSongs];

/// The fact table is loaded before the dimensions it points to.  Nothing is
/// enforced by the warehouse so the order has no effect on the result.
pub const INSERT_ORDER: [Table; 5] = [
    Table::Songplays,
    Table::Users,
    Table::Songs,
    Table::Artists,
    Table::Time,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Drop,
    Create,
    Copy,
    Insert,
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Step::*;
        match self {
            Drop => write!(f, "drop"),
            Create => write!(f, "create"),
            Copy => write!(f, "copy"),
            Insert => write!(f, "insert"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub table: Table,
    pub step: Step,
    pub sql: String,
}

/// All statements for one dialect, assembled once from the configuration.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    dialect: Dialect,
    copies: Vec<(Table, String)>,
}

impl QueryCatalog {
    pub fn new(config: &DwhConfig, dialect: Dialect) -> QueryCatalog {
        let copies = COPY_ORDER
            .iter()
            .filter_map(|t| copy::copy_sql(*t, config, dialect).map(|sql| (*t, sql)))
            .collect();
        QueryCatalog { dialect, copies }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn drop(&self, table: Table) -> Statement {
        Statement {
            table,
            step: Step::Drop,
            sql: schema::table_def(table).drop_sql(self.dialect),
        }
    }

    pub fn create(&self, table: Table) -> Statement {
        Statement {
            table,
            step: Step::Create,
            sql: schema::table_def(table).create_sql(self.dialect),
        }
    }

    pub fn copy(&self, table: Table) -> Option<Statement> {
        self.copies
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, sql)| Statement {
                table,
                step: Step::Copy,
                sql: sql.clone(),
            })
    }

    pub fn insert(&self, table: Table) -> Option<Statement> {
        transform::insert_sql(table).map(|sql| Statement {
            table,
            step: Step::Insert,
            sql: sql.to_string(),
        })
    }

    pub fn drop_statements(&self) -> Vec<Statement> {
        PROVISION_ORDER.iter().map(|t| self.drop(*t)).collect()
    }

    pub fn create_statements(&self) -> Vec<Statement> {
        PROVISION_ORDER.iter().map(|t| self.create(*t)).collect()
    }

    pub fn copy_statements(&self) -> Vec<Statement> {
        COPY_ORDER.iter().filter_map(|t| self.copy(*t)).collect()
    }

    pub fn insert_statements(&self) -> Vec<Statement> {
        INSERT_ORDER.iter().filter_map(|t| self.insert(*t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SAMPLE;

    fn catalog(dialect: Dialect) -> QueryCatalog {
        QueryCatalog::new(&SAMPLE.parse::<DwhConfig>().unwrap(), dialect)
    }

    fn tables(statements: &[Statement]) -> Vec<&'static str> {
        statements.iter().map(|s| s.table.name()).collect()
    }

    #[test]
    fn list_orders() {
        let catalog = catalog(Dialect::Redshift);
        let provision = vec![
            "staging_events",
            "staging_songs",
            "songplays",
            "users",
            "songs",
            "artists",
            "time",
        ];
        assert_eq!(tables(&catalog.drop_statements()), provision);
        assert_eq!(tables(&catalog.create_statements()), provision);
        assert_eq!(
            tables(&catalog.copy_statements()),
            vec!["staging_events", "staging_songs"]
        );
        assert_eq!(
            tables(&catalog.insert_statements()),
            vec!["songplays", "users", "songs", "artists", "time"]
        );
    }

    #[test]
    fn steps_are_tagged() {
        let catalog = catalog(Dialect::Redshift);
        assert!(catalog.drop_statements().iter().all(|s| s.step == Step::Drop));
        assert!(catalog.create_statements().iter().all(|s| s.step == Step::Create));
        assert!(catalog.copy_statements().iter().all(|s| s.step == Step::Copy));
        assert!(catalog.insert_statements().iter().all(|s| s.step == Step::Insert));
    }

    #[test]
    fn named_statements() {
        let catalog = catalog(Dialect::Redshift);
        assert_eq!(catalog.drop(Table::Users).sql, "DROP TABLE IF EXISTS users;");
        assert!(catalog.copy(Table::Users).is_none());
        assert!(catalog.insert(Table::StagingSongs).is_none());
        let copy = catalog.copy(Table::StagingSongs).unwrap();
        assert!(copy.sql.starts_with("COPY staging_songs"));
        let insert = catalog.insert(Table::Songplays).unwrap();
        assert!(insert
            .sql
            .contains("JOIN staging_events log ON (song.artist_name = log.artist)"));
    }

    #[test]
    fn staging_tables() {
        let staged: Vec<Table> = Table::ALL.into_iter().filter(|t| t.is_staging()).collect();
        assert_eq!(staged, COPY_ORDER.to_vec());
    }
}
