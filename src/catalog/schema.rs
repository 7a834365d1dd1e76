use itertools::Itertools;

use super::Table;
use crate::db::warehouse::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar,
    Integer,
    Float,
    Numeric,
    Timestamp,
}

impl ColumnType {
    fn render(&self, dialect: Dialect) -> &'static str {
        use ColumnType::*;
        match (self, dialect) {
            (Varchar, _) => "VARCHAR",
            (Integer, _) => "INTEGER",
            (Float, Dialect::Redshift) => "FLOAT",
            (Float, Dialect::DuckDb) => "DOUBLE",
            (Numeric, _) => "NUMERIC",
            (Timestamp, _) => "TIMESTAMP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    None,
    NotNull,
    PrimaryKey,
    /// Auto-incrementing surrogate key starting at 0.
    Identity,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub typ: ColumnType,
    pub constraint: Constraint,
}

const fn col(name: &'static str, typ: ColumnType) -> Column {
    Column {
        name,
        typ,
        constraint: Constraint::None,
    }
}

const fn not_null(name: &'static str, typ: ColumnType) -> Column {
    Column {
        name,
        typ,
        constraint: Constraint::NotNull,
    }
}

const fn pk(name: &'static str, typ: ColumnType) -> Column {
    Column {
        name,
        typ,
        constraint: Constraint::PrimaryKey,
    }
}

/// How Redshift spreads the rows of a table over the slices of the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistStyle {
    /// Let the cluster decide.
    Auto,
    /// Rows with the same value of the column land on the same slice.
    Key(&'static str),
    /// A full copy on every node, for small dimension tables.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    None,
    Single(&'static str),
    Compound(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub table: Table,
    pub columns: &'static [Column],
    pub dist_style: DistStyle,
    pub sort_key: SortKey,
}

use ColumnType::*;

const STAGING_EVENTS: &[Column] = &[
    col("artist", Varchar),
    col("auth", Varchar),
    col("firstName", Varchar),
    col("gender", Varchar),
    col("itemInSession", Integer),
    col("lastName", Varchar),
    col("length", Float),
    col("level", Varchar),
    col("location", Varchar),
    col("method", Varchar),
    col("page", Varchar),
    col("registration", Float),
    col("sessionId", Integer),
    col("song", Varchar),
    col("status", Integer),
    col("ts", Timestamp),
    col("userAgent", Varchar),
    col("userId", Integer),
];

const STAGING_SONGS: &[Column] = &[
    col("artist_id", Varchar),
    col("artist_latitude", Float),
    col("artist_location", Varchar),
    col("artist_longitude", Float),
    col("artist_name", Varchar),
    col("duration", Float),
    col("num_songs", Integer),
    col("song_id", Varchar),
    col("title", Varchar),
    col("year", Integer),
];

const SONGPLAYS: &[Column] = &[
    Column {
        name: "songplay_id",
        typ: Integer,
        constraint: Constraint::Identity,
    },
    col("start_time", Timestamp),
    col("user_id", Integer),
    col("song_id", Varchar),
    col("artist_id", Varchar),
    col("session_id", Integer),
    col("location", Varchar),
    col("user_agent", Varchar),
];

const USERS: &[Column] = &[
    pk("user_id", Integer),
    col("first_name", Varchar),
    col("last_name", Varchar),
    col("gender", Varchar),
    col("level", Varchar),
];

const SONGS: &[Column] = &[
    pk("song_id", Varchar),
    not_null("title", Varchar),
    not_null("artist_id", Varchar),
    col("year", Integer),
    col("duration", Numeric),
];

const ARTISTS: &[Column] = &[
    pk("artist_id", Varchar),
    not_null("name", Varchar),
    col("location", Varchar),
    col("latitude", Numeric),
    col("longitude", Numeric),
];

const TIME: &[Column] = &[
    pk("start_time", Timestamp),
    col("hour", Integer),
    col("day", Integer),
    col("week", Varchar),
    col("month", Integer),
    col("year", Integer),
    col("weekday", Varchar),
];

pub fn table_def(table: Table) -> TableDef {
    use Table::*;
    let (columns, dist_style, sort_key) = match table {
        StagingEvents => (STAGING_EVENTS, DistStyle::Auto, SortKey::None),
        StagingSongs => (STAGING_SONGS, DistStyle::Auto, SortKey::None),
        Songplays => (
            SONGPLAYS,
            DistStyle::Key("song_id"),
            SortKey::Compound(&["song_id", "artist_id"]),
        ),
        Users => (
            USERS,
            DistStyle::All,
            SortKey::Compound(&["first_name", "last_name"]),
        ),
        Songs => (SONGS, DistStyle::Key("song_id"), SortKey::Single("artist_id")),
        Artists => (
            ARTISTS,
            DistStyle::All,
            SortKey::Compound(&["name", "location"]),
        ),
        Time => (TIME, DistStyle::Key("start_time"), SortKey::None),
    };
    TableDef {
        table,
        columns,
        dist_style,
        sort_key,
    }
}

impl TableDef {
    /// DuckDB has no identity columns, the surrogate key is fed by a sequence.
    fn sequence_name(&self) -> String {
        format!("{}_id_seq", self.table.name())
    }

    fn has_identity(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.constraint == Constraint::Identity)
    }

    fn render_column(&self, column: &Column, dialect: Dialect) -> String {
        let typ = column.typ.render(dialect);
        let suffix = match (column.constraint, dialect) {
            (Constraint::None, _) => String::new(),
            (Constraint::NotNull, _) => " NOT NULL".to_string(),
            (Constraint::PrimaryKey, Dialect::Redshift) => " NOT NULL PRIMARY KEY".to_string(),
            // keys are informational on the cluster, don't enforce them locally
            (Constraint::PrimaryKey, Dialect::DuckDb) => " NOT NULL".to_string(),
            (Constraint::Identity, Dialect::Redshift) => " IDENTITY(0,1) PRIMARY KEY".to_string(),
            (Constraint::Identity, Dialect::DuckDb) => {
                format!(" DEFAULT nextval('{}')", self.sequence_name())
            }
        };
        format!("    {} {}{}", column.name, typ, suffix)
    }

    fn render_layout(&self) -> String {
        let mut layout = String::new();
        match self.dist_style {
            DistStyle::Auto => {}
            DistStyle::Key(c) => layout.push_str(&format!("\nDISTKEY ({})", c)),
            DistStyle::All => layout.push_str("\nDISTSTYLE ALL"),
        }
        match self.sort_key {
            SortKey::None => {}
            SortKey::Single(c) => layout.push_str(&format!("\nSORTKEY ({})", c)),
            SortKey::Compound(cs) => {
                layout.push_str(&format!("\nCOMPOUND SORTKEY ({})", cs.iter().join(", ")))
            }
        }
        layout
    }

    pub fn create_sql(&self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| self.render_column(c, dialect))
            .join(",\n");
        let mut sql = String::new();
        if dialect == Dialect::DuckDb && self.has_identity() {
            sql.push_str(&format!(
                "CREATE SEQUENCE IF NOT EXISTS {} START 1;\n",
                self.sequence_name()
            ));
        }
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            self.table.name(),
            columns
        ));
        if dialect == Dialect::Redshift {
            sql.push_str(&self.render_layout());
        }
        sql.push(';');
        sql
    }

    pub fn drop_sql(&self, dialect: Dialect) -> String {
        let mut sql = format!("DROP TABLE IF EXISTS {};", self.table.name());
        if dialect == Dialect::DuckDb && self.has_identity() {
            sql.push_str(&format!("\nDROP SEQUENCE IF EXISTS {};", self.sequence_name()));
        }
        sql
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn songplays_redshift() {
        let sql = table_def(Table::Songplays).create_sql(Dialect::Redshift);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS songplays (\n"));
        assert!(sql.contains("    songplay_id INTEGER IDENTITY(0,1) PRIMARY KEY,\n"));
        assert!(sql.ends_with("\nDISTKEY (song_id)\nCOMPOUND SORTKEY (song_id, artist_id);"));
    }

    #[test]
    fn layout_hints() {
        let users = table_def(Table::Users).create_sql(Dialect::Redshift);
        assert!(users.contains("    user_id INTEGER NOT NULL PRIMARY KEY,"));
        assert!(users.ends_with("\nDISTSTYLE ALL\nCOMPOUND SORTKEY (first_name, last_name);"));
        let songs = table_def(Table::Songs).create_sql(Dialect::Redshift);
        assert!(songs.ends_with("\nDISTKEY (song_id)\nSORTKEY (artist_id);"));
        let time = table_def(Table::Time).create_sql(Dialect::Redshift);
        assert!(time.ends_with(")\nDISTKEY (start_time);"));
        let staging = table_def(Table::StagingEvents).create_sql(Dialect::Redshift);
        assert!(staging.ends_with("    userId INTEGER\n);"));
        assert!(staging.contains("    length FLOAT,"));
    }

    #[test]
    fn duckdb_has_no_layout_or_keys() {
        for def in Table::ALL.iter().map(|t| table_def(*t)) {
            let sql = def.create_sql(Dialect::DuckDb);
            assert!(!sql.contains("DISTKEY"), "{}", sql);
            assert!(!sql.contains("SORTKEY"), "{}", sql);
            assert!(!sql.contains("PRIMARY KEY"), "{}", sql);
        }
        let songplays = table_def(Table::Songplays);
        assert!(songplays
            .create_sql(Dialect::DuckDb)
            .starts_with("CREATE SEQUENCE IF NOT EXISTS songplays_id_seq START 1;\n"));
        assert_eq!(
            songplays.drop_sql(Dialect::DuckDb),
            "DROP TABLE IF EXISTS songplays;\nDROP SEQUENCE IF EXISTS songplays_id_seq;"
        );
    }

    #[test]
    fn drop_statements() {
        assert_eq!(
            table_def(Table::Time).drop_sql(Dialect::Redshift),
            "DROP TABLE IF EXISTS time;"
        );
        assert_eq!(
            table_def(Table::Songplays).drop_sql(Dialect::Redshift),
            "DROP TABLE IF EXISTS songplays;"
        );
    }
}
