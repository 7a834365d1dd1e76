use itertools::Itertools;

use super::{schema::table_def, Table};
use crate::{
    config::{DwhConfig, REGION},
    db::warehouse::Dialect,
};

/// Render a trusted config value as a SQL string literal.
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Field types of the event log files, in staging column order.
const EVENT_FIELDS: &[(&str, &str)] = &[
    ("artist", "VARCHAR"),
    ("auth", "VARCHAR"),
    ("firstName", "VARCHAR"),
    ("gender", "VARCHAR"),
    ("itemInSession", "INTEGER"),
    ("lastName", "VARCHAR"),
    ("length", "DOUBLE"),
    ("level", "VARCHAR"),
    ("location", "VARCHAR"),
    ("method", "VARCHAR"),
    ("page", "VARCHAR"),
    ("registration", "DOUBLE"),
    ("sessionId", "INTEGER"),
    ("song", "VARCHAR"),
    ("status", "INTEGER"),
    ("ts", "BIGINT"),
    ("userAgent", "VARCHAR"),
    ("userId", "VARCHAR"),
];

const SONG_FIELDS: &[(&str, &str)] = &[
    ("artist_id", "VARCHAR"),
    ("artist_latitude", "DOUBLE"),
    ("artist_location", "VARCHAR"),
    ("artist_longitude", "DOUBLE"),
    ("artist_name", "VARCHAR"),
    ("duration", "DOUBLE"),
    ("num_songs", "INTEGER"),
    ("song_id", "VARCHAR"),
    ("title", "VARCHAR"),
    ("year", "INTEGER"),
];

fn json_columns(fields: &[(&str, &str)]) -> String {
    let inner = fields
        .iter()
        .map(|(name, typ)| format!("{}: {}", literal(name), literal(typ)))
        .join(", ");
    format!("{{{}}}", inner)
}

/// The statement that fills a staging table from its source, or `None` for
/// tables that are not staged.
pub fn copy_sql(table: Table, config: &DwhConfig, dialect: Dialect) -> Option<String> {
    let s3 = &config.s3;
    let arn = &config.iam_role.arn;
    let sql = match (table, dialect) {
        (Table::StagingEvents, Dialect::Redshift) => format!(
            r#"
COPY staging_events FROM {}
IAM_ROLE {}
JSON {}
REGION {}
TIMEFORMAT AS 'epochmillisecs';"#,
            literal(&s3.log_data),
            literal(arn),
            literal(&s3.log_jsonpath),
            literal(REGION)
        ),
        (Table::StagingSongs, Dialect::Redshift) => format!(
            r#"
COPY staging_songs FROM {}
IAM_ROLE {}
REGION {}
FORMAT AS JSON 'auto';"#,
            literal(&s3.song_data),
            literal(arn),
            literal(REGION)
        ),
        // local files: epoch millis become timestamps, empty user ids become NULL
        (Table::StagingEvents, Dialect::DuckDb) => format!(
            r#"
INSERT INTO staging_events
SELECT
    artist, auth, firstName, gender, itemInSession, lastName, length, level,
    location, method, page, registration, sessionId, song, status,
    epoch_ms(ts) AS ts,
    userAgent,
    TRY_CAST(NULLIF(userId, '') AS INTEGER) AS userId
FROM read_json({}, columns = {});"#,
            literal(&s3.log_data),
            json_columns(EVENT_FIELDS)
        ),
        (Table::StagingSongs, Dialect::DuckDb) => format!(
            r#"
INSERT INTO staging_songs
SELECT {}
FROM read_json({}, columns = {});"#,
            table_def(Table::StagingSongs).column_names().join(", "),
            literal(&s3.song_data),
            json_columns(SONG_FIELDS)
        ),
        _ => return None,
    };
    Some(sql.trim_start().to_string())
}
