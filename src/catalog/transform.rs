use super::Table;

// Fact rows only exist for events whose artist matches a song's artist name
// exactly, case included.
const SONGPLAYS_INSERT: &str = r#"
INSERT INTO songplays (start_time, user_id, song_id, artist_id, session_id, location, user_agent)
SELECT log.ts, log.userId, song.song_id, song.artist_id, log.sessionId, log.location, log.userAgent
FROM staging_songs song
JOIN staging_events log ON (song.artist_name = log.artist);"#;

const USERS_INSERT: &str = r#"
INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT DISTINCT userId, firstName, lastName, gender, level
FROM staging_events
WHERE userId IS NOT NULL;"#;

const SONGS_INSERT: &str = r#"
INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT song_id, title, artist_id, year, duration
FROM staging_songs
WHERE song_id IS NOT NULL;"#;

const ARTISTS_INSERT: &str = r#"
INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT DISTINCT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
FROM staging_songs
WHERE artist_id IS NOT NULL;"#;

const TIME_INSERT: &str = r#"
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT ts AS start_time,
    EXTRACT(HOUR FROM ts) AS hour,
    EXTRACT(DAY FROM ts) AS day,
    CAST(EXTRACT(WEEK FROM ts) AS VARCHAR) AS week,
    EXTRACT(MONTH FROM ts) AS month,
    EXTRACT(YEAR FROM ts) AS year,
    CAST(EXTRACT(WEEKDAY FROM ts) AS VARCHAR) AS weekday
FROM staging_events
WHERE ts IS NOT NULL;"#;

/// The insert-select that fills a final table from the staging tables, or
/// `None` for staging tables.  The SQL is the same for every dialect.
pub fn insert_sql(table: Table) -> Option<&'static str> {
    use Table::*;
    let sql = match table {
        Songplays => SONGPLAYS_INSERT,
        Users => USERS_INSERT,
        Songs => SONGS_INSERT,
        Artists => ARTISTS_INSERT,
        Time => TIME_INSERT,
        StagingEvents | StagingSongs => return None,
    };
    Some(sql.trim_start())
}
