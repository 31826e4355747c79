use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::auth::password::hash_password;

/// Rooms are reference data; ids are stable across boots.
pub const SEED_ROOMS: &[(i64, &str)] = &[(1, "Seedlings"), (2, "Saplings"), (3, "Oaks")];

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS caregivers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        contact_number TEXT UNIQUE NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS kids (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        family_code TEXT UNIQUE NOT NULL,
        room_id INTEGER REFERENCES rooms(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS kid_caregiver (
        kid_id INTEGER NOT NULL REFERENCES kids(id),
        caregiver_id INTEGER NOT NULL REFERENCES caregivers(id),
        PRIMARY KEY (kid_id, caregiver_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sign_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kid_id INTEGER NOT NULL REFERENCES kids(id),
        room_id INTEGER NOT NULL REFERENCES rooms(id),
        caregiver_id INTEGER REFERENCES caregivers(id),
        action TEXT NOT NULL CHECK (action IN ('in', 'out')),
        timestamp TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_sign_events_room_time
    ON sign_events (room_id, timestamp)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teachers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL
    )
    "#,
];

/// Open (creating if needed) the database and make sure the schema exists.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }

    Ok(pool)
}

/// Seed the room list and, when a password is configured, the first teacher.
pub async fn seed(
    pool: &SqlitePool,
    teacher_username: &str,
    teacher_password: Option<&str>,
) -> anyhow::Result<()> {
    for (id, name) in SEED_ROOMS {
        sqlx::query("INSERT OR IGNORE INTO rooms (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    let Some(password) = teacher_password else {
        warn!("SEED_TEACHER_PASSWORD not set, skipping teacher seed");
        return Ok(());
    };

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM teachers WHERE username = ? LIMIT 1)",
    )
    .bind(teacher_username)
    .fetch_one(pool)
    .await?;

    if !exists {
        let hashed = hash_password(password)
            .map_err(|e| anyhow::anyhow!("hashing seed teacher password: {e}"))?;
        sqlx::query("INSERT OR IGNORE INTO teachers (username, password_hash) VALUES (?, ?)")
            .bind(teacher_username)
            .bind(hashed)
            .execute(pool)
            .await?;
        info!(username = teacher_username, "Seeded teacher account");
    }

    Ok(())
}

/// Fresh database in a temporary directory; keep the guard alive for the test.
#[cfg(test)]
pub async fn init_test_db() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = init_db(&url).await.expect("init test db");
    seed(&pool, "teacher", Some("teacherpass"))
        .await
        .expect("seed test db");
    (dir, pool)
}
