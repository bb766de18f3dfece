use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            local_id      INTEGER PRIMARY KEY AUTOINCREMENT,
            remote_id     INTEGER,
            name          TEXT NOT NULL,
            last_name     TEXT NOT NULL,
            email         TEXT NOT NULL,
            region        TEXT NOT NULL,
            registered_at TEXT NOT NULL,
            active        INTEGER NOT NULL DEFAULT 0,
            photo_uri     TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_users_email
            ON users(email);

        -- The session marker is a single row; the partial index makes the
        -- at-most-one-active invariant a hard constraint.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_active
            ON users(active) WHERE active = 1;
        ",
    )?;

    info!("Account database migrations complete");
    Ok(())
}
