use rusqlite::{Connection, params};

use bodega_types::models::UserRecord;

use crate::Database;
use crate::error::Result;

impl Database {
    /// Insert when `local_id` is unassigned, update in place otherwise.
    /// Returns the stored record with its id filled in.
    ///
    /// An `active` record displaces whichever row currently holds the
    /// session marker, inside the same transaction.
    pub fn upsert_user(&self, rec: &UserRecord) -> Result<UserRecord> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;

            if rec.active {
                // Clear the marker first; the partial unique index would
                // reject a second active row.
                match rec.local_id {
                    Some(id) => tx.execute(
                        "UPDATE users SET active = 0 WHERE active = 1 AND local_id != ?1",
                        [id],
                    )?,
                    None => tx.execute("UPDATE users SET active = 0 WHERE active = 1", [])?,
                };
            }

            let local_id = match rec.local_id {
                Some(id) => {
                    tx.execute(
                        "UPDATE users
                         SET remote_id = ?1, name = ?2, last_name = ?3, email = ?4,
                             region = ?5, registered_at = ?6, active = ?7, photo_uri = ?8
                         WHERE local_id = ?9",
                        params![
                            rec.remote_id,
                            rec.name,
                            rec.last_name,
                            rec.email,
                            rec.region,
                            rec.registered_at,
                            rec.active,
                            rec.photo_uri,
                            id
                        ],
                    )?;
                    id
                }
                None => {
                    tx.execute(
                        "INSERT INTO users
                             (remote_id, name, last_name, email, region, registered_at, active, photo_uri)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            rec.remote_id,
                            rec.name,
                            rec.last_name,
                            rec.email,
                            rec.region,
                            rec.registered_at,
                            rec.active,
                            rec.photo_uri
                        ],
                    )?;
                    tx.last_insert_rowid()
                }
            };

            tx.commit()?;

            Ok(UserRecord {
                local_id: Some(local_id),
                ..rec.clone()
            })
        })
    }

    /// Case-sensitive exact match; the oldest record wins when duplicates
    /// exist.
    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn user_by_id(&self, local_id: i64) -> Result<Option<UserRecord>> {
        self.with_conn(|conn| query_user_by_id(conn, local_id))
    }

    pub fn delete_user(&self, local_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM users WHERE local_id = ?1", [local_id])?;
            Ok(())
        })
    }

    pub fn all_users(&self) -> Result<Vec<UserRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY local_id"
            ))?;
            let rows = stmt
                .query_map([], read_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn active_user_record(&self) -> Result<Option<UserRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE active = 1"
            ))?;
            stmt.query_row([], read_user).optional()
        })
    }
}

const USER_COLUMNS: &str =
    "local_id, remote_id, name, last_name, email, region, registered_at, active, photo_uri";

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 ORDER BY local_id LIMIT 1"
    ))?;
    stmt.query_row([email], read_user).optional()
}

fn query_user_by_id(conn: &Connection, local_id: i64) -> Result<Option<UserRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE local_id = ?1"
    ))?;
    stmt.query_row([local_id], read_user).optional()
}

fn read_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        local_id: Some(row.get(0)?),
        remote_id: row.get(1)?,
        name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        region: row.get(5)?,
        registered_at: row.get(6)?,
        active: row.get(7)?,
        photo_uri: row.get(8)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
