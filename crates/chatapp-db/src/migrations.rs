use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS stored_users (
            row_id      INTEGER PRIMARY KEY AUTOINCREMENT,
            id          TEXT NOT NULL,
            username    TEXT NOT NULL,
            password    TEXT NOT NULL,
            name        TEXT NOT NULL,
            avatar      TEXT NOT NULL,
            uuid        TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            stored_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_stored_users_login
            ON stored_users(username, password, uuid);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
