use crate::Database;
use crate::models::StoredUserRow;
use anyhow::Result;
use chatapp_types::User;
use rusqlite::Connection;
use tracing::{debug, info};

const SELECT_STORED_USER: &str =
    "SELECT id, username, password, name, avatar, uuid, created_at, stored_at FROM stored_users";

impl Database {
    // -- Current user --

    /// Replace whatever is stored with `user`. At most one row survives.
    pub fn save_current_user(&self, user: &User) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let cleared = tx.execute("DELETE FROM stored_users", [])?;
            tx.execute(
                "INSERT INTO stored_users (id, username, password, name, avatar, uuid, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    user.id,
                    user.username,
                    user.password,
                    user.name,
                    user.avatar,
                    user.uuid.to_string(),
                    user.created_at,
                ],
            )?;
            tx.commit()?;

            info!("Stored current user {} (replaced {})", user.username, cleared);
            Ok(())
        })
    }

    /// Most recently stored user, if any.
    pub fn load_current_user(&self) -> Result<Option<User>> {
        let row = self.with_conn(query_latest_stored_user)?;
        row.map(StoredUserRow::into_user).transpose()
    }

    pub fn fetch_stored_users(&self) -> Result<Vec<User>> {
        self.with_conn(query_stored_users)?
            .into_iter()
            .map(StoredUserRow::into_user)
            .collect()
    }

    pub fn fetch_stored_rows(&self) -> Result<Vec<StoredUserRow>> {
        self.with_conn(query_stored_users)
    }

    /// Returns the number of rows removed.
    pub fn delete_all(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM stored_users", [])?;
            debug!("Deleted {} stored user(s)", removed);
            Ok(removed)
        })
    }

    /// Remove rows matching all three of username, password and uuid.
    pub fn delete_user(&self, username: &str, password: &str, uuid: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM stored_users WHERE username = ?1 AND password = ?2 AND uuid = ?3",
                (username, password, uuid),
            )?;
            debug!("Deleted {} stored row(s) for {}", removed, username);
            Ok(removed)
        })
    }
}

// -- Query helpers (operate on a borrowed connection) --

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredUserRow> {
    Ok(StoredUserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        avatar: row.get(4)?,
        uuid: row.get(5)?,
        created_at: row.get(6)?,
        stored_at: row.get(7)?,
    })
}

fn query_latest_stored_user(conn: &Connection) -> Result<Option<StoredUserRow>> {
    let mut stmt = conn.prepare(&format!("{SELECT_STORED_USER} ORDER BY row_id DESC LIMIT 1"))?;
    let row = stmt.query_row([], map_row).optional()?;
    Ok(row)
}

fn query_stored_users(conn: &Connection) -> Result<Vec<StoredUserRow>> {
    let mut stmt = conn.prepare(&format!("{SELECT_STORED_USER} ORDER BY row_id"))?;
    let rows = stmt
        .query_map([], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
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

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(username: &str, password: &str) -> User {
        User::new("1", username, password, "Display", "https://a/b.png", Uuid::new_v4(), "2024-10-08 09:12:41.102")
    }

    #[test]
    fn empty_store_has_no_current_user() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_current_user().unwrap(), None);
        assert!(db.fetch_stored_users().unwrap().is_empty());
    }

    #[test]
    fn save_keeps_at_most_one_row() {
        let db = Database::open_in_memory().unwrap();
        let first = user("Ajs", "S@thish25");
        let second = user("A_JS_H", "pw");

        db.save_current_user(&first).unwrap();
        db.save_current_user(&second).unwrap();

        let stored = db.fetch_stored_users().unwrap();
        assert_eq!(stored, vec![second.clone()]);
        assert_eq!(db.load_current_user().unwrap(), Some(second));
    }

    #[test]
    fn stored_row_keeps_every_field() {
        let db = Database::open_in_memory().unwrap();
        let original = user("Ajs", "S@thish25");
        db.save_current_user(&original).unwrap();

        let rows = db.fetch_stored_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].uuid, original.uuid.to_string());
        assert!(!rows[0].stored_at.is_empty());
        assert_eq!(rows[0].clone().into_user().unwrap(), original);
    }

    #[test]
    fn delete_user_needs_all_three_keys() {
        let db = Database::open_in_memory().unwrap();
        let stored = user("Ajs", "S@thish25");
        db.save_current_user(&stored).unwrap();
        let uuid = stored.uuid.to_string();

        assert_eq!(db.delete_user("Ajs", "wrong", &uuid).unwrap(), 0);
        assert_eq!(db.delete_user("Ajs", "S@thish25", &Uuid::new_v4().to_string()).unwrap(), 0);
        assert_eq!(db.delete_user("Ajs", "S@thish25", &uuid).unwrap(), 1);
        assert_eq!(db.load_current_user().unwrap(), None);
    }

    #[test]
    fn delete_all_reports_count() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.delete_all().unwrap(), 0);
        db.save_current_user(&user("Ajs", "S@thish25")).unwrap();
        assert_eq!(db.delete_all().unwrap(), 1);
    }

    #[test]
    fn malformed_uuid_is_an_error_not_a_panic() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO stored_users (id, username, password, name, avatar, uuid, created_at)
                 VALUES ('1', 'Ajs', 'pw', 'n', 'a', 'not-a-uuid', 'c')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let err = db.load_current_user().unwrap_err();
        assert!(err.to_string().contains("malformed uuid"));
    }

    #[test]
    fn current_user_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatapp.db");
        let stored = user("Ajs", "S@thish25");

        Database::open(&path).unwrap().save_current_user(&stored).unwrap();
        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.load_current_user().unwrap(), Some(stored));
    }
}
