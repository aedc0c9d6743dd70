//! Database row types. These map directly to SQLite rows and are kept
//! apart from the wire `User` so the schema can drift independently.

use anyhow::{Context, Result};
use chatapp_types::User;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub avatar: String,
    pub uuid: String,
    pub created_at: String,
    pub stored_at: String,
}

impl StoredUserRow {
    pub fn into_user(self) -> Result<User> {
        let uuid: Uuid = self
            .uuid
            .parse()
            .with_context(|| format!("stored user {} has malformed uuid {}", self.username, self.uuid))?;
        Ok(User::new(
            self.id,
            self.username,
            self.password,
            self.name,
            self.avatar,
            uuid,
            self.created_at,
        ))
    }
}
