use rusqlite::{params, OptionalExtension, Row};

use connect_common::UserId;

use super::{now_timestamp, timestamp_column, Store, StoreError};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, email, name, avatar_url, oauth_provider, oauth_id, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        avatar_url: row.get(3)?,
        oauth_provider: row.get(4)?,
        oauth_id: row.get(5)?,
        created_at: timestamp_column(row, 6)?,
    })
}

impl Store {
    /// Find a user by provider identity, creating it on first login.
    pub fn find_or_create_oauth_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let conn = self.conn()?;

        let existing = conn
            .query_row(
                &format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE oauth_provider = ?1 AND oauth_id = ?2"
                ),
                params![new_user.oauth_provider, new_user.oauth_id],
                user_from_row,
            )
            .optional()?;

        if let Some(user) = existing {
            return Ok(user);
        }

        let user = conn
            .query_row(
                &format!(
                    "INSERT INTO users (email, name, avatar_url, oauth_provider, oauth_id, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     RETURNING {USER_COLUMNS}"
                ),
                params![
                    new_user.email,
                    new_user.name,
                    new_user.avatar_url,
                    new_user.oauth_provider,
                    new_user.oauth_id,
                    now_timestamp(),
                ],
                user_from_row,
            )
            .map_err(StoreError::classify)?;

        tracing::info!("Created new user: {} ({})", user.id, user.email);
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_exists(&self, id: UserId) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let found = conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// All users except `viewer`, newest first.
    pub fn list_users_except(&self, viewer: UserId) -> Result<Vec<User>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id != ?1 ORDER BY created_at DESC, id DESC"
        ))?;
        let users = stmt
            .query_map(params![viewer], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Overwrite name and avatar. Returns `None` if the user does not exist.
    pub fn update_profile(
        &self,
        id: UserId,
        name: &str,
        avatar_url: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!(
                    "UPDATE users SET name = ?1, avatar_url = ?2 WHERE id = ?3 RETURNING {USER_COLUMNS}"
                ),
                params![name, avatar_url, id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }
}
