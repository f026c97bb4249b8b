use rusqlite::{Connection, params};
use tracing::{debug, info};
use uuid::Uuid;
use warbler_crypto::PasswordScheme;
use warbler_types::{DEFAULT_IMAGE_URL, NewUser, User};

use super::OptionalExt;
use crate::models::{USER_COLUMNS, UserStats, user_from_row};
use crate::{Database, DbError, Result};

impl Database {
    // -- Signup & login --

    /// Hash the password and insert a new user. An empty or missing
    /// password fails before the store is touched; a missing or duplicate
    /// username/email fails at insert time with [`DbError::Integrity`].
    pub fn signup(&self, scheme: &dyn PasswordScheme, new: NewUser) -> Result<User> {
        let password_hash = scheme.hash(new.password.as_deref().unwrap_or_default())?;
        let id = Uuid::new_v4();
        let image_url = new
            .image_url
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

        let user = self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (id, email, username, password, image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id.to_string(), new.email, new.username, password_hash, image_url],
            )?;
            query_user(tx, id)?.ok_or(DbError::NotFound)
        })?;

        info!("Signed up {}", user);
        Ok(user)
    }

    /// The user named `username` if `password` verifies against the stored
    /// hash. Bad credentials are `Ok(None)`, never an error.
    pub fn authenticate(
        &self,
        scheme: &dyn PasswordScheme,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        let Some(user) = self.get_user_by_username(username)? else {
            debug!("Authentication failed: no user {}", username);
            return Ok(None);
        };

        if scheme.verify(password, &user.password) {
            Ok(Some(user))
        } else {
            debug!("Authentication failed: wrong password for {}", username);
            Ok(None)
        }
    }

    // -- Lookup --

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1"),
                [username],
                user_from_row,
            )
            .optional()
        })
    }

    /// All users, or those whose username contains `search`
    /// (case-insensitive), ordered by username.
    pub fn list_users(&self, search: Option<&str>) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE ?1 IS NULL OR instr(lower(u.username), lower(?1)) > 0
                 ORDER BY u.username"
            ))?;

            let users = stmt
                .query_map([search], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(users)
        })
    }

    pub fn user_stats(&self, id: Uuid) -> Result<UserStats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1)",
                [id.to_string()],
                |row| {
                    Ok(UserStats {
                        messages: row.get(0)?,
                        following: row.get(1)?,
                        followers: row.get(2)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }

    // -- Profile --

    /// Persist the mutable profile fields of `user`. The password column is
    /// never written here.
    pub fn save_user(&self, user: &User) -> Result<()> {
        let updated = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users
                 SET email = ?2, username = ?3, image_url = ?4, header_image_url = ?5,
                     bio = ?6, location = ?7
                 WHERE id = ?1",
                params![
                    user.id.to_string(),
                    user.email,
                    user.username,
                    user.image_url,
                    user.header_image_url,
                    user.bio,
                    user.location,
                ],
            )?)
        })?;

        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Delete a user together with their follow edges (both directions) and
    /// messages, in one transaction. Returns whether the user existed.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let id = id.to_string();

        let (edges, messages, users) = self.with_tx(|tx| {
            let edges = tx.execute(
                "DELETE FROM follows WHERE user_following_id = ?1 OR user_being_followed_id = ?1",
                [&id],
            )?;
            let messages = tx.execute("DELETE FROM messages WHERE user_id = ?1", [&id])?;
            let users = tx.execute("DELETE FROM users WHERE id = ?1", [&id])?;
            Ok((edges, messages, users))
        })?;

        if users > 0 {
            info!(
                "Deleted user {} ({} messages, {} follow edges)",
                id, messages, edges
            );
        }
        Ok(users > 0)
    }
}

fn query_user(conn: &Connection, id: Uuid) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
        [id.to_string()],
        user_from_row,
    )
    .optional()
}
