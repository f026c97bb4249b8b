use rusqlite::params;
use tracing::debug;
use uuid::Uuid;
use warbler_types::{AuthoredMessage, Message};

use super::OptionalExt;
use crate::models::{MESSAGE_COLUMNS, authored_from_row, message_from_row};
use crate::{Database, Result};

impl Database {
    /// Store a message for `user_id`. The text length limit is a CHECK
    /// constraint: an over-long text fails here with `DbError::Data`.
    pub fn create_message(&self, user_id: Uuid, text: &str) -> Result<Message> {
        let id = Uuid::new_v4();

        let message = self.with_conn(|conn| {
            Ok(conn.query_row(
                "INSERT INTO messages (id, text, user_id) VALUES (?1, ?2, ?3)
                 RETURNING id, text, timestamp, user_id",
                params![id.to_string(), text, user_id.to_string()],
                message_from_row,
            )?)
        })?;

        debug!("Message {} created by {}", message.id, user_id);
        Ok(message)
    }

    pub fn get_message(&self, id: Uuid) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.id = ?1"),
                [id.to_string()],
                message_from_row,
            )
            .optional()
        })
    }

    pub fn get_authored_message(&self, id: Uuid) -> Result<Option<AuthoredMessage>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS}, u.username, u.image_url
                     FROM messages m JOIN users u ON u.id = m.user_id
                     WHERE m.id = ?1"
                ),
                [id.to_string()],
                authored_from_row,
            )
            .optional()
        })
    }

    /// A user's messages, newest first.
    pub fn messages_for_user(&self, user_id: Uuid, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m
                 WHERE m.user_id = ?1
                 ORDER BY m.timestamp DESC, m.rowid DESC
                 LIMIT ?2"
            ))?;

            let rows = stmt
                .query_map(params![user_id.to_string(), limit], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Messages by `user_id` and everyone they follow, newest first.
    pub fn home_feed(&self, user_id: Uuid, limit: u32) -> Result<Vec<AuthoredMessage>> {
        self.with_conn(|conn| {
            // JOIN users to fetch the author in a single query
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}, u.username, u.image_url
                 FROM messages m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.user_id = ?1
                    OR m.user_id IN (
                        SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                    )
                 ORDER BY m.timestamp DESC, m.rowid DESC
                 LIMIT ?2"
            ))?;

            let rows = stmt
                .query_map(params![user_id.to_string(), limit], authored_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns whether a message was removed. Ownership is the caller's
    /// check.
    pub fn delete_message(&self, id: Uuid) -> Result<bool> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id.to_string()])?)
        })?;

        debug!("Message {} deleted: {}", id, removed > 0);
        Ok(removed > 0)
    }
}
