use rusqlite::params;
use tracing::debug;
use uuid::Uuid;
use warbler_types::User;

use crate::models::{USER_COLUMNS, user_from_row};
use crate::{Database, Result};

impl Database {
    /// Add the edge `follower -> followed`. Following someone twice is a
    /// no-op; following yourself violates the table's CHECK constraint.
    /// Returns whether a new edge was stored.
    pub fn follow(&self, follower: Uuid, followed: Uuid) -> Result<bool> {
        let inserted = self.with_conn(|conn| {
            Ok(conn.execute(
                "INSERT INTO follows (user_being_followed_id, user_following_id)
                 VALUES (?1, ?2)
                 ON CONFLICT (user_being_followed_id, user_following_id) DO NOTHING",
                params![followed.to_string(), follower.to_string()],
            )?)
        })?;

        debug!("{} follows {} (new edge: {})", follower, followed, inserted > 0);
        Ok(inserted > 0)
    }

    /// Remove the edge `follower -> followed` if present.
    pub fn unfollow(&self, follower: Uuid, followed: Uuid) -> Result<bool> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                params![followed.to_string(), follower.to_string()],
            )?)
        })?;

        debug!("{} unfollowed {} (edge removed: {})", follower, followed, removed > 0);
        Ok(removed > 0)
    }

    /// Does `user` follow `other`?
    pub fn is_following(&self, user: Uuid, other: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT EXISTS (
                    SELECT 1 FROM follows
                    WHERE user_being_followed_id = ?1 AND user_following_id = ?2
                 )",
                params![other.to_string(), user.to_string()],
                |row| row.get(0),
            )?)
        })
    }

    /// Is `user` followed by `other`?
    pub fn is_followed_by(&self, user: Uuid, other: Uuid) -> Result<bool> {
        self.is_following(other, user)
    }

    /// Users that `user` follows, by username.
    pub fn following(&self, user: Uuid) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.user_being_followed_id
                 WHERE f.user_following_id = ?1
                 ORDER BY u.username"
            ))?;

            let users = stmt
                .query_map([user.to_string()], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(users)
        })
    }

    /// Users following `user`, by username.
    pub fn followers(&self, user: Uuid) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.user_following_id
                 WHERE f.user_being_followed_id = ?1
                 ORDER BY u.username"
            ))?;

            let users = stmt
                .query_map([user.to_string()], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(users)
        })
    }
}
