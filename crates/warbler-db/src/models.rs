//! Row mappers between SQLite rows and the `warbler-types` models.
//! Ids are stored as hyphenated UUID text, timestamps as RFC 3339 text.

use chrono::{DateTime, Utc};
use rusqlite::{Row, types::Type};
use uuid::Uuid;
use warbler_types::{AuthoredMessage, Message, User};

/// Column list for `users` aliased as `u`, in [`user_from_row`] order.
pub(crate) const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.password, u.image_url, u.header_image_url, u.bio, u.location";

/// Column list for `messages` aliased as `m`, in [`message_from_row`] order.
pub(crate) const MESSAGE_COLUMNS: &str = "m.id, m.text, m.timestamp, m.user_id";

/// Counters shown on profile and home pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub messages: u64,
    pub following: u64,
    pub followers: u64,
}

pub(crate) fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        image_url: row.get(4)?,
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
    })
}

pub(crate) fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: uuid_at(row, 0)?,
        text: row.get(1)?,
        timestamp: timestamp_at(row, 2)?,
        user_id: uuid_at(row, 3)?,
    })
}

/// Expects [`MESSAGE_COLUMNS`] followed by `u.username, u.image_url`.
pub(crate) fn authored_from_row(row: &Row<'_>) -> rusqlite::Result<AuthoredMessage> {
    Ok(AuthoredMessage {
        message: message_from_row(row)?,
        username: row.get(4)?,
        image_url: row.get(5)?,
    })
}
