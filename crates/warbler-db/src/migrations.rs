use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, messages, follows)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                TEXT PRIMARY KEY,
                email             TEXT NOT NULL UNIQUE,
                username          TEXT NOT NULL UNIQUE,
                password          TEXT NOT NULL,
                image_url         TEXT NOT NULL DEFAULT '/static/images/default-pic.svg',
                header_image_url  TEXT NOT NULL DEFAULT '/static/images/warbler-hero.svg',
                bio               TEXT,
                location          TEXT
            );

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                text        TEXT NOT NULL CHECK (length(text) <= 140),
                timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                user_id     TEXT NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_messages_user
                ON messages(user_id, timestamp);

            CREATE TABLE follows (
                user_being_followed_id  TEXT NOT NULL REFERENCES users(id),
                user_following_id       TEXT NOT NULL REFERENCES users(id),
                PRIMARY KEY (user_being_followed_id, user_following_id),
                CHECK (user_being_followed_id <> user_following_id)
            );

            CREATE INDEX idx_follows_follower
                ON follows(user_following_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
