mod follows;
mod messages;
mod users;

use crate::{DbError, Result};

/// Number of messages shown on a profile or in the home feed.
pub const PAGE_LIMIT: u32 = 100;

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use warbler_crypto::Argon2Scheme;
    use warbler_types::{NewUser, User};

    use crate::Database;

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn new_user(username: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            username: Some(username.into()),
            email: Some(email.into()),
            password: Some(password.into()),
            image_url: None,
        }
    }

    pub fn signup(db: &Database, username: &str) -> User {
        db.signup(
            &Argon2Scheme::default(),
            new_user(username, &format!("{username}@test.com"), "password"),
        )
        .unwrap()
    }
}
