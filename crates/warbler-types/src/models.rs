use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. `password` is always the stored hash, never the
/// raw password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl User {
    /// Apply a partial profile update in memory. Nothing is validated here;
    /// uniqueness is checked when the user is saved.
    pub fn update_info(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            username,
            email,
            image_url,
            header_image_url,
            bio,
            location,
        } = update;

        if let Some(username) = username {
            self.username = username;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(image_url) = image_url {
            self.image_url = image_url;
        }
        if let Some(header_image_url) = header_image_url {
            self.header_image_url = header_image_url;
        }
        if bio.is_some() {
            self.bio = bio;
        }
        if location.is_some() {
            self.location = location;
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

/// Signup input. Fields are optional because they come straight from a
/// form; the store rejects whatever is missing.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

/// Fields replaced by [`User::update_info`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Uuid,
}

impl Message {
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.user_id == user.id
    }
}

/// A message joined with the author fields the pages display.
#[derive(Debug, Clone, Serialize)]
pub struct AuthoredMessage {
    pub message: Message,
    pub username: String,
    pub image_url: String,
}
