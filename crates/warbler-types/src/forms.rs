use serde::Deserialize;

use crate::models::{NewUser, ProfileUpdate};

// Browsers submit untouched inputs as empty strings. Every form treats a
// blank field the same as a missing one.
fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

// -- Auth --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

impl SignupForm {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            username: non_empty(self.username),
            email: non_empty(self.email),
            // Passwords are taken verbatim; only a fully empty one is missing.
            password: self.password.filter(|p| !p.is_empty()),
            image_url: non_empty(self.image_url),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub text: Option<String>,
}

impl MessageForm {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

// -- Profile --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub password: String,
}

impl ProfileForm {
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            username: non_empty(self.username.clone()),
            email: non_empty(self.email.clone()),
            image_url: non_empty(self.image_url.clone()),
            header_image_url: non_empty(self.header_image_url.clone()),
            bio: non_empty(self.bio.clone()),
            location: non_empty(self.location.clone()),
        }
    }
}

// -- Search --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserSearch {
    pub q: Option<String>,
}

impl UserSearch {
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}
