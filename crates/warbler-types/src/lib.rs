pub mod forms;
pub mod models;

pub use models::{AuthoredMessage, Message, NewUser, ProfileUpdate, User};

/// Avatar shown for users who never picked one.
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.svg";

/// Banner shown on profiles without a custom header.
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.svg";

/// Longest message text the store accepts, in characters.
pub const MAX_MESSAGE_LEN: usize = 140;
