/// Warbler Crypto Library
///
/// Password hashing sits behind [`PasswordScheme`] so the algorithm can be
/// swapped without touching the store or the auth handlers. Argon2id is the
/// only scheme today.
///
/// Also provides the random tokens that bind submitted forms to a session.

pub mod password;
pub mod token;

pub use password::{Argon2Scheme, PasswordError, PasswordScheme};
