use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as BASE64};
use rand::Rng;
use subtle::ConstantTimeEq;

/// Generate a random 256-bit token, base64url encoded.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    BASE64.encode(bytes)
}

/// Constant-time token comparison.
pub fn tokens_match(expected: &str, supplied: &str) -> bool {
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}
