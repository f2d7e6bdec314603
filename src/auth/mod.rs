//! Authentication primitives
//!
//! Password hashing and bearer token signing. Account-level flows (register,
//! login) live in `services::user`.

pub mod password;
pub mod token;

pub use password::{hash_password, validate_password, verify_password};
pub use token::{Claims, TokenSigner};

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
