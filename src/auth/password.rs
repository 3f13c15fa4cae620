//! Password hashing and verification (bcrypt)

use anyhow::Result;
use std::sync::OnceLock;
use uuid::Uuid;

/// Work factor used for newly hashed passwords
pub const PASSWORD_HASH_COST: u32 = 10;

/// Hash a plaintext password with the default cost
pub fn hash_password(plain: &str) -> Result<String> {
    hash_password_with_cost(plain, PASSWORD_HASH_COST)
}

/// Hash a plaintext password with an explicit bcrypt cost
pub fn hash_password_with_cost(plain: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Check a plaintext password against a stored hash
///
/// A malformed stored hash never verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

/// Run a full bcrypt check against a throwaway hash, always `false`
///
/// Used when there is no stored hash to check, so unknown identifiers take
/// as long to reject as a wrong password.
pub fn verify_without_hash(plain: &str) -> bool {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(plain, hash);
    }
    false
}

/// Hash of a random secret, computed once at the default cost
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password(&Uuid::new_v4().to_string()).ok())
        .as_deref()
}
