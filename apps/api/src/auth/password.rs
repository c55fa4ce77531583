use crate::auth::AuthError;

/// Minimum accepted password length at signup.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Salted bcrypt hash of `password`.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Checks `password` against a stored hash. bcrypt compares in constant time.
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}
