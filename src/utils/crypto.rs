// src/utils/crypto.rs
//! Password hashing for wallet accounts.
//!
//! Uses PBKDF2-HMAC-SHA256 from `ring` with a random per-password salt.
//! Hashes are stored as a self-describing string:
//!
//! ```text
//! pbkdf2-sha256$<iterations>$<base64 salt>$<base64 hash>
//! ```

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

use crate::error::WalletError;

const SCHEME: &str = "pbkdf2-sha256";
const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Hashes a password with a freshly generated salt.
///
/// # Errors
/// Returns [`WalletError::PasswordHash`] if the system RNG fails.
pub fn hash_password(password: &str) -> Result<String, WalletError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| WalletError::PasswordHash)?;

    let iterations = NonZeroU32::new(ITERATIONS).ok_or(WalletError::PasswordHash)?;
    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(ALGORITHM, iterations, &salt, password.as_bytes(), &mut hash);

    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        ITERATIONS,
        base64::encode(salt),
        base64::encode(hash)
    ))
}

/// Checks a password against a stored hash string in constant time.
///
/// Malformed hash strings never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }

    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (base64::decode(salt), base64::decode(hash)) else {
        return false;
    };

    pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("student123").unwrap();
        assert!(stored.starts_with("pbkdf2-sha256$100000$"));
        assert!(verify_password("student123", &stored));
        assert!(!verify_password("student124", &stored));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("admin123").unwrap();
        let b = hash_password("admin123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("admin123", ""));
        assert!(!verify_password("admin123", "plaintext"));
        assert!(!verify_password("admin123", "pbkdf2-sha256$0$AAAA$AAAA"));
        assert!(!verify_password("admin123", "bcrypt$10$AAAA$AAAA"));
        assert!(!verify_password("admin123", "pbkdf2-sha256$10$!!$??"));
    }
}
