//! Password and access-token hashing
//!
//! Passwords are stored as `SHA-256(salt || password)` with a per-user random
//! salt. Access tokens are opaque UUIDs handed to the client once; only their
//! SHA-256 digest is persisted.

use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generate a random 16-byte salt, hex encoded
pub fn generate_salt() -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    to_hex(&salt)
}

/// Hash a password with the given salt (64 hex chars)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password against a stored hash and salt
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    // Length is fixed, so compare every byte regardless of where they differ
    calculated.len() == expected_hash.len()
        && calculated
            .bytes()
            .zip(expected_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Mint a new opaque access token
pub fn generate_access_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Digest stored in place of the token itself
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_random_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_round_trip() {
        let salt = generate_salt();
        let hash = hash_password("hunter2", &salt);
        assert_eq!(hash.len(), 64);
        assert!(verify_password("hunter2", &salt, &hash));
        assert!(!verify_password("hunter3", &salt, &hash));
        assert!(!verify_password("hunter2", "other-salt", &hash));
    }

    #[test]
    fn test_same_password_differs_per_salt() {
        assert_ne!(hash_password("pw", "s1"), hash_password("pw", "s2"));
    }

    #[test]
    fn test_token_digest_hides_token() {
        let token = generate_access_token();
        assert_eq!(token.len(), 32);
        let digest = token_digest(&token);
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, token);
        assert_eq!(digest, token_digest(&token));
    }
}
