use rand::RngCore;
use sha2::{Digest, Sha256};
use time::Duration;

/// How long a reset token stays redeemable.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// Generates the raw reset token: 32 random bytes, hex-encoded. The raw value
/// goes into the emailed link; only its hash is ever stored.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// One-way digest used for storage and lookup of reset tokens.
pub fn hash_reset_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_64_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn hashing_is_deterministic_and_one_way() {
        let raw = generate_reset_token();
        let a = hash_reset_token(&raw);
        let b = hash_reset_token(&raw);
        assert_eq!(a, b);
        assert_ne!(a, raw);
        assert_eq!(a.len(), 64); // sha256 hex
    }

    #[test]
    fn different_tokens_hash_differently() {
        assert_ne!(hash_reset_token("a"), hash_reset_token("b"));
    }
}
