//! # Key Generation
//!
//! Produces the shared-secret string sent with every processing request.
//!
//! A generated key is 56 lowercase hexadecimal characters (224 bits). Keys
//! typed by the user are accepted as-is; the service applies its own checks.
//!
//! Characters are drawn from `rand::thread_rng()`, a general-purpose source.
//! Whether key secrecy requires an OS-backed generator for the real
//! deployment is still open.

use rand::Rng;
use std::fmt;

/// Number of characters in a generated key.
pub const KEY_LENGTH: usize = 56;

const HEX_ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// Key string held by the session and sent once per request.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    /// Accept a key typed by the user, stored exactly as typed.
    /// Returns `None` for blank input.
    pub fn from_user(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key has the generated shape: 56 chars of `[0-9a-f]`.
    pub fn is_canonical(&self) -> bool {
        self.0.len() == KEY_LENGTH && self.0.bytes().all(|b| HEX_ALPHABET.contains(&b))
    }

    /// Short prefix that is safe to log.
    pub fn fingerprint(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{}..({} chars)", prefix, self.0.chars().count())
    }
}

// Keep the full key out of debug output and logs.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyMaterial").field(&self.fingerprint()).finish()
    }
}

/// Generator for fresh [`KeyMaterial`].
pub struct KeyGenerator;

impl KeyGenerator {
    /// Generate a 56-character hex key from the thread-local RNG.
    pub fn generate() -> KeyMaterial {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a key from the given random source.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> KeyMaterial {
        let key: String = (0..KEY_LENGTH)
            .map(|_| HEX_ALPHABET[rng.gen_range(0..HEX_ALPHABET.len())] as char)
            .collect();
        KeyMaterial(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn generated_keys_have_hex_shape() {
        for _ in 0..1000 {
            let key = KeyGenerator::generate();
            assert_eq!(key.as_str().len(), KEY_LENGTH);
            assert!(key
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
            assert!(key.is_canonical());
        }
    }

    #[test]
    fn character_distribution_covers_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<char, usize> = HashMap::new();
        for _ in 0..1000 {
            for c in KeyGenerator::generate_with(&mut rng).as_str().chars() {
                *counts.entry(c).or_insert(0) += 1;
            }
        }

        // 56_000 draws over 16 symbols: 3500 expected per symbol
        assert_eq!(counts.len(), 16);
        for (symbol, count) in counts {
            assert!(
                (3000..4000).contains(&count),
                "symbol {} drawn {} times",
                symbol,
                count
            );
        }
    }

    #[test]
    fn consecutive_keys_differ() {
        assert_ne!(KeyGenerator::generate(), KeyGenerator::generate());
    }

    #[test]
    fn user_keys_are_kept_verbatim() {
        assert!(KeyMaterial::from_user("   ").is_none());
        assert!(KeyMaterial::from_user("").is_none());

        let key = KeyMaterial::from_user(" secret-key ").unwrap();
        assert_eq!(key.as_str(), " secret-key ");
        assert!(!key.is_canonical());
    }

    #[test]
    fn debug_output_hides_key() {
        let key = KeyGenerator::generate();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(key.as_str()));
        assert!(debug.contains("56 chars"));
    }
}
