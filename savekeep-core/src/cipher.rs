//! # Ciphers
//!
//! Symmetric byte transforms applied to serialized records before they are
//! written. The codec is unaware of which cipher is in use; it only knows
//! whether one is configured.

use std::fmt;

use crate::{Result, SaveError};

/// Key used by [`XorCipher::default`].
pub const DEFAULT_XOR_KEY: &str = "word";

/// A symmetric transform over serialized record bytes.
///
/// `decrypt(encrypt(x))` must equal `x`. Implementations should return
/// `SaveError::Cipher` rather than panicking on malformed input, since
/// ciphertext read back from disk may be arbitrary bytes.
pub trait Cipher: Send + Sync + fmt::Debug {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Short identifier used in log output.
    fn name(&self) -> &'static str;
}

/// Repeating-key XOR obfuscation.
///
/// This keeps casual edits out of save files; it is not a confidentiality
/// guarantee. Hosts that need real secrecy plug in their own [`Cipher`].
///
/// # Examples
///
/// ```rust
/// use savekeep_core::cipher::{Cipher, XorCipher};
///
/// let cipher = XorCipher::new("secret").unwrap();
/// let scrambled = cipher.encrypt(b"hello").unwrap();
/// assert_ne!(scrambled, b"hello");
/// assert_eq!(cipher.decrypt(&scrambled).unwrap(), b"hello");
/// ```
#[derive(Clone)]
pub struct XorCipher {
    key: Vec<u8>,
}

impl XorCipher {
    /// Creates a cipher with the given key.
    ///
    /// # Errors
    /// * `SaveError::Cipher` if the key is empty
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(SaveError::cipher("XOR key must not be empty"));
        }
        Ok(Self { key: key.to_vec() })
    }

    fn apply(&self, input: &[u8]) -> Vec<u8> {
        input
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}

impl Default for XorCipher {
    fn default() -> Self {
        Self {
            key: DEFAULT_XOR_KEY.as_bytes().to_vec(),
        }
    }
}

// Keeps the key out of debug output.
impl fmt::Debug for XorCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XorCipher")
            .field("key_len", &self.key.len())
            .finish()
    }
}

impl Cipher for XorCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(self.apply(plaintext))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        Ok(self.apply(ciphertext))
    }

    fn name(&self) -> &'static str {
        "xor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            XorCipher::new(""),
            Err(SaveError::Cipher { .. })
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let cipher = XorCipher::new("hunter2").unwrap();
        let debug = format!("{:?}", cipher);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("key_len"));
    }

    #[test]
    fn test_different_keys_produce_different_bytes() {
        let a = XorCipher::new("alpha").unwrap();
        let b = XorCipher::new("bravo").unwrap();
        let plaintext = br#"{"player_saved_name":"Alice"}"#;

        assert_ne!(a.encrypt(plaintext).unwrap(), b.encrypt(plaintext).unwrap());
    }

    proptest! {
        #[test]
        fn prop_xor_is_an_involution(
            key in proptest::collection::vec(any::<u8>(), 1..32),
            data in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let cipher = XorCipher::new(&key).unwrap();
            let encrypted = cipher.encrypt(&data).unwrap();
            prop_assert_eq!(encrypted.len(), data.len());
            prop_assert_eq!(cipher.decrypt(&encrypted).unwrap(), data);
        }
    }
}
