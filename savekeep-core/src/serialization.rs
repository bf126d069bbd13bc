//! # Record Codec
//!
//! Turns records into the bytes stored on disk and back.
//!
//! Every stored record is wrapped in a small envelope so that a reader can
//! tell a valid record apart from arbitrary bytes:
//!
//! ```text
//! +-------+---------+-------+----------------+-----------------------+
//! | magic | version | flags | crc32 (LE u32) | payload               |
//! | SKPF  | 1 byte  | 1 byte| of plaintext   | JSON, ciphered if set |
//! +-------+---------+-------+----------------+-----------------------+
//! ```
//!
//! The checksum covers the plaintext JSON, so a wrong cipher key is caught
//! as a checksum mismatch rather than surfacing as a confusing parse error.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::cipher::Cipher;
use crate::{Result, SaveError};

pub const ENVELOPE_MAGIC: &[u8; 4] = b"SKPF";
pub const ENVELOPE_VERSION: u8 = 1;
pub const ENVELOPE_HEADER_LEN: usize = 4 + 1 + 1 + 4;

const FLAG_ENCRYPTED: u8 = 0b0000_0001;

/// How the record payload is rendered before ciphering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializationFormat {
    /// Compact JSON
    #[default]
    Json,
    /// Indented JSON, easier to inspect by hand when encryption is off
    PrettyJson,
}

/// Encodes and decodes records inside the savekeep envelope.
///
/// # Examples
///
/// ```rust
/// use savekeep_core::{GameData, RecordCodec};
///
/// let codec = RecordCodec::json();
/// let bytes = codec.encode(&GameData::new("Alice")).unwrap();
/// let decoded: GameData = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.player_saved_name(), "Alice");
///
/// assert!(codec.decode::<GameData>(b"not a save file").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordCodec {
    format: SerializationFormat,
    cipher: Option<Arc<dyn Cipher>>,
}

impl RecordCodec {
    pub fn new(format: SerializationFormat, cipher: Option<Arc<dyn Cipher>>) -> Self {
        Self { format, cipher }
    }

    /// Create a compact JSON codec without encryption
    pub fn json() -> Self {
        Self::default()
    }

    pub fn with_cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn with_format(mut self, format: SerializationFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn format(&self) -> SerializationFormat {
        self.format
    }

    /// Serialize, cipher and frame a record.
    pub fn encode<T: Serialize>(&self, record: &T) -> Result<Vec<u8>> {
        let plaintext = match self.format {
            SerializationFormat::Json => serde_json::to_vec(record)?,
            SerializationFormat::PrettyJson => serde_json::to_vec_pretty(record)?,
        };
        let checksum = crc32fast::hash(&plaintext);

        let (flags, payload) = match &self.cipher {
            Some(cipher) => (FLAG_ENCRYPTED, cipher.encrypt(&plaintext)?),
            None => (0, plaintext),
        };

        let mut buffer = Vec::with_capacity(ENVELOPE_HEADER_LEN + payload.len());
        buffer.extend_from_slice(ENVELOPE_MAGIC);
        buffer.push(ENVELOPE_VERSION);
        buffer.push(flags);
        buffer.extend_from_slice(&checksum.to_le_bytes());
        buffer.extend_from_slice(&payload);
        Ok(buffer)
    }

    /// Unframe, decipher, verify and deserialize a record.
    ///
    /// Every failure here is a corruption-class error (see
    /// [`SaveError::is_corruption`]).
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.len() < ENVELOPE_HEADER_LEN {
            return Err(SaveError::corrupted(format!(
                "record is {} bytes, shorter than the {} byte header",
                bytes.len(),
                ENVELOPE_HEADER_LEN
            )));
        }

        let (header, payload) = bytes.split_at(ENVELOPE_HEADER_LEN);
        if &header[0..4] != ENVELOPE_MAGIC {
            return Err(SaveError::corrupted("missing record magic"));
        }

        let version = header[4];
        if version != ENVELOPE_VERSION {
            return Err(SaveError::corrupted(format!(
                "unsupported record version {}",
                version
            )));
        }

        let encrypted = header[5] & FLAG_ENCRYPTED != 0;
        let expected = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);

        let plaintext = match (&self.cipher, encrypted) {
            (Some(cipher), true) => cipher.decrypt(payload)?,
            (None, false) => payload.to_vec(),
            (Some(_), false) => {
                return Err(SaveError::cipher(
                    "record is stored in plaintext but encryption is enabled",
                ))
            }
            (None, true) => {
                return Err(SaveError::cipher(
                    "record is encrypted but encryption is disabled",
                ))
            }
        };

        let actual = crc32fast::hash(&plaintext);
        if actual != expected {
            return Err(SaveError::ChecksumMismatch { expected, actual });
        }

        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::XorCipher;
    use crate::{GameData, PlayerData};

    fn sample() -> GameData {
        let mut data = GameData::new("Alice");
        data.sections.set("level", &3u32).unwrap();
        data.touch();
        data
    }

    #[test]
    fn test_plain_payload_is_readable_json() {
        let codec = RecordCodec::json().with_format(SerializationFormat::PrettyJson);
        let bytes = codec.encode(&sample()).unwrap();

        let body = std::str::from_utf8(&bytes[ENVELOPE_HEADER_LEN..]).unwrap();
        assert!(body.contains("\"player_saved_name\": \"Alice\""));
        assert_eq!(&bytes[0..4], ENVELOPE_MAGIC);
    }

    #[test]
    fn test_encrypted_round_trip_hides_plaintext() {
        let codec = RecordCodec::json().with_cipher(Arc::new(XorCipher::default()));
        let record = sample();
        let bytes = codec.encode(&record).unwrap();

        assert!(!bytes
            .windows(5)
            .any(|window| window == b"Alice"));
        assert_eq!(codec.decode::<GameData>(&bytes).unwrap(), record);
    }

    #[test]
    fn test_wrong_key_is_checksum_mismatch() {
        let writer = RecordCodec::json().with_cipher(Arc::new(XorCipher::new("one").unwrap()));
        let reader = RecordCodec::json().with_cipher(Arc::new(XorCipher::new("two").unwrap()));

        let bytes = writer.encode(&sample()).unwrap();
        let err = reader.decode::<GameData>(&bytes).unwrap_err();
        assert!(matches!(err, SaveError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_encryption_mismatch_is_rejected() {
        let plain = RecordCodec::json();
        let encrypted = RecordCodec::json().with_cipher(Arc::new(XorCipher::default()));

        let plain_bytes = plain.encode(&sample()).unwrap();
        let encrypted_bytes = encrypted.encode(&sample()).unwrap();

        assert!(encrypted.decode::<GameData>(&plain_bytes).unwrap_err().is_corruption());
        assert!(plain.decode::<GameData>(&encrypted_bytes).unwrap_err().is_corruption());
    }

    #[test]
    fn test_damaged_bytes_are_corruption() {
        let codec = RecordCodec::json();
        let mut bytes = codec.encode(&sample()).unwrap();

        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(codec.decode::<GameData>(&bytes).unwrap_err().is_corruption());

        for garbage in [&b""[..], b"SKPF", b"XXXX\x01\x00\x00\x00\x00\x00{}"] {
            assert!(codec.decode::<GameData>(garbage).unwrap_err().is_corruption());
        }
    }

    #[test]
    fn test_unknown_version_rejected() {
        let codec = RecordCodec::json();
        let mut bytes = codec.encode(&PlayerData::new()).unwrap();
        bytes[4] = ENVELOPE_VERSION + 1;

        let err = codec.decode::<PlayerData>(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported record version"));
    }
}
