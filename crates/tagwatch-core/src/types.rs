//! Core tag and modulation types.

use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum identifier length in bytes (per ISO 14443 specification).
pub const MAX_UID_LENGTH: usize = 10;

/// Tag unique identifier (0-10 bytes, reader-defined).
///
/// The reader reports however many identifier bytes the target answered
/// with; single-size readers commonly produce 4 or 7 bytes, and the ISO
/// 14443 upper bound is 10. An empty identifier is legal - some targets
/// answer the selection handshake before a uid is available.
///
/// # Examples
///
/// ```
/// use tagwatch_core::TagUid;
///
/// let uid = TagUid::new(vec![0x04, 0x9A, 0x3B, 0x01]).unwrap();
/// assert_eq!(uid.len(), 4);
/// assert_eq!(uid.to_hex(), "049A3B01");
///
/// assert!(TagUid::new(vec![0u8; 11]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagUid(Vec<u8>);

impl TagUid {
    /// Create a new tag identifier with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UidTooLong`] if the byte sequence exceeds
    /// [`MAX_UID_LENGTH`].
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() > MAX_UID_LENGTH {
            return Err(Error::UidTooLong {
                len: bytes.len(),
                max: MAX_UID_LENGTH,
            });
        }
        Ok(TagUid(bytes))
    }

    /// The empty identifier.
    #[must_use]
    pub fn empty() -> Self {
        TagUid(Vec::new())
    }

    /// Get the raw identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the identifier and return the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Identifier length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the reader reported no identifier bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the identifier as an uppercase hexadecimal string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join("")
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<Vec<u8>> for TagUid {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        TagUid::new(bytes)
    }
}

impl TryFrom<&[u8]> for TagUid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        TagUid::new(bytes.to_vec())
    }
}

/// NFC modulation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ModulationKind {
    /// ISO 14443 Type A (Mifare family).
    Iso14443a,

    /// ISO 14443 Type B.
    Iso14443b,

    /// Sony FeliCa.
    Felica,
}

impl fmt::Display for ModulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModulationKind::Iso14443a => write!(f, "ISO14443A"),
            ModulationKind::Iso14443b => write!(f, "ISO14443B"),
            ModulationKind::Felica => write!(f, "FeliCa"),
        }
    }
}

/// NFC baud rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BaudRate {
    /// 106 kbit/s.
    Baud106,

    /// 212 kbit/s.
    Baud212,

    /// 424 kbit/s.
    Baud424,
}

impl BaudRate {
    /// The rate in bits per second.
    #[must_use]
    pub fn bits_per_second(&self) -> u32 {
        match self {
            BaudRate::Baud106 => 106_000,
            BaudRate::Baud212 => 212_000,
            BaudRate::Baud424 => 424_000,
        }
    }
}

/// Modulation a target answers on: type plus baud rate.
///
/// The detection core carries this value without interpreting it; it is
/// chosen when polling starts and reported back with each selected target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modulation {
    /// Modulation type.
    pub kind: ModulationKind,

    /// Baud rate.
    pub baud_rate: BaudRate,
}

impl Modulation {
    /// Default polling modulation: ISO 14443 Type A at 106 kbit/s, the
    /// modulation Mifare-family tags answer on.
    pub const MIFARE: Modulation = Modulation {
        kind: ModulationKind::Iso14443a,
        baud_rate: BaudRate::Baud106,
    };
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}bps", self.kind, self.baud_rate.bits_per_second())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(7)]
    #[case(10)]
    fn test_uid_valid_lengths(#[case] len: usize) {
        let uid = TagUid::new(vec![0xAB; len]).unwrap();
        assert_eq!(uid.len(), len);
    }

    #[rstest]
    #[case(11)]
    #[case(32)]
    fn test_uid_too_long(#[case] len: usize) {
        let result = TagUid::new(vec![0xAB; len]);
        assert!(matches!(result, Err(Error::UidTooLong { .. })));
    }

    #[test]
    fn test_uid_hex() {
        let uid = TagUid::new(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
        assert_eq!(uid.to_hex(), "04ABCDEF");
        assert_eq!(uid.to_string(), "04ABCDEF");
    }

    #[test]
    fn test_uid_empty() {
        let uid = TagUid::empty();
        assert!(uid.is_empty());
        assert_eq!(uid.to_hex(), "");
    }

    #[test]
    fn test_uid_try_from_slice() {
        let bytes: &[u8] = &[0x01, 0x02, 0x03, 0x04];
        let uid = TagUid::try_from(bytes).unwrap();
        assert_eq!(uid.as_bytes(), bytes);
    }

    #[test]
    fn test_uid_serde_round_trip() {
        let uid = TagUid::new(vec![0x04, 0x9A, 0x3B, 0x01]).unwrap();
        let json = serde_json::to_string(&uid).unwrap();
        let back: TagUid = serde_json::from_str(&json).unwrap();
        assert_eq!(uid, back);
    }

    #[test]
    fn test_mifare_modulation() {
        assert_eq!(Modulation::MIFARE.kind, ModulationKind::Iso14443a);
        assert_eq!(Modulation::MIFARE.baud_rate, BaudRate::Baud106);
        assert_eq!(Modulation::MIFARE.to_string(), "ISO14443A/106000bps");
    }

    #[test]
    fn test_baud_rates() {
        assert_eq!(BaudRate::Baud106.bits_per_second(), 106_000);
        assert_eq!(BaudRate::Baud212.bits_per_second(), 212_000);
        assert_eq!(BaudRate::Baud424.bits_per_second(), 424_000);
    }
}
