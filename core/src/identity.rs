//! 32-byte public keys and their 60-letter textual identity form.
//!
//! An identity is four groups of 14 base-26 letters, one group per
//! little-endian 64-bit limb of the key (least significant letter first),
//! followed by 4 checksum letters taken from the low 18 bits of the key's
//! digest. Identities are uppercase; transaction ids reuse the same encoding
//! in lowercase.

use std::fmt;
use std::str::FromStr;

use crate::crypto;
use crate::error::IdentityError;

/// Length of a textual identity.
pub const IDENTITY_LEN: usize = 60;

const LIMBS: usize = 4;
const LETTERS_PER_LIMB: usize = 14;
const CHECKSUM_LETTERS: usize = 4;
const CHECKSUM_MASK: u32 = 0x3_FFFF;
const RADIX: u64 = 26;

/// A 32-byte public key as it appears on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// The all-zero key, used as "no designated acceptor".
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse an uppercase identity, verifying its checksum.
    pub fn from_identity(text: &str) -> Result<Self, IdentityError> {
        decode_identity(text, false).map(Self)
    }

    /// Uppercase 60-letter identity of this key.
    pub fn to_identity(&self) -> String {
        encode_identity(&self.0, false)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_identity())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identity(s)
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_identity())
    }
}

#[cfg(feature = "json")]
impl<'de> serde::Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::from_identity(&text).map_err(serde::de::Error::custom)
    }
}

/// Encode 32 bytes as identity text.
pub fn encode_identity(bytes: &[u8; 32], lowercase: bool) -> String {
    let base = if lowercase { b'a' } else { b'A' };
    let mut out = String::with_capacity(IDENTITY_LEN);

    for limb in 0..LIMBS {
        let mut chunk = [0u8; 8];
        chunk.copy_from_slice(&bytes[limb * 8..(limb + 1) * 8]);
        let mut value = u64::from_le_bytes(chunk);
        for _ in 0..LETTERS_PER_LIMB {
            out.push(char::from(base + (value % RADIX) as u8));
            value /= RADIX;
        }
    }

    let mut checksum = checksum(bytes);
    for _ in 0..CHECKSUM_LETTERS {
        out.push(char::from(base + (checksum % RADIX as u32) as u8));
        checksum /= RADIX as u32;
    }
    out
}

/// Decode identity text back into 32 bytes.
///
/// # Errors
///
/// Fails on a wrong length, a letter outside the expected case,
/// a limb exceeding 64 bits, or a checksum mismatch.
pub fn decode_identity(text: &str, lowercase: bool) -> Result<[u8; 32], IdentityError> {
    let letters = text.as_bytes();
    if letters.len() != IDENTITY_LEN {
        return Err(IdentityError::Length {
            expected: IDENTITY_LEN,
            actual: text.chars().count(),
        });
    }
    let base = if lowercase { b'a' } else { b'A' };
    let digit = |c: u8| -> Result<u64, IdentityError> {
        if (base..base + RADIX as u8).contains(&c) {
            Ok(u64::from(c - base))
        } else {
            Err(IdentityError::Character(char::from(c)))
        }
    };

    let mut bytes = [0u8; 32];
    for limb in 0..LIMBS {
        let group = &letters[limb * LETTERS_PER_LIMB..(limb + 1) * LETTERS_PER_LIMB];
        let mut value = 0u64;
        for &c in group.iter().rev() {
            let d = digit(c)?;
            value = value
                .checked_mul(RADIX)
                .and_then(|v| v.checked_add(d))
                .ok_or(IdentityError::Overflow)?;
        }
        bytes[limb * 8..(limb + 1) * 8].copy_from_slice(&value.to_le_bytes());
    }

    let mut expected = checksum(&bytes);
    for &c in &letters[LIMBS * LETTERS_PER_LIMB..] {
        if digit(c)? != u64::from(expected % RADIX as u32) {
            return Err(IdentityError::Checksum);
        }
        expected /= RADIX as u32;
    }
    Ok(bytes)
}

fn checksum(bytes: &[u8; 32]) -> u32 {
    let digest = crypto::digest(bytes);
    u32::from_le_bytes([digest[0], digest[1], digest[2], 0]) & CHECKSUM_MASK
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn zero_key_is_all_a() {
        let id = PublicKey::ZERO.to_identity();
        assert_eq!(id.len(), IDENTITY_LEN);
        assert!(id[..56].bytes().all(|c| c == b'A'));
        assert_eq!(PublicKey::from_identity(&id).unwrap(), PublicKey::ZERO);
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!(
            PublicKey::from_identity("SHORT"),
            Err(IdentityError::Length {
                expected: IDENTITY_LEN,
                actual: 5
            })
        );

        let mut id = PublicKey([7u8; 32]).to_identity();
        id.replace_range(3..4, "a");
        assert_eq!(
            PublicKey::from_identity(&id),
            Err(IdentityError::Character('a'))
        );
    }

    #[test]
    fn rejects_limb_overflow() {
        // 26^14 - 1 does not fit into a u64
        let id = format!("{}{}", "Z".repeat(14), "A".repeat(46));
        assert_eq!(PublicKey::from_identity(&id), Err(IdentityError::Overflow));
    }

    #[test]
    fn detects_checksum_tampering() {
        let key = PublicKey([0x42; 32]);
        let mut id = key.to_identity();
        let last = id.pop().unwrap();
        id.push(if last == 'Z' { 'A' } else { char::from(last as u8 + 1) });
        assert_eq!(PublicKey::from_identity(&id), Err(IdentityError::Checksum));
    }

    #[test]
    fn lowercase_encoding_only_decodes_as_lowercase() {
        let bytes = [0xA5; 32];
        let text = encode_identity(&bytes, true);
        assert!(text.bytes().all(|c| c.is_ascii_lowercase()));
        assert_eq!(decode_identity(&text, true).unwrap(), bytes);
        assert!(decode_identity(&text, false).is_err());
    }

    proptest! {
        #[test]
        fn identity_roundtrip(bytes in proptest::array::uniform32(any::<u8>())) {
            let key = PublicKey(bytes);
            prop_assert_eq!(key.to_identity().parse::<PublicKey>().unwrap(), key);
        }
    }
}
