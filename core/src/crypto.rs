//! Hashing, key derivation and signing used to authorize transactions.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::identity::PublicKey;
use crate::{EscrowError, Result};

/// Length of a digest produced by [`ContentHasher`].
pub const DIGEST_LEN: usize = 32;

/// Length of a transaction signature.
pub const SIGNATURE_LEN: usize = 64;

/// Required seed length, in lowercase latin letters.
pub const SEED_LEN: usize = 55;

/// Deterministic digest used both for signing and content addressing.
pub trait ContentHasher {
    fn digest(&self, data: &[u8]) -> [u8; DIGEST_LEN];
}

/// SHA-256 content hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn digest(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        Sha256::digest(data).into()
    }
}

/// Digest with the default hasher.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256Hasher.digest(data)
}

/// Anything able to authorize a transaction digest.
pub trait TxSigner {
    /// Public key placed in the transaction's source field.
    fn public_key(&self) -> PublicKey;

    /// Sign a pre-computed transaction digest.
    fn sign_digest(&self, digest: &[u8; DIGEST_LEN]) -> [u8; SIGNATURE_LEN];
}

/// Key pair derived from a seed: seed → subseed → private key → public key.
pub struct KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Derive a key pair from a 55-letter lowercase seed.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidSeed`] if the seed has the wrong length
    /// or contains anything other than `a..=z`.
    pub fn from_seed(seed: &str) -> Result<Self> {
        if seed.len() != SEED_LEN {
            return Err(EscrowError::InvalidSeed(format!(
                "expected {SEED_LEN} letters, got {}",
                seed.chars().count()
            )));
        }
        if !seed.bytes().all(|c| c.is_ascii_lowercase()) {
            return Err(EscrowError::InvalidSeed(
                "only lowercase letters a-z are allowed".to_string(),
            ));
        }

        let letters: Vec<u8> = seed.bytes().map(|c| c - b'a').collect();
        let subseed = digest(&letters);
        let private_key = digest(&subseed);
        let signing_key = SigningKey::from_bytes(&private_key);
        let public_key = PublicKey(signing_key.verifying_key().to_bytes());

        Ok(Self {
            signing_key,
            public_key,
        })
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Uppercase identity of the public key.
    pub fn identity(&self) -> String {
        self.public_key.to_identity()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl TxSigner for KeyPair {
    fn public_key(&self) -> PublicKey {
        self.public_key
    }

    fn sign_digest(&self, digest: &[u8; DIGEST_LEN]) -> [u8; SIGNATURE_LEN] {
        self.signing_key.sign(digest).to_bytes()
    }
}

/// Check `signature` over `digest` against `public_key`.
pub fn verify_signature(
    public_key: &PublicKey,
    digest: &[u8; DIGEST_LEN],
    signature: &[u8; SIGNATURE_LEN],
) -> bool {
    VerifyingKey::from_bytes(public_key.as_bytes())
        .map(|vk| vk.verify(digest, &Signature::from_bytes(signature)).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "aaaaaaaaaabbbbbbbbbbccccccccccddddddddddeeeeeeeeeefffff";

    #[test]
    fn derivation_is_deterministic() {
        let a = KeyPair::from_seed(SEED).unwrap();
        let b = KeyPair::from_seed(SEED).unwrap();
        assert_eq!(a.public_key(), b.public_key());

        let other = KeyPair::from_seed(&SEED.replace('f', "g")).unwrap();
        assert_ne!(a.public_key(), other.public_key());
    }

    #[test]
    fn rejects_bad_seeds() {
        assert!(matches!(
            KeyPair::from_seed("short"),
            Err(EscrowError::InvalidSeed(_))
        ));
        assert!(matches!(
            KeyPair::from_seed(&SEED.to_uppercase()),
            Err(EscrowError::InvalidSeed(_))
        ));
    }

    #[test]
    fn signature_verifies_against_digest() {
        let keys = KeyPair::from_seed(SEED).unwrap();
        let digest = digest(b"escrow");
        let signature = keys.sign_digest(&digest);
        assert!(verify_signature(&keys.public_key(), &digest, &signature));

        let mut tampered = digest;
        tampered[0] ^= 0xFF;
        assert!(!verify_signature(&keys.public_key(), &tampered, &signature));
    }
}
