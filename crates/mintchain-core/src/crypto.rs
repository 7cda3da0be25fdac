//! ECDSA (NIST P-256) signing and verification.
//!
//! # Wire formats
//!
//! - Signature: raw concatenation `r || s`, each half padded to 32 bytes.
//! - Public key: raw concatenation `X || Y` of the affine coordinates, each
//!   half padded to 32 bytes (the uncompressed SEC1 point with its leading
//!   `0x04` tag byte stripped).
//!
//! Both signing and verification hash the caller-supplied message with
//! `SHA-256` internally (the standard ECDSA/P-256 digest), matching the way
//! the broader P-256 signature stack in this ecosystem composes `p256` with
//! `sha2`.

use ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;

use crate::error::CryptoError;

/// A P-256 ECDSA keypair.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Generate a random keypair using the OS CSPRNG.
    pub fn generate() -> Self {
        Self(SigningKey::random(&mut OsRng))
    }

    /// Reconstruct a keypair from 32 bytes of secret scalar material.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        SigningKey::from_bytes(bytes.into())
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Raw 32-byte secret scalar. Handle with care.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    /// Derive the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    /// Sign `message`, returning the raw `r || s` signature bytes.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let sig: Signature = self.0.sign(message);
        sig.to_bytes().to_vec()
    }
}

/// A P-256 public key, as carried in a [`TxInput`](crate::tx::TxInput)'s
/// `pubkey` field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parse a public key from raw `X || Y` bytes (64 bytes).
    pub fn from_xy_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 64 {
            return Err(CryptoError::InvalidPublicKey);
        }
        let mut sec1 = Vec::with_capacity(65);
        sec1.push(0x04);
        sec1.extend_from_slice(bytes);
        let vk = VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(vk))
    }

    /// Encode as raw `X || Y` bytes (64 bytes, no SEC1 tag).
    pub fn to_xy_bytes(&self) -> Vec<u8> {
        let point = self.0.to_encoded_point(false);
        point.as_bytes()[1..].to_vec()
    }

    /// Verify a raw `r || s` signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig = Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;
        self.0
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let key = PrivateKey::generate();
        let msg = b"hello mintchain";
        let sig = key.sign(msg);
        assert!(key.public_key().verify(msg, &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let key = PrivateKey::generate();
        let sig = key.sign(b"original");
        assert!(key.public_key().verify(b"tampered", &sig).is_err());
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let key = PrivateKey::generate();
        let msg = b"hello";
        let mut sig = key.sign(msg);
        sig[0] ^= 0xFF;
        assert!(key.public_key().verify(msg, &sig).is_err());
    }

    #[test]
    fn pubkey_round_trips_through_xy_bytes() {
        let key = PrivateKey::generate();
        let pk = key.public_key();
        let bytes = pk.to_xy_bytes();
        assert_eq!(bytes.len(), 64);
        let parsed = PublicKey::from_xy_bytes(&bytes).unwrap();
        assert_eq!(pk, parsed);
    }

    #[test]
    fn signature_is_fixed_width_r_s() {
        let key = PrivateKey::generate();
        let sig = key.sign(b"anything");
        assert_eq!(sig.len(), 64);
    }
}
