/*++

Licensed under the Apache-2.0 license.

File Name:

    ed25519.rs

Abstract:

    File contains the Ed25519 signing helpers used by the emulator crypto
    provider and by tests that produce vendor-signed images.

--*/

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

pub const ED25519_SEED_SIZE: usize = 32;
pub const ED25519_PUB_KEY_SIZE: usize = 32;
pub const ED25519_SIGNATURE_SIZE: usize = 64;

pub enum Ed25519 {}

impl Ed25519 {
    /// Public key of the signing key derived from `seed`.
    pub fn public_key(seed: &[u8; ED25519_SEED_SIZE]) -> [u8; ED25519_PUB_KEY_SIZE] {
        SigningKey::from_bytes(seed).verifying_key().to_bytes()
    }

    /// Sign `msg` with the key derived from `seed`.
    pub fn sign(seed: &[u8; ED25519_SEED_SIZE], msg: &[u8]) -> [u8; ED25519_SIGNATURE_SIZE] {
        SigningKey::from_bytes(seed).sign(msg).to_bytes()
    }

    /// Verify `signature` over `msg`.
    ///
    /// # Returns
    ///
    /// * `Option<bool>` - `None` if `pub_key` is not a valid point
    pub fn verify(
        pub_key: &[u8; ED25519_PUB_KEY_SIZE],
        msg: &[u8],
        signature: &[u8; ED25519_SIGNATURE_SIZE],
    ) -> Option<bool> {
        let key = VerifyingKey::from_bytes(pub_key).ok()?;
        let signature = Signature::from_bytes(signature);
        Some(key.verify(msg, &signature).is_ok())
    }
}
