/*++

Licensed under the Apache-2.0 license.

File Name:

    provider.rs

Abstract:

    File contains the host crypto provider: SHA-256, HKDF-SHA-256,
    AES-256-GCM and Ed25519.

--*/

use crate::{Aes256Gcm, Ed25519};
use hardboot_drivers::{
    BootError, BootResult, CryptoProvider, PubKey, Sha256Digest, Signature, AEAD_NONCE_SIZE,
    AEAD_TAG_SIZE, SYMMETRIC_KEY_SIZE,
};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};

/// Crypto provider backed by RustCrypto and dalek.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmuCrypto;

impl EmuCrypto {
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for EmuCrypto {
    fn sha256(&self, data: &[u8]) -> BootResult<Sha256Digest> {
        Ok(Sha256::digest(data).into())
    }

    fn hkdf(&self, ikm: &[u8], salt: &[u8], info: &[u8], okm: &mut [u8]) -> BootResult<()> {
        Hkdf::<Sha256>::new(Some(salt), ikm)
            .expand(info, okm)
            .map_err(|_| BootError::CRYPTO_KDF_FAILURE)
    }

    fn sign(&self, digest: &Sha256Digest, key: &[u8; SYMMETRIC_KEY_SIZE]) -> BootResult<Signature> {
        Ok(Ed25519::sign(key, digest))
    }

    fn public_key(&self, key: &[u8; SYMMETRIC_KEY_SIZE]) -> BootResult<PubKey> {
        Ok(Ed25519::public_key(key))
    }

    fn verify(&self, data: &[u8], signature: &Signature, pub_key: &PubKey) -> BootResult<bool> {
        Ed25519::verify(pub_key, data, signature).ok_or(BootError::CRYPTO_INVALID_KEY)
    }

    fn aead_wrap(
        &self,
        key: &[u8; SYMMETRIC_KEY_SIZE],
        nonce: &[u8; AEAD_NONCE_SIZE],
        aad: &[u8],
        buf: &mut [u8],
    ) -> BootResult<[u8; AEAD_TAG_SIZE]> {
        Aes256Gcm::encrypt_in_place(key, nonce, aad, buf).ok_or(BootError::CRYPTO_AEAD_FAILURE)
    }

    fn aead_unwrap(
        &self,
        key: &[u8; SYMMETRIC_KEY_SIZE],
        nonce: &[u8; AEAD_NONCE_SIZE],
        aad: &[u8],
        buf: &mut [u8],
        tag: &[u8; AEAD_TAG_SIZE],
    ) -> BootResult<()> {
        if Aes256Gcm::decrypt_in_place(key, nonce, aad, buf, tag) {
            Ok(())
        } else {
            Err(BootError::CRYPTO_AEAD_FAILURE)
        }
    }
}
