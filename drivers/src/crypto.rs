/*++

Licensed under the Apache-2.0 license.

File Name:

    crypto.rs

Abstract:

    File contains the cryptographic provider interface consumed by the boot
    core. The core never implements the primitives itself.

--*/

use hardboot_error::BootResult;

pub const DIGEST_SIZE: usize = 32;
pub const SIGNATURE_SIZE: usize = 64;
pub const PUB_KEY_SIZE: usize = 32;
pub const SYMMETRIC_KEY_SIZE: usize = 32;
pub const AEAD_NONCE_SIZE: usize = 12;
pub const AEAD_TAG_SIZE: usize = 16;

pub type Sha256Digest = [u8; DIGEST_SIZE];
pub type Signature = [u8; SIGNATURE_SIZE];
pub type PubKey = [u8; PUB_KEY_SIZE];

/// Cryptographic services.
///
/// Signing always operates on a SHA-256 digest; verification takes the
/// digest that was signed as `data`.
pub trait CryptoProvider {
    /// Compute the SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> BootResult<Sha256Digest>;

    /// Expand `ikm` into `okm` with HKDF, using `info` for domain separation.
    fn hkdf(&self, ikm: &[u8], salt: &[u8], info: &[u8], okm: &mut [u8]) -> BootResult<()>;

    /// Sign `digest` with the private key `key`.
    fn sign(&self, digest: &Sha256Digest, key: &[u8; SYMMETRIC_KEY_SIZE])
        -> BootResult<Signature>;

    /// Public half of the signing key `key`.
    fn public_key(&self, key: &[u8; SYMMETRIC_KEY_SIZE]) -> BootResult<PubKey>;

    /// Verify `signature` over `data` with `pub_key`.
    ///
    /// # Returns
    ///
    /// * `BootResult<bool>` - `Ok(false)` for a well-formed signature that does not verify
    fn verify(&self, data: &[u8], signature: &Signature, pub_key: &PubKey) -> BootResult<bool>;

    /// Encrypt `buf` in place and return the authentication tag.
    fn aead_wrap(
        &self,
        key: &[u8; SYMMETRIC_KEY_SIZE],
        nonce: &[u8; AEAD_NONCE_SIZE],
        aad: &[u8],
        buf: &mut [u8],
    ) -> BootResult<[u8; AEAD_TAG_SIZE]>;

    /// Authenticate and decrypt `buf` in place.
    ///
    /// On error the contents of `buf` are unspecified; callers zeroize it.
    fn aead_unwrap(
        &self,
        key: &[u8; SYMMETRIC_KEY_SIZE],
        nonce: &[u8; AEAD_NONCE_SIZE],
        aad: &[u8],
        buf: &mut [u8],
        tag: &[u8; AEAD_TAG_SIZE],
    ) -> BootResult<()>;
}
