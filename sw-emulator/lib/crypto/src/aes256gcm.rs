/*++

Licensed under the Apache-2.0 license.

File Name:

    aes256gcm.rs

Abstract:

    File contains implementation of AES-256 GCM algorithm.

--*/

use crate::AES_256_KEY_SIZE;
use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Key,
};

pub const AES_256_GCM_IV_SIZE: usize = 12;
pub const AES_256_GCM_TAG_SIZE: usize = 16;

pub enum Aes256Gcm {}

impl Aes256Gcm {
    /// Encrypt `buf` in place.
    ///
    /// # Returns
    ///
    /// * `Option<[u8; AES_256_GCM_TAG_SIZE]>` - Detached authentication tag
    pub fn encrypt_in_place(
        key: &[u8; AES_256_KEY_SIZE],
        iv: &[u8; AES_256_GCM_IV_SIZE],
        aad: &[u8],
        buf: &mut [u8],
    ) -> Option<[u8; AES_256_GCM_TAG_SIZE]> {
        let key: &Key<aes_gcm::Aes256Gcm> = key.into();
        let cipher = aes_gcm::Aes256Gcm::new(key);
        cipher
            .encrypt_in_place_detached(iv.into(), aad, buf)
            .ok()
            .map(|tag| tag.into())
    }

    /// Authenticate and decrypt `buf` in place.
    ///
    /// # Returns
    ///
    /// * `bool` - `false` if the tag does not match; `buf` is then left
    ///   unchanged
    pub fn decrypt_in_place(
        key: &[u8; AES_256_KEY_SIZE],
        iv: &[u8; AES_256_GCM_IV_SIZE],
        aad: &[u8],
        buf: &mut [u8],
        tag: &[u8; AES_256_GCM_TAG_SIZE],
    ) -> bool {
        let key: &Key<aes_gcm::Aes256Gcm> = key.into();
        let cipher = aes_gcm::Aes256Gcm::new(key);
        cipher
            .decrypt_in_place_detached(iv.into(), aad, buf, tag.into())
            .is_ok()
    }
}
