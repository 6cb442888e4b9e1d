/*++

Licensed under the Apache-2.0 license.

File Name:

    key_vault.rs

Abstract:

    File contains the PUF-rooted key vault: domain-separated key
    derivation, authenticated key wrapping and the boot-lifetime key slots.

--*/

use hardboot_cfi_lib::JitterSource;
use hardboot_drivers::{
    cprintln, trng, wait, BootError, BootResult, CryptoProvider, Puf, AEAD_NONCE_SIZE,
    AEAD_TAG_SIZE, PUF_KEY_SIZE, SYMMETRIC_KEY_SIZE,
};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};
use zeroize::Zeroize;

/// Largest key accepted by wrap.
pub const MAX_KEY_SIZE: usize = 32;

/// Ciphertext plus tag.
pub const WRAPPED_KEY_SIZE: usize = MAX_KEY_SIZE + AEAD_TAG_SIZE;

/// Largest output of a single derivation.
pub const MAX_DERIVED_KEY_SIZE: usize = 64;

/// Wrapped key format version, bound into the AEAD associated data.
pub const WRAP_FORMAT_VERSION: u32 = 1;

/// Derivation label of the key encryption key.
pub const KEK_LABEL: &[u8] = b"KEY_WRAPPING_v1";

/// Poll budget for PUF key reconstruction.
const PUF_MAX_POLLS: u32 = 10_000;

/// HKDF salt shared by every derivation.
const KDF_SALT: &[u8] = b"hardboot-key-vault";

const KEY_SLOT_COUNT: usize = 2;

/// Key type tag carried by a wrapped key
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Encryption = 1,
    Signing = 2,
    Attestation = 3,
    Storage = 4,
}

impl TryFrom<u32> for KeyType {
    type Error = BootError;

    fn try_from(val: u32) -> Result<Self, BootError> {
        match val {
            1 => Ok(Self::Encryption),
            2 => Ok(Self::Signing),
            3 => Ok(Self::Attestation),
            4 => Ok(Self::Storage),
            _ => Err(BootError::KEY_VAULT_INVALID_KEY_TYPE),
        }
    }
}

/// Key slots that live for one boot attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyId {
    Attestation = 0,
    Storage = 1,
}

impl KeyId {
    /// Derivation label; distinct per slot and from [`KEK_LABEL`].
    pub fn label(self) -> &'static [u8] {
        match self {
            KeyId::Attestation => b"ATTESTATION_SIGNING_v1",
            KeyId::Storage => b"STORAGE_v1",
        }
    }
}

/// Authenticated ciphertext of a key.
///
/// The type tag, format version and length are bound into the associated
/// data, so changing any of them fails authentication.
#[repr(C)]
#[derive(Clone, Debug, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct WrappedKey {
    key_type: u32,
    version: u32,
    len: u32,
    nonce: [u8; AEAD_NONCE_SIZE],
    ciphertext: [u8; MAX_KEY_SIZE],
    tag: [u8; AEAD_TAG_SIZE],
}

impl WrappedKey {
    pub fn key_type(&self) -> u32 {
        self.key_type
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn tag(&self) -> &[u8; AEAD_TAG_SIZE] {
        &self.tag
    }

    fn aad(&self) -> [u8; 12] {
        let mut aad = [0u8; 12];
        aad[..4].copy_from_slice(&self.key_type.to_le_bytes());
        aad[4..8].copy_from_slice(&self.version.to_le_bytes());
        aad[8..].copy_from_slice(&self.len.to_le_bytes());
        aad
    }
}

#[derive(Default)]
struct KeySlot {
    key: [u8; SYMMETRIC_KEY_SIZE],
    loaded: bool,
}

impl KeySlot {
    fn erase(&mut self) {
        self.key.zeroize();
        self.loaded = false;
    }
}

impl Drop for KeySlot {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Key Vault
pub struct KeyVault<'a> {
    puf: &'a mut dyn Puf,
    crypto: &'a dyn CryptoProvider,
    slots: [KeySlot; KEY_SLOT_COUNT],
    locked: bool,
    reconstruction_count: u32,
}

impl<'a> KeyVault<'a> {
    pub fn new(puf: &'a mut dyn Puf, crypto: &'a dyn CryptoProvider) -> Self {
        Self {
            puf,
            crypto,
            slots: Default::default(),
            locked: false,
            reconstruction_count: 0,
        }
    }

    /// Enroll the PUF. A no-op if helper data already exists.
    pub fn enroll(&mut self) -> BootResult<()> {
        self.ensure_unlocked()?;
        if self.puf.is_enrolled() {
            return Ok(());
        }
        cprintln!("[vault] enrolling");
        self.puf.enroll()?;
        if !self.puf.is_enrolled() {
            return Err(BootError::DRIVER_PUF_ENROLLMENT_FAILURE);
        }
        Ok(())
    }

    /// Derive key material bound to `label` from the PUF root key.
    ///
    /// # Arguments
    ///
    /// * `jitter` - Delay source
    /// * `label` - Domain separation label
    /// * `out` - Destination; its length is the key length
    ///
    /// # Returns
    ///
    /// * `BootResult<()>` - On error `out` is zeroized
    pub fn derive_key(
        &mut self,
        jitter: &mut JitterSource,
        label: &[u8],
        out: &mut [u8],
    ) -> BootResult<()> {
        self.ensure_unlocked()?;
        if label.is_empty() {
            return Err(BootError::KEY_VAULT_INVALID_LABEL);
        }
        if out.is_empty() || out.len() > MAX_DERIVED_KEY_SIZE {
            return Err(BootError::KEY_VAULT_INVALID_KEY_SIZE);
        }

        let mut root = [0u8; PUF_KEY_SIZE];
        let result = self
            .reconstruct(jitter, &mut root)
            .and_then(|_| self.crypto.hkdf(&root, KDF_SALT, label, out));
        root.zeroize();
        if result.is_err() {
            out.zeroize();
        }
        result
    }

    /// Derive the key for `id` into its slot.
    pub fn load_slot(&mut self, jitter: &mut JitterSource, id: KeyId) -> BootResult<()> {
        let mut key = [0u8; SYMMETRIC_KEY_SIZE];
        let result = self.derive_key(jitter, id.label(), &mut key);
        if result.is_ok() {
            let slot = &mut self.slots[id as usize];
            slot.key = key;
            slot.loaded = true;
        }
        key.zeroize();
        result
    }

    /// Key held in slot `id`.
    pub fn slot_key(&self, id: KeyId) -> BootResult<&[u8; SYMMETRIC_KEY_SIZE]> {
        self.ensure_unlocked()?;
        let slot = &self.slots[id as usize];
        if !slot.loaded {
            return Err(BootError::KEY_VAULT_SLOT_EMPTY);
        }
        Ok(&slot.key)
    }

    /// Wrap `plaintext` under the vault key encryption key.
    ///
    /// # Arguments
    ///
    /// * `jitter` - Delay source; its TRNG also supplies the nonce
    /// * `plaintext` - Key to wrap, at most [`MAX_KEY_SIZE`] bytes
    /// * `key_type` - Type tag bound into the wrapped key
    pub fn wrap(
        &mut self,
        jitter: &mut JitterSource,
        plaintext: &[u8],
        key_type: KeyType,
    ) -> BootResult<WrappedKey> {
        self.ensure_unlocked()?;
        let len = plaintext.len();
        if len == 0 || len > MAX_KEY_SIZE {
            return Err(BootError::KEY_VAULT_INVALID_KEY_SIZE);
        }

        let mut wrapped = WrappedKey::new_zeroed();
        wrapped.key_type = key_type as u32;
        wrapped.version = WRAP_FORMAT_VERSION;
        wrapped.len = len as u32;
        trng::fill_bytes(jitter.trng(), &mut wrapped.nonce)?;

        let mut kek = [0u8; SYMMETRIC_KEY_SIZE];
        self.derive_key(jitter, KEK_LABEL, &mut kek)?;

        let aad = wrapped.aad();
        let nonce = wrapped.nonce;
        wrapped.ciphertext[..len].copy_from_slice(plaintext);
        let result = self
            .crypto
            .aead_wrap(&kek, &nonce, &aad, &mut wrapped.ciphertext[..len]);
        kek.zeroize();

        match result {
            Ok(tag) => {
                wrapped.tag = tag;
                Ok(wrapped)
            }
            Err(err) => {
                wrapped.as_mut_bytes().zeroize();
                Err(err)
            }
        }
    }

    /// Authenticate and decrypt `wrapped` into `out`.
    ///
    /// The wrapped key is consumed and zeroized. On any error `out` is
    /// zeroized before returning.
    ///
    /// # Returns
    ///
    /// * `BootResult<usize>` - Key length written to `out`
    pub fn unwrap(
        &mut self,
        jitter: &mut JitterSource,
        mut wrapped: WrappedKey,
        out: &mut [u8],
    ) -> BootResult<usize> {
        let result = self.unwrap_into(jitter, &wrapped, out);
        wrapped.as_mut_bytes().zeroize();
        if result.is_err() {
            out.zeroize();
        }
        result
    }

    fn unwrap_into(
        &mut self,
        jitter: &mut JitterSource,
        wrapped: &WrappedKey,
        out: &mut [u8],
    ) -> BootResult<usize> {
        self.ensure_unlocked()?;
        let len = wrapped.len();
        if len == 0 || len > MAX_KEY_SIZE {
            return Err(BootError::KEY_VAULT_AUTH_FAILURE);
        }
        if out.len() < len {
            return Err(BootError::KEY_VAULT_INVALID_KEY_SIZE);
        }

        let mut kek = [0u8; SYMMETRIC_KEY_SIZE];
        self.derive_key(jitter, KEK_LABEL, &mut kek)?;

        out[..len].copy_from_slice(&wrapped.ciphertext[..len]);
        let result = self.crypto.aead_unwrap(
            &kek,
            &wrapped.nonce,
            &wrapped.aad(),
            &mut out[..len],
            &wrapped.tag,
        );
        kek.zeroize();
        jitter.jitter_default();
        if result.is_err() {
            cprintln!("[vault] unwrap authentication failure");
            return Err(BootError::KEY_VAULT_AUTH_FAILURE);
        }
        KeyType::try_from(wrapped.key_type)?;
        Ok(len)
    }

    /// Zeroize every key slot.
    pub fn erase_all_keys(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.erase();
        }
        cprintln!("[vault] keys erased");
    }

    /// Refuse every further key operation for this boot attempt.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns `true` if no slot holds key material.
    pub fn is_erased(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| !slot.loaded && slot.key.iter().all(|&b| b == 0))
    }

    /// Number of successful PUF reconstructions.
    pub fn reconstruction_count(&self) -> u32 {
        self.reconstruction_count
    }

    fn ensure_unlocked(&self) -> BootResult<()> {
        if self.locked {
            Err(BootError::KEY_VAULT_LOCKED)
        } else {
            Ok(())
        }
    }

    fn reconstruct(
        &mut self,
        jitter: &mut JitterSource,
        root: &mut [u8; PUF_KEY_SIZE],
    ) -> BootResult<()> {
        let puf = &mut *self.puf;
        if !puf.is_enrolled() {
            return Err(BootError::DRIVER_PUF_NOT_ENROLLED);
        }
        jitter.jitter_default();
        puf.start_reconstruction()?;
        wait::until(
            || puf.reconstruction_done(),
            PUF_MAX_POLLS,
            BootError::DRIVER_PUF_TIMEOUT,
        )?;
        puf.read_root_key(root)?;
        self.reconstruction_count = self.reconstruction_count.wrapping_add(1);
        jitter.jitter_default();
        Ok(())
    }
}
