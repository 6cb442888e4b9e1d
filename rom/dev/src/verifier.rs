/*++

Licensed under the Apache-2.0 license.

File Name:

    verifier.rs

Abstract:

    Firmware image verification support routines.

--*/

use crate::config::BootConfig;
use hardboot_cfi_lib::{cfi_bytes_eq, cfi_check_eq, cfi_redundant, JitterSource};
use hardboot_drivers::{
    cprintln, BootError, BootResult, CryptoProvider, HexWord, PubKey, Sha256Digest, Signature,
    DIGEST_SIZE, SIGNATURE_SIZE,
};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Firmware header magic ("FMWP").
pub const FW_MAGIC: u32 = 0x464D_5750;

/// Firmware header
///
/// The vendor signature covers SHA-256 of this header, which in turn binds
/// the payload through `payload_digest`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FirmwareHeader {
    pub magic: u32,

    /// Security version checked against the anti-rollback counter
    pub version: u32,

    /// Payload length in bytes
    pub image_size: u32,

    pub load_address: u32,
    pub entry_point: u32,
    pub payload_digest: [u8; DIGEST_SIZE],
}

/// Firmware image staged for verification
#[derive(Debug, Clone, Copy)]
pub struct FirmwareImage<'a> {
    pub header: FirmwareHeader,
    pub signature: Signature,
    pub payload: &'a [u8],
}

impl<'a> FirmwareImage<'a> {
    /// Split a staged image laid out as header, signature, payload.
    pub fn parse(bytes: &'a [u8]) -> BootResult<Self> {
        let (header, rest) =
            FirmwareHeader::read_from_prefix(bytes).map_err(|_| BootError::BOOT_FW_INVALID_SIZE)?;
        if rest.len() < SIGNATURE_SIZE {
            return Err(BootError::BOOT_FW_INVALID_SIZE);
        }
        let (sig, payload) = rest.split_at(SIGNATURE_SIZE);
        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(sig);
        Ok(Self {
            header,
            signature,
            payload,
        })
    }
}

/// Image Verifier
pub struct ImageVerifier<'a> {
    crypto: &'a dyn CryptoProvider,
    max_image_size: u32,
    rounds: u32,
}

impl<'a> ImageVerifier<'a> {
    pub fn new(crypto: &'a dyn CryptoProvider, config: &BootConfig) -> Self {
        Self {
            crypto,
            max_image_size: config.max_image_size,
            rounds: config.redundant_rounds,
        }
    }

    /// Verify the image header, payload digest and vendor signature.
    ///
    /// # Arguments
    ///
    /// * `image` - Staged image
    /// * `vendor_pub_key` - Key the vendor signature must verify under
    /// * `jitter` - Delay source
    ///
    /// # Returns
    ///
    /// * `BootResult<Sha256Digest>` - Payload digest, used as the firmware
    ///   measurement
    pub fn verify(
        &self,
        image: &FirmwareImage,
        vendor_pub_key: &PubKey,
        jitter: &mut JitterSource,
    ) -> BootResult<Sha256Digest> {
        let header = &image.header;

        if header.magic != FW_MAGIC {
            cprintln!("[boot] bad image magic {}", HexWord(header.magic));
            return Err(BootError::BOOT_FW_INVALID_MAGIC);
        }
        cfi_check_eq(header.magic, FW_MAGIC, jitter)?;

        let size = header.image_size;
        if size == 0 || size > self.max_image_size || size as usize != image.payload.len() {
            cprintln!("[boot] bad image size {}", size);
            return Err(BootError::BOOT_FW_INVALID_SIZE);
        }
        cfi_check_eq(size as usize, image.payload.len(), jitter)?;

        let digest = self.crypto.sha256(image.payload)?;
        if !cfi_redundant(self.rounds, jitter, || {
            cfi_bytes_eq(&digest, &header.payload_digest)
        }) {
            cprintln!("[boot] payload digest mismatch");
            return Err(BootError::BOOT_FW_DIGEST_MISMATCH);
        }

        let header_digest = self.crypto.sha256(header.as_bytes())?;
        let crypto = self.crypto;
        if !cfi_redundant(self.rounds, jitter, || {
            matches!(
                crypto.verify(&header_digest, &image.signature, vendor_pub_key),
                Ok(true)
            )
        }) {
            cprintln!("[boot] vendor signature invalid");
            return Err(BootError::BOOT_FW_SIGNATURE_INVALID);
        }

        Ok(digest)
    }
}
