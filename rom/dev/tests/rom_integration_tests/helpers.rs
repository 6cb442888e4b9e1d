// Licensed under the Apache-2.0 license

use hardboot_drivers::{CryptoProvider, OtpRegion, PubKey, Signature};
use hardboot_emu_crypto::{EmuCrypto, Ed25519};
use hardboot_emu_periph::{EmuDebug, EmuHalt, EmuIsolation, EmuOtp, EmuPuf, EmuSensors, EmuTrng};
use hardboot_rom::{
    BootConfig, BootEnv, BootParams, FirmwareHeader, FirmwareImage, FW_MAGIC, NONCE_SIZE,
};
use zerocopy::IntoBytes;

pub const VENDOR_SEED: [u8; 32] = [0x5C; 32];
pub const PUF_ROOT: [u8; 32] = [0x3E; 32];
pub const TRNG_SEED: u64 = 0x0BAD_5EED;
pub const OTP_WORDS: u32 = 64;

pub const BOOTLOADER_IDENTITY: &[u8] = b"hardboot bootloader";
pub const ROT_IDENTITY: &[u8] = b"hardboot root of trust";
pub const NONCE: [u8; NONCE_SIZE] = [0xC4; NONCE_SIZE];

pub fn rollback_region() -> OtpRegion {
    BootConfig::default().rollback_region
}

/// Emulated device the boot core runs on.
pub struct Platform<'a> {
    pub trng: EmuTrng<'a>,
    pub sensors: EmuSensors,
    pub otp: EmuOtp,
    pub puf: EmuPuf,
    pub crypto: EmuCrypto,
    pub isolation: EmuIsolation,
    pub debug: EmuDebug,
    pub halt: EmuHalt,
}

impl<'a> Platform<'a> {
    /// Enrolled device with nominal sensors and a fresh rollback counter.
    pub fn new() -> Self {
        Self {
            trng: EmuTrng::new(TRNG_SEED),
            sensors: EmuSensors::nominal(),
            otp: EmuOtp::new(OTP_WORDS),
            puf: EmuPuf::enrolled(PUF_ROOT),
            crypto: EmuCrypto::new(),
            isolation: EmuIsolation::default(),
            debug: EmuDebug::new(false),
            halt: EmuHalt::default(),
        }
    }

    pub fn with_stored_version(mut self, version: u32) -> Self {
        self.otp = EmuOtp::new(OTP_WORDS).with_counter(rollback_region(), version);
        self
    }

    pub fn stored_version(&self) -> u32 {
        self.otp.counter(rollback_region())
    }

    pub fn env(&mut self) -> BootEnv<'_> {
        BootEnv {
            trng: &mut self.trng,
            sensors: &mut self.sensors,
            otp: &mut self.otp,
            puf: &mut self.puf,
            crypto: &self.crypto,
            isolation: &self.isolation,
            debug: &self.debug,
            halt: &mut self.halt,
        }
    }
}

/// Vendor-signed firmware image.
pub struct TestImage {
    pub header: FirmwareHeader,
    pub signature: Signature,
    pub payload: Vec<u8>,
}

impl TestImage {
    pub fn new(version: u32) -> Self {
        Self::with_payload(version, b"hardboot test firmware payload".to_vec())
    }

    pub fn with_payload(version: u32, payload: Vec<u8>) -> Self {
        let crypto = EmuCrypto::new();
        let header = FirmwareHeader {
            magic: FW_MAGIC,
            version,
            image_size: payload.len() as u32,
            load_address: 0x2000_0000,
            entry_point: 0x2000_0100,
            payload_digest: crypto.sha256(&payload).unwrap(),
        };
        let mut image = Self {
            header,
            signature: [0; 64],
            payload,
        };
        image.sign();
        image
    }

    /// Re-sign the header with the vendor key.
    pub fn sign(&mut self) {
        let digest = EmuCrypto::new().sha256(self.header.as_bytes()).unwrap();
        self.signature = Ed25519::sign(&VENDOR_SEED, &digest);
    }

    pub fn image(&self) -> FirmwareImage<'_> {
        FirmwareImage {
            header: self.header,
            signature: self.signature,
            payload: &self.payload,
        }
    }
}

pub fn vendor_pub_key() -> PubKey {
    Ed25519::public_key(&VENDOR_SEED)
}

pub fn boot_params(image: &TestImage) -> BootParams<'_> {
    BootParams {
        config: BootConfig::default(),
        firmware: image.image(),
        vendor_pub_key: vendor_pub_key(),
        bootloader_identity: BOOTLOADER_IDENTITY,
        rot_identity: ROT_IDENTITY,
        boot_count: 1,
        nonce: NONCE,
    }
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    EmuCrypto::new().sha256(data).unwrap()
}
