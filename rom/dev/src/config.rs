/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the boot configuration and its default values.

--*/

use crate::tamper::TamperConfig;
use hardboot_cfi_lib::JitterBounds;
use hardboot_drivers::OtpRegion;

/// First OTP word of the anti-rollback counter.
pub const OTP_ROLLBACK_BASE: u32 = 0;

/// OTP words reserved for the anti-rollback counter. Each word holds 32
/// increments.
pub const OTP_COUNTER_WORDS: u32 = 8;

/// Largest firmware payload accepted.
pub const FW_MAX_IMAGE_SIZE: u32 = 0x10_0000;

/// Base of the boot ROM; must sit in the trusted domain.
pub const ROM_BASE: u32 = 0x0000_0000;

/// Base of the key vault peripheral window; must sit in the trusted domain.
pub const VAULT_MMIO_BASE: u32 = 0x4000_0000;

/// Evaluations performed by each redundant predicate check.
pub const REDUNDANT_ROUNDS: u32 = 2;

/// Boot configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    /// Sensor window and glitch delta
    pub tamper: TamperConfig,

    /// Jitter delay window
    pub jitter: JitterBounds,

    /// OTP words holding the anti-rollback counter
    pub rollback_region: OtpRegion,

    /// Largest firmware payload accepted
    pub max_image_size: u32,

    /// Addresses checked against the isolation boundary
    pub rom_base: u32,
    pub vault_mmio_base: u32,

    /// Evaluations per redundant predicate check
    pub redundant_rounds: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            tamper: TamperConfig::default(),
            jitter: JitterBounds::default(),
            rollback_region: OtpRegion {
                base: OTP_ROLLBACK_BASE,
                words: OTP_COUNTER_WORDS,
            },
            max_image_size: FW_MAX_IMAGE_SIZE,
            rom_base: ROM_BASE,
            vault_mmio_base: VAULT_MMIO_BASE,
            redundant_rounds: REDUNDANT_ROUNDS,
        }
    }
}
