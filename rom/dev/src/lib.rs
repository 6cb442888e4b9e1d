/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the hardboot secure boot core.

    The boot interface is `run_secure_boot` and the types it consumes and
    reports. The boot components themselves are private to the core; the
    `fault-inject` feature re-exports them for fault-injection harnesses.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod attestation;
mod config;
mod context;
mod flow;
// Key wrapping and the rollback decision form are not used by the boot flow.
#[cfg_attr(not(feature = "fault-inject"), allow(dead_code))]
mod key_vault;
#[cfg_attr(not(feature = "fault-inject"), allow(dead_code))]
mod rollback;
mod rom_env;
mod tamper;
mod token_verifier;
mod verifier;

pub use attestation::{
    AttestationLedger, AttestationReport, BootEvent, Diagnostics, Measurement, MeasurementStage,
    ReportBody, ATTESTATION_VERSION, MAX_EVENT_LOG_ENTRIES, MAX_MEASUREMENTS, NONCE_SIZE,
    REPORT_FLAG_DIAGNOSTICS,
};
pub use config::{
    BootConfig, FW_MAX_IMAGE_SIZE, OTP_COUNTER_WORDS, OTP_ROLLBACK_BASE, ROM_BASE, VAULT_MMIO_BASE,
};
pub use context::BootState;
pub use flow::{run_secure_boot, BootFailure, BootOutcome, BootParams};
pub use rom_env::BootEnv;
pub use tamper::{TamperConfig, TamperEvents, TamperIrq, TamperLatch, GLITCH_DELTA_MV};
pub use verifier::{FirmwareHeader, FirmwareImage, FW_MAGIC};

#[cfg(feature = "fault-inject")]
pub use attestation::ReportInputs;
#[cfg(feature = "fault-inject")]
pub use context::{BootContext, TokenSlot, VerificationToken, EXPECTED_TOKENS, TOKEN_COUNT};
#[cfg(feature = "fault-inject")]
pub use flow::BootSequencer;
#[cfg(feature = "fault-inject")]
pub use key_vault::{
    KeyId, KeyType, KeyVault, WrappedKey, KEK_LABEL, MAX_DERIVED_KEY_SIZE, MAX_KEY_SIZE,
    WRAPPED_KEY_SIZE, WRAP_FORMAT_VERSION,
};
#[cfg(feature = "fault-inject")]
pub use rollback::{RollbackDecision, RollbackGuard};
#[cfg(feature = "fault-inject")]
pub use tamper::{classify, TamperActions, TamperMonitor, TamperState, SENSOR_MAX_POLLS};
#[cfg(feature = "fault-inject")]
pub use token_verifier::{TokenState, TokenVerifier};
#[cfg(feature = "fault-inject")]
pub use verifier::ImageVerifier;
