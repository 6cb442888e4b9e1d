/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the boot entry point and the outcome it reports.

--*/

mod sequencer;

pub use sequencer::BootSequencer;

use crate::attestation::{AttestationReport, NONCE_SIZE};
use crate::config::BootConfig;
use crate::context::BootState;
use crate::rom_env::BootEnv;
use crate::tamper::{TamperEvents, TamperLatch};
use crate::verifier::FirmwareImage;
use hardboot_drivers::{BootError, ErrorKind, PubKey};

/// Inputs to one boot attempt
#[derive(Debug, Clone, Copy)]
pub struct BootParams<'a> {
    pub config: BootConfig,

    /// Staged firmware image
    pub firmware: FirmwareImage<'a>,

    /// Vendor key the firmware signature must verify under
    pub vendor_pub_key: PubKey,

    /// Bytes measured as the bootloader stage
    pub bootloader_identity: &'a [u8],

    /// Bytes measured as the root of trust stage
    pub rot_identity: &'a [u8],

    /// Boot counter reported in the attestation report
    pub boot_count: u32,

    /// Relying party freshness nonce
    pub nonce: [u8; NONCE_SIZE],
}

/// Forensic record of a failed boot attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootFailure {
    /// State whose gate was being evaluated
    pub stage: BootState,

    pub error: BootError,
    pub kind: ErrorKind,

    /// Tamper events observed, plus `GLITCH` for control-flow faults
    pub tamper_events: TamperEvents,
}

/// Boot Outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    Success(AttestationReport),
    Failure(BootFailure),
}

impl BootOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BootOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&AttestationReport> {
        match self {
            BootOutcome::Success(report) => Some(report),
            BootOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&BootFailure> {
        match self {
            BootOutcome::Success(_) => None,
            BootOutcome::Failure(failure) => Some(failure),
        }
    }
}

/// Run one secure boot attempt.
///
/// # Arguments
///
/// * `env` - Boot environment
/// * `params` - Image and identities to boot
/// * `latch` - Tamper latch shared with the tamper interrupt
///
/// # Returns
///
/// * `BootOutcome` - Signed report, or the failing stage and tamper mask
pub fn run_secure_boot<'a>(
    env: BootEnv<'a>,
    params: BootParams<'a>,
    latch: &'a TamperLatch,
) -> BootOutcome {
    BootSequencer::new(env, params, latch).run()
}
