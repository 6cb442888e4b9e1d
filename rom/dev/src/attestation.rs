/*++

Licensed under the Apache-2.0 license.

File Name:

    attestation.rs

Abstract:

    File contains the measurement ledger, the boot event log and signed
    attestation report generation.

--*/

use crate::context::BootState;
use hardboot_cfi_lib::cfi_bytes_eq;
use hardboot_drivers::{
    cprintln, BootError, BootResult, CryptoProvider, HexWord, PubKey, Sha256Digest, Signature,
    DIGEST_SIZE, SYMMETRIC_KEY_SIZE,
};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

/// Capacity of the measurement list.
pub const MAX_MEASUREMENTS: usize = 16;

/// Capacity of the boot event log.
pub const MAX_EVENT_LOG_ENTRIES: usize = 32;

/// Length of the relying party nonce.
pub const NONCE_SIZE: usize = 16;

/// Report format version.
pub const ATTESTATION_VERSION: u32 = 1;

/// Set in [`ReportBody::flags`] when the diagnostics block is populated.
pub const REPORT_FLAG_DIAGNOSTICS: u32 = 0x1;

/// Boot stage a measurement belongs to
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementStage {
    Bootloader = 1,
    RootOfTrust = 2,
    SecureVault = 3,
    Firmware = 4,
    Application = 5,
}

impl TryFrom<u32> for MeasurementStage {
    type Error = ();

    fn try_from(val: u32) -> Result<Self, ()> {
        match val {
            1 => Ok(Self::Bootloader),
            2 => Ok(Self::RootOfTrust),
            3 => Ok(Self::SecureVault),
            4 => Ok(Self::Firmware),
            5 => Ok(Self::Application),
            _ => Err(()),
        }
    }
}

/// Measurement entry
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct Measurement {
    pub stage: u32,
    pub digest: [u8; DIGEST_SIZE],
}

/// Boot event log entry
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct BootEvent {
    /// Boot state the event was raised in
    pub state: u32,

    /// Error code, zero for informational events
    pub error: u32,
}

/// Verbose fields, only populated when debug is unlocked
#[repr(C)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout,
)]
pub struct Diagnostics {
    pub jitter_calls: u32,
    pub jitter_fallbacks: u32,

    /// Total delay units spent, saturated at `u32::MAX`
    pub jitter_units: u32,

    pub puf_reconstructions: u32,
    pub event_count: u32,
}

/// Signed portion of an attestation report
#[repr(C)]
#[derive(Debug, Clone, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct ReportBody {
    pub version: u32,
    pub flags: u32,
    pub boot_count: u32,
    pub firmware_version: u32,
    pub tamper_events: u32,
    pub measurement_count: u32,
    pub nonce: [u8; NONCE_SIZE],
    pub measurements: [Measurement; MAX_MEASUREMENTS],
    pub diagnostics: Diagnostics,
}

/// Signed attestation report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationReport {
    body: ReportBody,
    signature: Signature,
    signer: PubKey,
}

impl AttestationReport {
    pub fn body(&self) -> &ReportBody {
        &self.body
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Public key of the attestation key that signed the report.
    pub fn signer(&self) -> &PubKey {
        &self.signer
    }

    /// Recorded measurements, in order.
    pub fn measurements(&self) -> &[Measurement] {
        let count = (self.body.measurement_count as usize).min(MAX_MEASUREMENTS);
        &self.body.measurements[..count]
    }

    pub fn boot_count(&self) -> u32 {
        self.body.boot_count
    }

    pub fn firmware_version(&self) -> u32 {
        self.body.firmware_version
    }

    pub fn tamper_events(&self) -> u32 {
        self.body.tamper_events
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.body.nonce
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        if self.body.flags & REPORT_FLAG_DIAGNOSTICS != 0 {
            Some(&self.body.diagnostics)
        } else {
            None
        }
    }

    /// Mutable access for tests that tamper with a signed report.
    #[cfg(test)]
    pub(crate) fn body_mut(&mut self) -> &mut ReportBody {
        &mut self.body
    }
}

/// Values snapshotted into a report besides the measurements
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportInputs {
    pub boot_count: u32,
    pub firmware_version: u32,
    pub tamper_events: u32,
    pub nonce: [u8; NONCE_SIZE],
    pub diagnostics: Option<Diagnostics>,
}

/// Attestation Ledger
pub struct AttestationLedger<'a> {
    crypto: &'a dyn CryptoProvider,
    measurements: [Measurement; MAX_MEASUREMENTS],
    count: usize,
    events: [BootEvent; MAX_EVENT_LOG_ENTRIES],
    event_count: usize,
}

impl<'a> AttestationLedger<'a> {
    pub fn new(crypto: &'a dyn CryptoProvider) -> Self {
        Self {
            crypto,
            measurements: FromZeros::new_zeroed(),
            count: 0,
            events: FromZeros::new_zeroed(),
            event_count: 0,
        }
    }

    /// Hash `data` and append it as the measurement of `stage`.
    ///
    /// # Returns
    ///
    /// * `BootResult<()>` - `ATTESTATION_LEDGER_FULL` once all slots are used;
    ///   the list is left unchanged
    pub(crate) fn record(&mut self, stage: MeasurementStage, data: &[u8]) -> BootResult<()> {
        if data.is_empty() {
            return Err(BootError::ATTESTATION_EMPTY_MEASUREMENT);
        }
        if self.is_full() {
            return Err(BootError::ATTESTATION_LEDGER_FULL);
        }
        let digest = self.crypto.sha256(data)?;
        self.record_digest(stage, &digest)
    }

    /// Append an already computed digest as the measurement of `stage`.
    pub(crate) fn record_digest(
        &mut self,
        stage: MeasurementStage,
        digest: &Sha256Digest,
    ) -> BootResult<()> {
        if self.is_full() {
            cprintln!("[attest] ledger full");
            return Err(BootError::ATTESTATION_LEDGER_FULL);
        }
        self.measurements[self.count] = Measurement {
            stage: stage as u32,
            digest: *digest,
        };
        self.count += 1;
        cprintln!("[attest] measured stage {}", stage as u32);
        Ok(())
    }

    /// Append an entry to the boot event log.
    pub(crate) fn log_event(&mut self, state: BootState, error: u32) -> BootResult<()> {
        if self.event_count >= MAX_EVENT_LOG_ENTRIES {
            return Err(BootError::ATTESTATION_EVENT_LOG_FULL);
        }
        self.events[self.event_count] = BootEvent {
            state: state.into(),
            error,
        };
        self.event_count += 1;
        cprintln!(
            "[attest] event {} {}",
            HexWord(state.into()),
            HexWord(error)
        );
        Ok(())
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements[..self.count]
    }

    pub fn events(&self) -> &[BootEvent] {
        &self.events[..self.event_count]
    }

    /// First measurement recorded for `stage`.
    pub fn get_measurement(&self, stage: MeasurementStage) -> Option<&Measurement> {
        self.measurements()
            .iter()
            .find(|m| m.stage == stage as u32)
    }

    pub fn is_full(&self) -> bool {
        self.count >= MAX_MEASUREMENTS
    }

    /// Snapshot the ledger into a report signed with `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - Attestation signing key
    /// * `inputs` - Boot count, firmware version, tamper mask, nonce and
    ///   optional diagnostics
    ///
    /// # Returns
    ///
    /// * `BootResult<AttestationReport>` - Report over SHA-256 of the body
    pub(crate) fn generate(
        &self,
        key: &[u8; SYMMETRIC_KEY_SIZE],
        inputs: &ReportInputs,
    ) -> BootResult<AttestationReport> {
        let mut body = ReportBody::new_zeroed();
        body.version = ATTESTATION_VERSION;
        body.boot_count = inputs.boot_count;
        body.firmware_version = inputs.firmware_version;
        body.tamper_events = inputs.tamper_events;
        body.measurement_count = self.count as u32;
        body.nonce = inputs.nonce;
        body.measurements[..self.count].copy_from_slice(self.measurements());
        if let Some(diagnostics) = inputs.diagnostics {
            body.flags |= REPORT_FLAG_DIAGNOSTICS;
            body.diagnostics = diagnostics;
        }

        let digest = self.crypto.sha256(body.as_bytes())?;
        let signature = self.crypto.sign(&digest, key)?;
        let signer = self.crypto.public_key(key)?;
        cprintln!("[attest] report with {} measurements", self.count as u32);

        Ok(AttestationReport {
            body,
            signature,
            signer,
        })
    }

    /// Relying party check of `report` against `trusted_key`.
    ///
    /// Structure is validated here; the signature itself is checked by the
    /// crypto provider.
    pub fn verify(&self, report: &AttestationReport, trusted_key: &PubKey) -> bool {
        Self::verify_structure(report)
            && cfi_bytes_eq(report.signer(), trusted_key)
            && self.verify_signature(report, trusted_key)
    }

    fn verify_structure(report: &AttestationReport) -> bool {
        let body = report.body();
        if body.version != ATTESTATION_VERSION {
            return false;
        }
        if body.flags & !REPORT_FLAG_DIAGNOSTICS != 0 {
            return false;
        }
        let count = body.measurement_count as usize;
        if count > MAX_MEASUREMENTS {
            return false;
        }
        let (used, unused) = body.measurements.split_at(count);
        if used
            .iter()
            .any(|m| MeasurementStage::try_from(m.stage).is_err())
        {
            return false;
        }
        if unused.as_bytes().iter().any(|&b| b != 0) {
            return false;
        }
        if report.diagnostics().is_none() && body.diagnostics != Diagnostics::default() {
            return false;
        }
        report.signature().iter().any(|&b| b != 0)
    }

    fn verify_signature(&self, report: &AttestationReport, trusted_key: &PubKey) -> bool {
        let digest = match self.crypto.sha256(report.body().as_bytes()) {
            Ok(digest) => digest,
            Err(_) => return false,
        };
        matches!(
            self.crypto.verify(&digest, report.signature(), trusted_key),
            Ok(true)
        )
    }
}
