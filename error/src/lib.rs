/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the boot error codes and the error kind taxonomy shared by
    every hardboot crate.

--*/
#![cfg_attr(not(any(test, feature = "std")), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Hardboot Error Type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BootError(pub NonZeroU32);

/// Coarse classification of a [`BootError`].
///
/// Every error code belongs to exactly one kind. The kind decides how the
/// boot sequencer reacts; the code is kept for forensics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// A bounded hardware wait was exhausted.
    HardwareTimeout,

    /// A signature, tag or identity check did not match, or key material was
    /// requested from a locked vault.
    AuthenticationFailure,

    /// Candidate firmware is older than the stored counter, or the counter
    /// could not be advanced.
    RollbackRejected,

    /// Environmental sensors left their configured window.
    TamperDetected,

    /// A fault signature was observed: voltage slew, clock anomaly or a
    /// control-flow integrity check disagreeing with itself.
    GlitchDetected,

    /// Write-once storage cannot be read or has no room left, or a
    /// fixed-capacity log is full.
    StorageExhausted,
}

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, kind, doc) tuples and generates
/// constant definitions for each error code together with the code to kind
/// lookup table.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:literal, $kind:ident, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: BootError = BootError::new_const($value);
        )*

        /// Returns the kind this error code is classified as.
        ///
        /// Codes outside the table only arise from a corrupted `u32`, so they
        /// are classified with the most severe kind.
        pub const fn kind(&self) -> ErrorKind {
            match self.0.get() {
                $(
                    $value => ErrorKind::$kind,
                )*
                _ => ErrorKind::GlitchDetected,
            }
        }

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl BootError {
    /// Create a boot error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a BootError from a u32 is to
    /// use `BootError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("BootError cannot be 0"),
        }
    }

    define_error_constants![
        (
            DRIVER_TRNG_TIMEOUT,
            0x0001_0001,
            HardwareTimeout,
            "TRNG did not report entropy within the poll budget"
        ),
        (
            DRIVER_PUF_TIMEOUT,
            0x0001_0002,
            HardwareTimeout,
            "PUF key reconstruction did not complete within the poll budget"
        ),
        (
            DRIVER_SENSOR_TIMEOUT,
            0x0001_0003,
            HardwareTimeout,
            "Sensor conversion did not complete within the poll budget"
        ),
        (
            DRIVER_OTP_READ_FAILURE,
            0x0001_0004,
            StorageExhausted,
            "OTP read failed"
        ),
        (
            DRIVER_OTP_WRITE_FAILURE,
            0x0001_0005,
            RollbackRejected,
            "OTP program operation failed"
        ),
        (
            DRIVER_OTP_REGION_LOCKED,
            0x0001_0006,
            StorageExhausted,
            "OTP region is locked against further programming"
        ),
        (
            DRIVER_OTP_ADDRESS_OUT_OF_RANGE,
            0x0001_0007,
            StorageExhausted,
            "OTP address is outside the fuse array"
        ),
        (
            DRIVER_PUF_ENROLLMENT_FAILURE,
            0x0001_0008,
            AuthenticationFailure,
            "PUF enrollment failed"
        ),
        (
            DRIVER_PUF_NOT_ENROLLED,
            0x0001_0009,
            AuthenticationFailure,
            "PUF has no enrollment helper data"
        ),
        (
            DRIVER_SENSOR_IRQ_UNAVAILABLE,
            0x0001_000A,
            TamperDetected,
            "Sensor threshold interrupt could not be armed"
        ),
        (
            CFI_TOKEN_INVALID,
            0x0002_0001,
            GlitchDetected,
            "Control flow token verification failed"
        ),
        (
            CFI_COUNTER_CORRUPT,
            0x0002_0002,
            GlitchDetected,
            "CFI counter masked copy does not decode"
        ),
        (
            CFI_COUNTER_OVERFLOW,
            0x0002_0003,
            GlitchDetected,
            "CFI counter overflow"
        ),
        (
            CFI_COUNTER_MISMATCH,
            0x0002_0004,
            GlitchDetected,
            "CFI counter does not match the expected step count"
        ),
        (
            CFI_CHECK_EQ_FAILURE,
            0x0002_0005,
            GlitchDetected,
            "Redundant equality check failed"
        ),
        (
            CFI_CHECK_NE_FAILURE,
            0x0002_0006,
            GlitchDetected,
            "Redundant inequality check failed"
        ),
        (
            CFI_CHECK_GT_FAILURE,
            0x0002_0007,
            GlitchDetected,
            "Redundant greater-than check failed"
        ),
        (
            CFI_CHECK_LT_FAILURE,
            0x0002_0008,
            GlitchDetected,
            "Redundant less-than check failed"
        ),
        (
            CFI_CHECK_GE_FAILURE,
            0x0002_0009,
            GlitchDetected,
            "Redundant greater-or-equal check failed"
        ),
        (
            CFI_CHECK_LE_FAILURE,
            0x0002_000A,
            GlitchDetected,
            "Redundant less-or-equal check failed"
        ),
        (
            CFI_ILLEGAL_TRANSITION,
            0x0002_000B,
            GlitchDetected,
            "Boot state machine attempted a transition that is not the legal successor"
        ),
        (
            TAMPER_VOLTAGE_OUT_OF_RANGE,
            0x0003_0001,
            TamperDetected,
            "Supply voltage outside the configured window"
        ),
        (
            TAMPER_TEMPERATURE_OUT_OF_RANGE,
            0x0003_0002,
            TamperDetected,
            "Die temperature outside the configured window"
        ),
        (
            TAMPER_VOLTAGE_GLITCH,
            0x0003_0003,
            GlitchDetected,
            "Voltage slew between consecutive samples exceeded the glitch delta"
        ),
        (
            TAMPER_CLOCK_ANOMALY,
            0x0003_0004,
            GlitchDetected,
            "Clock monitor reported an unstable clock"
        ),
        (
            TAMPER_MONITOR_NOT_ARMED,
            0x0003_0005,
            TamperDetected,
            "Tamper monitor was sampled before it was armed"
        ),
        (
            TAMPER_MONITOR_HALTED,
            0x0003_0006,
            GlitchDetected,
            "Tamper monitor is halted"
        ),
        (
            KEY_VAULT_AUTH_FAILURE,
            0x0004_0001,
            AuthenticationFailure,
            "Wrapped key failed authentication"
        ),
        (
            KEY_VAULT_LOCKED,
            0x0004_0002,
            AuthenticationFailure,
            "Key vault is locked"
        ),
        (
            KEY_VAULT_INVALID_KEY_SIZE,
            0x0004_0003,
            AuthenticationFailure,
            "Key length is zero or exceeds the vault limit"
        ),
        (
            KEY_VAULT_INVALID_LABEL,
            0x0004_0004,
            AuthenticationFailure,
            "Key derivation label is empty"
        ),
        (
            KEY_VAULT_SLOT_EMPTY,
            0x0004_0005,
            AuthenticationFailure,
            "Key slot has not been loaded"
        ),
        (
            KEY_VAULT_INVALID_KEY_TYPE,
            0x0004_0006,
            AuthenticationFailure,
            "Wrapped key carries an unknown type tag"
        ),
        (
            ROLLBACK_VERSION_REJECTED,
            0x0005_0001,
            RollbackRejected,
            "Candidate version is older than the stored counter"
        ),
        (
            ROLLBACK_COUNTER_CEILING,
            0x0005_0002,
            StorageExhausted,
            "Candidate version exceeds the counter capacity"
        ),
        (
            ROLLBACK_INCREMENT_FAILURE,
            0x0005_0003,
            RollbackRejected,
            "Counter increment read back a different value"
        ),
        (
            ROLLBACK_COUNTER_CORRUPT,
            0x0005_0004,
            RollbackRejected,
            "Counter words are not a thermometer code"
        ),
        (
            ATTESTATION_LEDGER_FULL,
            0x0006_0001,
            StorageExhausted,
            "Measurement ledger is full"
        ),
        (
            ATTESTATION_EVENT_LOG_FULL,
            0x0006_0002,
            StorageExhausted,
            "Boot event log is full"
        ),
        (
            ATTESTATION_EMPTY_MEASUREMENT,
            0x0006_0003,
            AuthenticationFailure,
            "Measurement data is empty"
        ),
        (
            BOOT_ROOT_OF_TRUST_UNTRUSTED,
            0x0007_0001,
            AuthenticationFailure,
            "Root of trust region is outside the trusted domain"
        ),
        (
            BOOT_FW_INVALID_MAGIC,
            0x0007_0002,
            AuthenticationFailure,
            "Firmware header magic mismatch"
        ),
        (
            BOOT_FW_INVALID_SIZE,
            0x0007_0003,
            AuthenticationFailure,
            "Firmware image size is zero, too large or disagrees with the payload"
        ),
        (
            BOOT_FW_DIGEST_MISMATCH,
            0x0007_0004,
            AuthenticationFailure,
            "Firmware payload digest does not match the header"
        ),
        (
            BOOT_FW_SIGNATURE_INVALID,
            0x0007_0005,
            AuthenticationFailure,
            "Firmware header signature verification failed"
        ),
        (
            CRYPTO_AEAD_FAILURE,
            0x0008_0001,
            AuthenticationFailure,
            "AEAD operation failed"
        ),
        (
            CRYPTO_KDF_FAILURE,
            0x0008_0002,
            AuthenticationFailure,
            "Key derivation failed"
        ),
        (
            CRYPTO_SIGN_FAILURE,
            0x0008_0003,
            AuthenticationFailure,
            "Signing failed"
        ),
        (
            CRYPTO_INVALID_KEY,
            0x0008_0004,
            AuthenticationFailure,
            "Key encoding rejected by the crypto provider"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::BootError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::BootError(val)
    }
}

impl From<BootError> for core::num::NonZeroU32 {
    fn from(val: BootError) -> Self {
        val.0
    }
}

impl From<BootError> for u32 {
    fn from(val: BootError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for BootError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(BootError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type BootResult<T> = Result<T, BootError>;
