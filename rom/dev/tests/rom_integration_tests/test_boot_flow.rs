// Licensed under the Apache-2.0 license

use crate::helpers::{
    boot_params, sha256, Platform, TestImage, BOOTLOADER_IDENTITY, NONCE, PUF_ROOT, ROT_IDENTITY,
};
use hardboot_drivers::{BootError, ErrorKind};
use hardboot_emu_periph::{EmuDebug, EmuIsolation, EmuPuf};
use hardboot_rom::{run_secure_boot, BootState, MeasurementStage, TamperLatch};

#[test]
fn test_cold_boot_success() {
    let latch = TamperLatch::new();
    let image = TestImage::new(3);
    let mut platform = Platform::new().with_stored_version(3);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    assert!(outcome.is_success(), "{:?}", outcome.failure());
    let report = outcome.report().unwrap();

    let stages: Vec<u32> = report.measurements().iter().map(|m| m.stage).collect();
    assert_eq!(
        stages,
        [
            MeasurementStage::Bootloader as u32,
            MeasurementStage::RootOfTrust as u32,
            MeasurementStage::SecureVault as u32,
            MeasurementStage::Firmware as u32,
        ]
    );
    let m = report.measurements();
    assert_eq!(m[0].digest, sha256(BOOTLOADER_IDENTITY));
    assert_eq!(m[1].digest, sha256(ROT_IDENTITY));
    assert_eq!(m[2].digest, sha256(report.signer()));
    assert_eq!(m[3].digest, sha256(&image.payload));

    assert_eq!(report.boot_count(), 1);
    assert_eq!(report.firmware_version(), 3);
    assert_eq!(report.tamper_events(), 0);
    assert_eq!(report.nonce(), &NONCE);
    assert!(report.diagnostics().is_none());

    assert_eq!(platform.halt.halt_count(), 0);
    assert_eq!(platform.stored_version(), 3);
    assert_eq!(platform.otp.writes(), 0);
    assert_eq!(platform.sensors.conversions(), 2);
}

#[test]
fn test_untrusted_isolation_boundary() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.isolation = EmuIsolation::open();

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::RootOfTrustChecked);
    assert_eq!(failure.error, BootError::BOOT_ROOT_OF_TRUST_UNTRUSTED);
    assert_eq!(failure.kind, ErrorKind::AuthenticationFailure);
    assert!(failure.tamper_events.is_empty());
    assert_eq!(platform.halt.halt_count(), 1);
    assert_eq!(platform.puf.reconstructions(), 0);
}

#[test]
fn test_unenrolled_device_enrolls_on_first_boot() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.puf = EmuPuf::new(PUF_ROOT);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    assert!(outcome.is_success());
    assert_eq!(platform.puf.enrollments(), 1);
    assert_eq!(platform.stored_version(), 1);
}

#[test]
fn test_attestation_key_is_device_bound() {
    let image = TestImage::new(1);

    let boot = |root: [u8; 32]| {
        let latch = TamperLatch::new();
        let mut platform = Platform::new();
        platform.puf = EmuPuf::enrolled(root);
        let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
        *outcome.report().unwrap().signer()
    };

    assert_eq!(boot(PUF_ROOT), boot(PUF_ROOT));
    assert_ne!(boot(PUF_ROOT), boot([0x11; 32]));
}

#[test]
fn test_puf_stall_times_out() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.puf.set_stalled(true);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::RootOfTrustChecked);
    assert_eq!(failure.error, BootError::DRIVER_PUF_TIMEOUT);
    assert_eq!(failure.kind, ErrorKind::HardwareTimeout);
    assert_eq!(platform.halt.halt_count(), 1);
}

#[test]
fn test_trng_starvation_times_out() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.trng.set_ready(false);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::Init);
    assert_eq!(failure.error, BootError::DRIVER_TRNG_TIMEOUT);
    assert_eq!(failure.kind, ErrorKind::HardwareTimeout);
    assert_eq!(platform.halt.halt_count(), 1);
}

#[test]
fn test_debug_unlocked_report_carries_diagnostics() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.debug = EmuDebug::new(true);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let report = outcome.report().unwrap();
    let diagnostics = report.diagnostics().unwrap();
    assert!(diagnostics.jitter_calls > 0);
    assert!(diagnostics.jitter_units >= diagnostics.jitter_calls);
    assert_eq!(diagnostics.puf_reconstructions, 1);
    assert_eq!(diagnostics.event_count, 0);
}
