// Licensed under the Apache-2.0 license

use crate::helpers::{boot_params, rollback_region, Platform, TestImage};
use hardboot_drivers::{BootError, ErrorKind};
use hardboot_rom::{run_secure_boot, BootState, TamperLatch, OTP_COUNTER_WORDS};

fn boot(platform: &mut Platform, version: u32) -> hardboot_rom::BootOutcome {
    let latch = TamperLatch::new();
    let image = TestImage::new(version);
    run_secure_boot(platform.env(), boot_params(&image), &latch)
}

#[test]
fn test_older_firmware_rejected() {
    let mut platform = Platform::new().with_stored_version(5);

    let outcome = boot(&mut platform, 4);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::RollbackVerified);
    assert_eq!(failure.error, BootError::ROLLBACK_VERSION_REJECTED);
    assert_eq!(failure.kind, ErrorKind::RollbackRejected);
    assert!(failure.tamper_events.is_empty());

    assert_eq!(platform.stored_version(), 5);
    assert_eq!(platform.otp.writes(), 0);
    assert_eq!(platform.halt.halt_count(), 1);
}

#[test]
fn test_newer_firmware_advances_counter() {
    let mut platform = Platform::new().with_stored_version(2);

    let outcome = boot(&mut platform, 6);
    assert!(outcome.is_success());
    assert_eq!(outcome.report().unwrap().firmware_version(), 6);
    assert_eq!(platform.stored_version(), 6);

    // The old image can no longer boot.
    let outcome = boot(&mut platform, 5);
    assert_eq!(
        outcome.failure().unwrap().error,
        BootError::ROLLBACK_VERSION_REJECTED
    );
    assert_eq!(platform.stored_version(), 6);
}

#[test]
fn test_counter_ceiling() {
    let ceiling = OTP_COUNTER_WORDS * 32;
    let mut platform = Platform::new().with_stored_version(ceiling - 1);

    let outcome = boot(&mut platform, ceiling + 1);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.error, BootError::ROLLBACK_COUNTER_CEILING);
    assert_eq!(failure.kind, ErrorKind::StorageExhausted);
    assert_eq!(platform.stored_version(), ceiling - 1);

    let outcome = boot(&mut platform, ceiling);
    assert!(outcome.is_success());
    assert_eq!(platform.stored_version(), ceiling);
    assert!(platform.otp.is_locked(rollback_region().base));
}

#[test]
fn test_otp_write_failure_rejects_boot() {
    let mut platform = Platform::new().with_stored_version(1);
    platform.otp.fail_writes_after(2);

    let outcome = boot(&mut platform, 8);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::RollbackVerified);
    assert_eq!(failure.error, BootError::ROLLBACK_INCREMENT_FAILURE);
    assert_eq!(failure.kind, ErrorKind::RollbackRejected);

    // Increments already programmed stay; the counter never passes the
    // candidate.
    assert_eq!(platform.stored_version(), 3);
    assert_eq!(platform.halt.halt_count(), 1);
}
