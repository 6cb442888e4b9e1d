// Licensed under the Apache-2.0 license

use crate::helpers::{boot_params, Platform, TestImage};
use hardboot_drivers::{BootError, ErrorKind};
use hardboot_emu_crypto::Ed25519;
use hardboot_rom::{
    run_secure_boot, BootOutcome, BootParams, BootState, FirmwareImage, TamperLatch,
    FW_MAX_IMAGE_SIZE,
};
use zerocopy::IntoBytes;

fn boot(params: BootParams) -> (BootOutcome, u32) {
    let latch = TamperLatch::new();
    let mut platform = Platform::new();
    let outcome = run_secure_boot(platform.env(), params, &latch);
    (outcome, platform.halt.halt_count())
}

fn assert_rejected(outcome: &BootOutcome, error: BootError) {
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::SignatureVerified);
    assert_eq!(failure.error, error);
    assert_eq!(failure.kind, ErrorKind::AuthenticationFailure);
}

#[test]
fn test_staged_image_boots() {
    let image = TestImage::new(1);
    let mut staged = image.header.as_bytes().to_vec();
    staged.extend_from_slice(&image.signature);
    staged.extend_from_slice(&image.payload);

    let mut params = boot_params(&image);
    params.firmware = FirmwareImage::parse(&staged).unwrap();
    let (outcome, halts) = boot(params);
    assert!(outcome.is_success());
    assert_eq!(halts, 0);
}

#[test]
fn test_bad_signature() {
    let mut image = TestImage::new(1);
    image.signature[7] ^= 0x20;

    let (outcome, halts) = boot(boot_params(&image));
    assert_rejected(&outcome, BootError::BOOT_FW_SIGNATURE_INVALID);
    assert_eq!(halts, 1);
}

#[test]
fn test_wrong_vendor_key() {
    let image = TestImage::new(1);
    let mut params = boot_params(&image);
    params.vendor_pub_key = Ed25519::public_key(&[0x01; 32]);

    let (outcome, _) = boot(params);
    assert_rejected(&outcome, BootError::BOOT_FW_SIGNATURE_INVALID);
}

#[test]
fn test_unsigned_header_change() {
    let mut image = TestImage::new(1);
    image.header.entry_point += 4;

    let (outcome, _) = boot(boot_params(&image));
    assert_rejected(&outcome, BootError::BOOT_FW_SIGNATURE_INVALID);
}

#[test]
fn test_tampered_payload() {
    let mut image = TestImage::new(1);
    image.payload[0] ^= 0xFF;

    let (outcome, _) = boot(boot_params(&image));
    assert_rejected(&outcome, BootError::BOOT_FW_DIGEST_MISMATCH);
}

#[test]
fn test_bad_magic() {
    let mut image = TestImage::new(1);
    image.header.magic = 0xDEAD_BEEF;
    image.sign();

    let (outcome, _) = boot(boot_params(&image));
    assert_rejected(&outcome, BootError::BOOT_FW_INVALID_MAGIC);
}

#[test]
fn test_oversized_image() {
    let image = TestImage::with_payload(1, vec![0x5A; FW_MAX_IMAGE_SIZE as usize + 1]);

    let (outcome, _) = boot(boot_params(&image));
    assert_rejected(&outcome, BootError::BOOT_FW_INVALID_SIZE);
}

#[test]
fn test_truncated_payload() {
    let mut image = TestImage::new(1);
    image.payload.pop();

    let (outcome, _) = boot(boot_params(&image));
    assert_rejected(&outcome, BootError::BOOT_FW_INVALID_SIZE);
}

#[test]
fn test_signature_checked_before_rollback() {
    let mut image = TestImage::new(9);
    image.signature[0] ^= 1;

    let latch = TamperLatch::new();
    let mut platform = Platform::new();
    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    assert_rejected(&outcome, BootError::BOOT_FW_SIGNATURE_INVALID);
    assert_eq!(platform.stored_version(), 0);
}
