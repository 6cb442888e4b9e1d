// Licensed under the Apache-2.0 license

use crate::helpers::{boot_params, sha256, vendor_pub_key, Platform, TestImage};
use hardboot_emu_crypto::EmuCrypto;
use hardboot_rom::{
    run_secure_boot, AttestationLedger, AttestationReport, MeasurementStage, TamperLatch,
    ATTESTATION_VERSION, NONCE_SIZE,
};

fn attest(nonce: [u8; NONCE_SIZE], boot_count: u32) -> AttestationReport {
    let latch = TamperLatch::new();
    let image = TestImage::new(2);
    let mut platform = Platform::new().with_stored_version(2);
    let mut params = boot_params(&image);
    params.nonce = nonce;
    params.boot_count = boot_count;

    let outcome = run_secure_boot(platform.env(), params, &latch);
    outcome.report().cloned().unwrap()
}

#[test]
fn test_relying_party_verifies_report() {
    let report = attest([0x10; NONCE_SIZE], 4);
    let crypto = EmuCrypto::new();
    let verifier = AttestationLedger::new(&crypto);

    // The attestation public key is itself measured into the report.
    let vault = report
        .measurements()
        .iter()
        .find(|m| m.stage == MeasurementStage::SecureVault as u32)
        .unwrap();
    assert_eq!(vault.digest, sha256(report.signer()));

    assert!(verifier.verify(&report, report.signer()));
    assert!(!verifier.verify(&report, &vendor_pub_key()));
    assert_eq!(report.body().version, ATTESTATION_VERSION);
    assert_eq!(report.boot_count(), 4);
}

#[test]
fn test_report_binds_nonce() {
    let a = attest([0x10; NONCE_SIZE], 1);
    let b = attest([0x20; NONCE_SIZE], 1);

    assert_eq!(a.signer(), b.signer());
    assert_eq!(a.measurements(), b.measurements());
    assert_ne!(a.signature(), b.signature());
    assert_eq!(b.nonce(), &[0x20; NONCE_SIZE]);
}

#[test]
fn test_report_is_reproducible() {
    let a = attest([0x33; NONCE_SIZE], 7);
    let b = attest([0x33; NONCE_SIZE], 7);
    assert_eq!(a, b);
}
