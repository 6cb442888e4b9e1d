// Licensed under the Apache-2.0 license

use crate::helpers::{boot_params, Platform, TestImage, TRNG_SEED};
use hardboot_drivers::{ErrorKind, SensorSample, ThresholdCrossing};
use hardboot_emu_periph::EmuTrng;
use hardboot_rom::{
    run_secure_boot, BootOutcome, BootState, TamperConfig, TamperEvents, TamperIrq, TamperLatch,
};

const NOMINAL: SensorSample = SensorSample {
    voltage_mv: 3300,
    temperature_c: 25,
    clock_stable: true,
};

const BROWNOUT: SensorSample = SensorSample {
    voltage_mv: 2000,
    temperature_c: 25,
    clock_stable: true,
};

/// Boot with a supply glitch delivered by the tamper interrupt right before
/// TRNG draw `at`.
fn boot_with_glitch_at(at: u32) -> (BootOutcome, u32, u32) {
    let latch = TamperLatch::new();
    let irq = TamperIrq::new(&latch, TamperConfig::default());
    let trng = EmuTrng::new(TRNG_SEED).with_hook(move |draw| {
        if draw == at {
            irq.on_threshold_crossing(&ThresholdCrossing {
                previous: NOMINAL,
                current: BROWNOUT,
            });
        }
    });

    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.trng = trng;
    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    (outcome, platform.halt.halt_count(), platform.stored_version())
}

/// TRNG draws taken by an undisturbed boot.
fn draws_per_boot() -> u32 {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    assert!(run_secure_boot(platform.env(), boot_params(&image), &latch).is_success());
    platform.trng.draws()
}

#[test]
fn test_glitch_interrupt_during_boot_fails_closed() {
    let total = draws_per_boot();
    assert!(total > 20);

    // Every draw is followed by at least one checkpoint.
    for at in 0..total {
        let (outcome, halts, _) = boot_with_glitch_at(at);
        let failure = outcome.failure().unwrap_or_else(|| panic!("glitch at draw {at} ignored"));
        assert_eq!(failure.kind, ErrorKind::GlitchDetected, "draw {at}");
        assert!(
            failure
                .tamper_events
                .contains(TamperEvents::GLITCH | TamperEvents::VOLTAGE_LOW),
            "draw {at}"
        );
        assert_eq!(halts, 1, "draw {at}");
    }
}

#[test]
fn test_glitch_before_rollback_leaves_counter() {
    // A glitch raised while the tokens are verified stops the boot before
    // the rollback counter is touched.
    let (outcome, _, stored) = boot_with_glitch_at(12);
    let failure = outcome.failure().unwrap();
    assert_ne!(failure.stage, BootState::Success);
    assert_ne!(failure.stage, BootState::AttestationGenerated);
    assert_eq!(stored, 0);
}

#[test]
fn test_glitch_after_boot_is_not_reported() {
    let total = draws_per_boot();
    let (outcome, halts, stored) = boot_with_glitch_at(total + 5);
    assert!(outcome.is_success());
    assert_eq!(halts, 0);
    assert_eq!(stored, 1);
}
