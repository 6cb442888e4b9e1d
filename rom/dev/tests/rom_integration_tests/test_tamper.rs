// Licensed under the Apache-2.0 license

use crate::helpers::{boot_params, Platform, TestImage};
use hardboot_drivers::{BootError, ErrorKind};
use hardboot_emu_periph::EmuSensors;
use hardboot_rom::{run_secure_boot, BootState, TamperEvents, TamperLatch};

#[test]
fn test_undervoltage_fails_boot() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.sensors = EmuSensors::new(2000, 25);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::Init);
    assert_eq!(failure.error, BootError::TAMPER_VOLTAGE_OUT_OF_RANGE);
    assert_eq!(failure.kind, ErrorKind::TamperDetected);
    assert!(failure.tamper_events.contains(TamperEvents::VOLTAGE_LOW));
    assert!(!failure.tamper_events.contains(TamperEvents::GLITCH));

    assert_eq!(platform.halt.halt_count(), 1);
    assert_eq!(platform.puf.reconstructions(), 0);
    assert_eq!(platform.stored_version(), 0);
}

#[test]
fn test_brownout_after_arming_fails_at_tamper_gate() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.sensors = EmuSensors::nominal().with_script(&[3300, 2000]);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::TamperChecked);
    assert!(failure
        .tamper_events
        .contains(TamperEvents::VOLTAGE_LOW | TamperEvents::GLITCH));
    assert_eq!(failure.kind, ErrorKind::GlitchDetected);
    assert_eq!(platform.halt.halt_count(), 1);
}

#[test]
fn test_step_inside_window_is_a_glitch() {
    // Both samples are inside the window; only the slew between them is
    // out of bounds.
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.sensors = EmuSensors::nominal().with_script(&[3300, 2950]);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::TamperChecked);
    assert_eq!(failure.error, BootError::TAMPER_VOLTAGE_GLITCH);
    assert_eq!(failure.kind, ErrorKind::GlitchDetected);
    assert!(failure.tamper_events.contains(TamperEvents::GLITCH));
    assert!(!failure
        .tamper_events
        .intersects(TamperEvents::VOLTAGE_LOW | TamperEvents::VOLTAGE_HIGH));
    assert_eq!(platform.halt.halt_count(), 1);
    assert_eq!(platform.stored_version(), 0);
}

#[test]
fn test_slow_drift_inside_window_boots() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.sensors = EmuSensors::nominal().with_script(&[3300, 3150]);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    assert!(outcome.is_success(), "{:?}", outcome.failure());
    assert_eq!(platform.halt.halt_count(), 0);
}

#[test]
fn test_overtemperature_fails_boot() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.sensors = EmuSensors::new(3300, 95);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::Init);
    assert_eq!(failure.error, BootError::TAMPER_TEMPERATURE_OUT_OF_RANGE);
    assert_eq!(failure.kind, ErrorKind::TamperDetected);
    assert!(failure.tamper_events.contains(TamperEvents::TEMP_HIGH));
    assert_eq!(platform.halt.halt_count(), 1);
}

#[test]
fn test_unstable_clock_is_a_glitch() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.sensors.set_clock_stable(false);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::Init);
    assert_eq!(failure.error, BootError::TAMPER_CLOCK_ANOMALY);
    assert_eq!(failure.kind, ErrorKind::GlitchDetected);
    assert!(failure
        .tamper_events
        .contains(TamperEvents::CLOCK_ANOMALY | TamperEvents::GLITCH));
    assert_eq!(platform.halt.halt_count(), 1);
}

#[test]
fn test_stuck_sensor_times_out() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();
    platform.sensors.set_stuck(true);

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.stage, BootState::Init);
    assert_eq!(failure.error, BootError::DRIVER_SENSOR_TIMEOUT);
    assert_eq!(failure.kind, ErrorKind::HardwareTimeout);
    assert_eq!(platform.halt.halt_count(), 1);
}

#[test]
fn test_monitor_arms_sensor_window() {
    let latch = TamperLatch::new();
    let image = TestImage::new(1);
    let mut platform = Platform::new();

    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    assert!(outcome.is_success());

    let params = boot_params(&image);
    assert_eq!(
        platform.sensors.thresholds(),
        Some(params.config.tamper.thresholds)
    );
    // Baseline at arming and one sample at the tamper gate.
    assert_eq!(platform.sensors.conversions(), 2);
}

#[test]
fn test_latch_is_cleared_between_boots() {
    let latch = TamperLatch::new();
    latch.merge(TamperEvents::VOLTAGE_HIGH);

    let image = TestImage::new(1);
    let mut platform = Platform::new();
    let outcome = run_secure_boot(platform.env(), boot_params(&image), &latch);
    assert!(outcome.is_success());
    assert!(latch.events().is_empty());
}
