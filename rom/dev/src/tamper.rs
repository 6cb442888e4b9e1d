/*++

Licensed under the Apache-2.0 license.

File Name:

    tamper.rs

Abstract:

    File contains the tamper monitor: sensor sampling, event classification,
    the interrupt entry point and the escalating tamper response.

--*/

use crate::key_vault::KeyVault;
use bitflags::bitflags;
use core::sync::atomic::{AtomicU32, Ordering};
use hardboot_drivers::{
    cprintln, wait, BootError, BootResult, HaltControl, HexWord, SensorDriver, SensorSample,
    SensorThresholds, ThresholdCrossing,
};

/// Voltage slew between consecutive samples that is treated as a glitch.
pub const GLITCH_DELTA_MV: u32 = 200;

/// Poll budget for one sensor conversion.
pub const SENSOR_MAX_POLLS: u32 = 10_000;

bitflags! {
    /// Tamper events observed during a boot attempt.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TamperEvents: u32 {
        const VOLTAGE_LOW = 0x01;
        const VOLTAGE_HIGH = 0x02;
        const TEMP_LOW = 0x04;
        const TEMP_HIGH = 0x08;
        const GLITCH = 0x10;
        const CLOCK_ANOMALY = 0x20;
    }
}

impl TamperEvents {
    /// Events answered with a halt. Bits outside the defined set can only
    /// come from a corrupted mask and are treated the same way.
    pub fn is_fault(&self) -> bool {
        self.intersects(Self::GLITCH | Self::CLOCK_ANOMALY) || self.bits() & !Self::all().bits() != 0
    }

    /// The error reported for this mask, most severe event first.
    pub fn to_error(&self) -> Option<BootError> {
        if self.contains(Self::GLITCH) || self.bits() & !Self::all().bits() != 0 {
            Some(BootError::TAMPER_VOLTAGE_GLITCH)
        } else if self.contains(Self::CLOCK_ANOMALY) {
            Some(BootError::TAMPER_CLOCK_ANOMALY)
        } else if self.intersects(Self::VOLTAGE_LOW | Self::VOLTAGE_HIGH) {
            Some(BootError::TAMPER_VOLTAGE_OUT_OF_RANGE)
        } else if self.intersects(Self::TEMP_LOW | Self::TEMP_HIGH) {
            Some(BootError::TAMPER_TEMPERATURE_OUT_OF_RANGE)
        } else {
            None
        }
    }
}

bitflags! {
    /// Destructive actions taken by the tamper response.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TamperActions: u32 {
        const ERASE_KEYS = 0x01;
        const LOCK = 0x02;
        const HALT = 0x04;
    }
}

/// Sensor window and glitch delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TamperConfig {
    pub thresholds: SensorThresholds,
    pub glitch_delta_mv: u32,
}

impl Default for TamperConfig {
    fn default() -> Self {
        Self {
            thresholds: SensorThresholds {
                voltage_low_mv: 2700,
                voltage_high_mv: 3600,
                temp_low_c: -20,
                temp_high_c: 85,
            },
            glitch_delta_mv: GLITCH_DELTA_MV,
        }
    }
}

/// Classify one sensor sample.
///
/// Shared by the polled and the interrupt path.
///
/// # Arguments
///
/// * `config` - Window and glitch delta
/// * `previous_voltage_mv` - Voltage of the preceding sample, if any
/// * `sample` - Sample to classify
///
/// # Returns
///
/// * `TamperEvents` - Events raised by the sample
pub fn classify(
    config: &TamperConfig,
    previous_voltage_mv: Option<u32>,
    sample: &SensorSample,
) -> TamperEvents {
    let t = &config.thresholds;
    let mut events = TamperEvents::empty();

    if sample.voltage_mv < t.voltage_low_mv {
        events |= TamperEvents::VOLTAGE_LOW;
    }
    if sample.voltage_mv > t.voltage_high_mv {
        events |= TamperEvents::VOLTAGE_HIGH;
    }
    if sample.temperature_c < t.temp_low_c {
        events |= TamperEvents::TEMP_LOW;
    }
    if sample.temperature_c > t.temp_high_c {
        events |= TamperEvents::TEMP_HIGH;
    }
    if let Some(previous) = previous_voltage_mv {
        if previous.abs_diff(sample.voltage_mv) > config.glitch_delta_mv {
            events |= TamperEvents::GLITCH;
        }
    }
    if !sample.clock_stable {
        events |= TamperEvents::CLOCK_ANOMALY;
    }
    events
}

/// Tamper event mask shared between the boot path and the tamper interrupt.
///
/// Bits are only ever added until the latch is reset for the next boot.
#[derive(Debug, Default)]
pub struct TamperLatch {
    mask: AtomicU32,
}

impl TamperLatch {
    pub const fn new() -> Self {
        Self {
            mask: AtomicU32::new(0),
        }
    }

    /// Merge `events` into the mask.
    ///
    /// # Returns
    ///
    /// * `TamperEvents` - Mask after the merge
    pub fn merge(&self, events: TamperEvents) -> TamperEvents {
        let mut current = self.mask.load(Ordering::Acquire);
        loop {
            let merged = current | events.bits();
            if merged == current {
                return TamperEvents::from_bits_retain(current);
            }
            match self.mask.compare_exchange_weak(
                current,
                merged,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return TamperEvents::from_bits_retain(merged),
                Err(actual) => current = actual,
            }
        }
    }

    /// Current mask.
    pub fn events(&self) -> TamperEvents {
        TamperEvents::from_bits_retain(self.mask.load(Ordering::Acquire))
    }

    pub(crate) fn reset(&self) {
        self.mask.store(0, Ordering::Release);
    }
}

/// Tamper interrupt entry point.
///
/// Touches nothing but the latch; the boot path picks the events up at its
/// next checkpoint and runs the response.
#[derive(Debug, Clone, Copy)]
pub struct TamperIrq<'a> {
    latch: &'a TamperLatch,
    config: TamperConfig,
}

impl<'a> TamperIrq<'a> {
    pub fn new(latch: &'a TamperLatch, config: TamperConfig) -> Self {
        Self { latch, config }
    }

    /// Handle a comparator threshold crossing.
    pub fn on_threshold_crossing(&self, crossing: &ThresholdCrossing) -> TamperEvents {
        let events = classify(
            &self.config,
            Some(crossing.previous.voltage_mv),
            &crossing.current,
        );
        if !events.is_empty() {
            self.latch.merge(events);
        }
        events
    }
}

/// Tamper monitor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TamperState {
    Disabled,
    Armed,
    Responding,
    Halted,
}

/// Tamper Monitor
pub struct TamperMonitor<'a> {
    sensors: &'a mut dyn SensorDriver,
    latch: &'a TamperLatch,
    config: TamperConfig,
    state: TamperState,
    last_voltage_mv: Option<u32>,
    samples: u32,
    actions: TamperActions,
}

impl<'a> TamperMonitor<'a> {
    pub fn new(
        sensors: &'a mut dyn SensorDriver,
        latch: &'a TamperLatch,
        config: TamperConfig,
    ) -> Self {
        Self {
            sensors,
            latch,
            config,
            state: TamperState::Disabled,
            last_voltage_mv: None,
            samples: 0,
            actions: TamperActions::empty(),
        }
    }

    /// Program the sensor window, enable the threshold interrupt, take the
    /// baseline sample and arm the monitor.
    ///
    /// The baseline is classified like any other sample and is the reference
    /// for the glitch delta of the first `check()`.
    pub fn start(&mut self) -> BootResult<()> {
        match self.state {
            TamperState::Disabled => {
                self.sensors
                    .arm_threshold_interrupt(&self.config.thresholds)?;
                self.acquire()?;
                self.state = TamperState::Armed;
                cprintln!("[tamper] armed");
                Ok(())
            }
            TamperState::Armed => Ok(()),
            TamperState::Responding | TamperState::Halted => {
                Err(BootError::TAMPER_MONITOR_HALTED)
            }
        }
    }

    /// Take one sensor sample, classify it and merge the result into the
    /// latch.
    ///
    /// # Returns
    ///
    /// * `BootResult<TamperEvents>` - Events raised by this sample
    pub fn check(&mut self) -> BootResult<TamperEvents> {
        match self.state {
            TamperState::Armed => {}
            TamperState::Disabled => return Err(BootError::TAMPER_MONITOR_NOT_ARMED),
            TamperState::Responding | TamperState::Halted => {
                return Err(BootError::TAMPER_MONITOR_HALTED)
            }
        }

        self.acquire()
    }

    /// Events accumulated by both acquisition paths.
    pub fn pending(&self) -> TamperEvents {
        self.latch.events()
    }

    /// Run the tamper response for `events`.
    ///
    /// Threshold events erase and lock the key vault. Glitch and clock
    /// events additionally halt the processor. A halt is executed at most
    /// once.
    ///
    /// # Returns
    ///
    /// * `TamperActions` - Actions covered by this call
    pub fn respond(
        &mut self,
        events: TamperEvents,
        vault: &mut KeyVault,
        halt: &mut dyn HaltControl,
    ) -> TamperActions {
        if events.is_empty() {
            return TamperActions::empty();
        }
        let prior = self.state;
        self.state = TamperState::Responding;
        cprintln!("[tamper] responding to {}", HexWord(events.bits()));

        vault.erase_all_keys();
        vault.lock();
        let mut actions = TamperActions::ERASE_KEYS | TamperActions::LOCK;

        if events.is_fault() {
            self.halt_once(halt);
            actions |= TamperActions::HALT;
        }

        self.state = if self.actions.contains(TamperActions::HALT) || prior == TamperState::Halted {
            TamperState::Halted
        } else if prior == TamperState::Disabled {
            TamperState::Disabled
        } else {
            TamperState::Armed
        };
        self.actions |= actions;
        actions
    }

    /// Halt the processor unless a halt was already executed.
    pub fn halt_once(&mut self, halt: &mut dyn HaltControl) {
        if !self.actions.contains(TamperActions::HALT) {
            cprintln!("[tamper] halt");
            self.actions |= TamperActions::HALT;
            self.state = TamperState::Halted;
            halt.halt();
        }
    }

    pub fn state(&self) -> TamperState {
        self.state
    }

    /// Every action executed so far.
    #[cfg(any(test, feature = "fault-inject"))]
    pub fn actions(&self) -> TamperActions {
        self.actions
    }

    /// Number of samples taken, baseline included.
    #[cfg(any(test, feature = "fault-inject"))]
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Sample, classify against the previous sample and merge into the
    /// latch.
    fn acquire(&mut self) -> BootResult<TamperEvents> {
        let sample = self.sample()?;
        let events = classify(&self.config, self.last_voltage_mv, &sample);
        self.last_voltage_mv = Some(sample.voltage_mv);
        self.samples += 1;

        if !events.is_empty() {
            cprintln!(
                "[tamper] {} mV {} C events {}",
                sample.voltage_mv,
                sample.temperature_c,
                HexWord(events.bits())
            );
            self.latch.merge(events);
        }
        Ok(events)
    }

    fn sample(&mut self) -> BootResult<SensorSample> {
        let sensors = &mut *self.sensors;
        sensors.start_conversion();
        wait::until(
            || sensors.conversion_done(),
            SENSOR_MAX_POLLS,
            BootError::DRIVER_SENSOR_TIMEOUT,
        )?;
        Ok(SensorSample {
            voltage_mv: sensors.read_voltage_mv(),
            temperature_c: sensors.read_temperature_c(),
            clock_stable: sensors.clock_stable(),
        })
    }
}
