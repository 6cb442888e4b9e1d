/*++

Licensed under the Apache-2.0 license.

File Name:

    sensors.rs

Abstract:

    File contains the emulated voltage, temperature and clock sensors.

--*/

use hardboot_drivers::{BootResult, SensorDriver, SensorSample, SensorThresholds, ThresholdCrossing};
use std::collections::VecDeque;

pub struct EmuSensors {
    /// Live readings
    voltage_mv: u32,
    temperature_c: i32,

    /// Voltages taken by successive conversions before the live value
    script: VecDeque<u32>,

    clock_stable: bool,

    /// Conversion never completes
    stuck: bool,

    /// Sample latched by the last conversion
    latched: SensorSample,

    thresholds: Option<SensorThresholds>,
    conversions: u32,
}

impl EmuSensors {
    pub fn new(voltage_mv: u32, temperature_c: i32) -> Self {
        let latched = SensorSample {
            voltage_mv,
            temperature_c,
            clock_stable: true,
        };
        Self {
            voltage_mv,
            temperature_c,
            script: VecDeque::new(),
            clock_stable: true,
            stuck: false,
            latched,
            thresholds: None,
            conversions: 0,
        }
    }

    /// 3.3 V, 25 °C, stable clock.
    pub fn nominal() -> Self {
        Self::new(3300, 25)
    }

    /// Serve `voltages` to the next conversions, one each.
    pub fn with_script(mut self, voltages: &[u32]) -> Self {
        self.script.extend(voltages.iter().copied());
        self
    }

    /// Change the live voltage.
    ///
    /// # Returns
    ///
    /// * `Option<ThresholdCrossing>` - The crossing the comparator would
    ///   signal, if its interrupt is armed and the new value is outside the
    ///   window
    pub fn set_voltage(&mut self, voltage_mv: u32) -> Option<ThresholdCrossing> {
        let previous = self.live_sample();
        self.voltage_mv = voltage_mv;
        let current = self.live_sample();
        let t = self.thresholds?;
        if voltage_mv < t.voltage_low_mv || voltage_mv > t.voltage_high_mv {
            Some(ThresholdCrossing { previous, current })
        } else {
            None
        }
    }

    pub fn set_temperature(&mut self, temperature_c: i32) {
        self.temperature_c = temperature_c;
    }

    pub fn set_clock_stable(&mut self, stable: bool) {
        self.clock_stable = stable;
    }

    pub fn set_stuck(&mut self, stuck: bool) {
        self.stuck = stuck;
    }

    /// Window programmed by the monitor, if armed.
    pub fn thresholds(&self) -> Option<SensorThresholds> {
        self.thresholds
    }

    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    fn live_sample(&self) -> SensorSample {
        SensorSample {
            voltage_mv: self.voltage_mv,
            temperature_c: self.temperature_c,
            clock_stable: self.clock_stable,
        }
    }
}

impl SensorDriver for EmuSensors {
    fn start_conversion(&mut self) {
        self.conversions += 1;
        if let Some(voltage_mv) = self.script.pop_front() {
            self.voltage_mv = voltage_mv;
        }
        self.latched = self.live_sample();
    }

    fn conversion_done(&mut self) -> bool {
        !self.stuck
    }

    fn read_voltage_mv(&mut self) -> u32 {
        self.latched.voltage_mv
    }

    fn read_temperature_c(&mut self) -> i32 {
        self.latched.temperature_c
    }

    fn clock_stable(&mut self) -> bool {
        self.latched.clock_stable
    }

    fn arm_threshold_interrupt(&mut self, thresholds: &SensorThresholds) -> BootResult<()> {
        self.thresholds = Some(*thresholds);
        Ok(())
    }
}
