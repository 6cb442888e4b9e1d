/*++

Licensed under the Apache-2.0 license.

File Name:

    sensor.rs

Abstract:

    File contains the environmental sensor interface.

--*/

use hardboot_error::BootResult;

/// Window configured into the sensor comparators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorThresholds {
    pub voltage_low_mv: u32,
    pub voltage_high_mv: u32,
    pub temp_low_c: i32,
    pub temp_high_c: i32,
}

/// One conversion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    pub voltage_mv: u32,
    pub temperature_c: i32,
    pub clock_stable: bool,
}

/// Payload delivered with a threshold-crossing interrupt: the comparator
/// latches the sample before and after the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdCrossing {
    pub previous: SensorSample,
    pub current: SensorSample,
}

/// Voltage, temperature and clock monitor.
pub trait SensorDriver {
    /// Trigger a new conversion.
    fn start_conversion(&mut self);

    /// Returns `true` once the conversion started by `start_conversion` finished.
    fn conversion_done(&mut self) -> bool;

    /// Supply voltage in millivolts.
    fn read_voltage_mv(&mut self) -> u32;

    /// Die temperature in degrees Celsius.
    fn read_temperature_c(&mut self) -> i32;

    /// Clock monitor status.
    fn clock_stable(&mut self) -> bool;

    /// Program the comparators and enable the threshold-crossing interrupt.
    fn arm_threshold_interrupt(&mut self, thresholds: &SensorThresholds) -> BootResult<()>;
}
