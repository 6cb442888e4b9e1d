/*++

Licensed under the Apache-2.0 license.

File Name:

    platform.rs

Abstract:

    File contains the emulated isolation boundary, debug authentication
    state and halt line.

--*/

use hardboot_drivers::{DebugAuth, HaltControl, IsolationBoundary};
use std::ops::Range;

/// Trusted address ranges: boot ROM, secure SRAM, secure peripherals.
const DEFAULT_TRUSTED: [Range<u32>; 3] = [
    0x0000_0000..0x0004_0000,
    0x2000_0000..0x2000_8000,
    0x4000_0000..0x5000_0000,
];

pub struct EmuIsolation {
    trusted: Vec<Range<u32>>,
}

impl EmuIsolation {
    pub fn new(trusted: &[Range<u32>]) -> Self {
        Self {
            trusted: trusted.to_vec(),
        }
    }

    /// Boundary that trusts nothing.
    pub fn open() -> Self {
        Self::new(&[])
    }
}

impl Default for EmuIsolation {
    fn default() -> Self {
        Self::new(&DEFAULT_TRUSTED)
    }
}

impl IsolationBoundary for EmuIsolation {
    fn is_trusted(&self, addr: u32) -> bool {
        self.trusted.iter().any(|range| range.contains(&addr))
    }
}

#[derive(Default)]
pub struct EmuDebug {
    unlocked: bool,
}

impl EmuDebug {
    pub fn new(unlocked: bool) -> Self {
        Self { unlocked }
    }
}

impl DebugAuth for EmuDebug {
    fn is_debug_unlocked(&self) -> bool {
        self.unlocked
    }
}

#[derive(Default)]
pub struct EmuHalt {
    halts: u32,
}

impl EmuHalt {
    /// Number of halt requests seen.
    pub fn halt_count(&self) -> u32 {
        self.halts
    }
}

impl HaltControl for EmuHalt {
    fn halt(&mut self) {
        self.halts += 1;
    }
}
