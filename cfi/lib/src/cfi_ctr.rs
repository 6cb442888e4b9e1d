/*++

Licensed under the Apache-2.0 license.

File Name:

    cfi_ctr.rs

Abstract:

    File contains CFI Integer and Counter implementations. The counter is based on ideas from
    Trusted Firmware-M firmware.

References:
    https://tf-m-user-guide.trustedfirmware.org/design_docs/tfm_physical_attack_mitigation.html

--*/

use crate::cfi::{cfi_launder, CfiViolation};
use hardboot_error::BootResult;

/// CFI Integer
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct CfiInt {
    /// Actual Value
    val: u32,

    /// Masked Value
    masked_val: u32,
}

impl CfiInt {
    /// Integer mask with high hamming distance
    const MASK: u32 = 0xA5A5A5A5;

    /// Encode the integer
    pub fn encode(val: u32) -> Self {
        Self {
            val,
            masked_val: val ^ Self::MASK,
        }
    }

    /// Decode the integer, failing if the two copies disagree
    pub fn decode(&self) -> Result<u32, CfiViolation> {
        if self.is_valid() {
            Ok(self.val)
        } else {
            Err(CfiViolation::CounterCorrupt)
        }
    }

    /// Check if the integer is valid
    fn is_valid(&self) -> bool {
        self.val == self.masked_val ^ Self::MASK
    }
}

impl Default for CfiInt {
    /// Returns the "default value" for a type.
    fn default() -> Self {
        Self::encode(0)
    }
}

/// CFI step counter owned by a single boot attempt.
#[derive(Debug, Default)]
pub struct CfiCounter {
    int: CfiInt,
}

impl CfiCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment counter, returning the value before the increment
    #[inline(never)]
    pub fn increment(&mut self) -> BootResult<u32> {
        let old = self.read().decode()?;
        let new = old.checked_add(1).ok_or(CfiViolation::CounterOverflow)?;
        self.write(CfiInt::encode(new));
        Ok(old)
    }

    /// Current counter value
    pub fn value(&self) -> BootResult<u32> {
        Ok(self.read().decode()?)
    }

    /// Check that the counter equals `expected`, decoding it twice.
    #[inline(never)]
    pub fn check_eq(&self, expected: u32) -> BootResult<()> {
        let first = self.read().decode()?;
        if cfi_launder(first) != expected {
            return Err(CfiViolation::CounterMismatch.into());
        }
        let second = self.read().decode()?;
        if !((cfi_launder(first) == expected) & (cfi_launder(second) == expected)) {
            return Err(CfiViolation::CounterMismatch.into());
        }
        Ok(())
    }

    /// Overwrite both copies with zero so the masked copy no longer decodes.
    #[cfg(any(test, feature = "fault-inject"))]
    pub fn corrupt(&mut self) {
        self.write(CfiInt {
            val: 0,
            masked_val: 0,
        });
    }

    /// Read counter value
    fn read(&self) -> CfiInt {
        cfi_launder(self.int)
    }

    /// Write counter value
    fn write(&mut self, val: CfiInt) {
        self.int = cfi_launder(val);
    }
}
