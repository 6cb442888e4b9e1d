/*++

Licensed under the Apache-2.0 license.

File Name:

    rollback.rs

Abstract:

    File contains the anti-rollback guard backed by a unary OTP counter.

--*/

use hardboot_cfi_lib::{cfi_check_eq, cfi_check_ge, cfi_check_le, cfi_launder, JitterSource};
use hardboot_drivers::{cprintln, BootError, BootResult, ErrorKind, OtpRegion, OtpStorage};

const BITS_PER_WORD: u32 = 32;

/// Rollback check decision
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackDecision {
    Accept = 0xAA55_AA55,
    Reject = 0x55AA_55AA,
}

/// Rollback Guard
///
/// The stored version is the number of set bits in the counter region.
/// Bits are set in order, lowest word and lowest bit first, so a valid
/// counter is always a run of ones followed by zeros.
pub struct RollbackGuard<'a> {
    otp: &'a mut dyn OtpStorage,
    region: OtpRegion,
}

impl<'a> RollbackGuard<'a> {
    pub fn new(otp: &'a mut dyn OtpStorage, region: OtpRegion) -> Self {
        Self { otp, region }
    }

    /// Highest version the counter can represent.
    pub fn ceiling(&self) -> u32 {
        self.region.words.saturating_mul(BITS_PER_WORD)
    }

    /// Version currently stored in OTP.
    pub fn stored_version(&mut self) -> BootResult<u32> {
        let mut version = 0u32;
        let mut open = true;
        for idx in 0..self.region.words {
            let word = self.otp.read(self.word_addr(idx)?)?;
            if open {
                let ones = word.trailing_ones();
                // Ones must be contiguous from bit 0.
                if ones < BITS_PER_WORD && (word >> ones) != 0 {
                    return Err(BootError::ROLLBACK_COUNTER_CORRUPT);
                }
                version += ones;
                open = ones == BITS_PER_WORD;
            } else if word != 0 {
                return Err(BootError::ROLLBACK_COUNTER_CORRUPT);
            }
        }
        Ok(version)
    }

    /// Check `candidate` against the stored version and advance the counter
    /// if it is newer.
    ///
    /// # Arguments
    ///
    /// * `candidate` - Security version of the image being booted
    /// * `jitter` - Delay source
    ///
    /// # Returns
    ///
    /// * `BootResult<()>` - `Ok` if the image may boot. The counter equals
    ///   `candidate` on success and is never partially advanced past a
    ///   failed step.
    pub fn check(&mut self, candidate: u32, jitter: &mut JitterSource) -> BootResult<()> {
        let stored = self.stored_version()?;

        jitter.jitter_default();
        if cfi_launder(candidate) < cfi_launder(stored) {
            cprintln!("[rollback] reject {} < {}", candidate, stored);
            return Err(BootError::ROLLBACK_VERSION_REJECTED);
        }
        cfi_check_ge(candidate, stored, jitter)?;
        jitter.jitter_default();

        let ceiling = self.ceiling();
        if candidate > ceiling {
            cprintln!("[rollback] {} above ceiling {}", candidate, ceiling);
            return Err(BootError::ROLLBACK_COUNTER_CEILING);
        }
        cfi_check_le(candidate, ceiling, jitter)?;
        jitter.jitter_default();

        if candidate == stored {
            cfi_check_eq(candidate, stored, jitter)?;
            jitter.jitter_default();
            return Ok(());
        }

        cprintln!("[rollback] advance {} -> {}", stored, candidate);
        for version in stored..candidate {
            self.set_bit(version).map_err(|err| match err.kind() {
                ErrorKind::StorageExhausted if err != BootError::DRIVER_OTP_READ_FAILURE => err,
                _ => BootError::ROLLBACK_INCREMENT_FAILURE,
            })?;
        }

        let advanced = self.stored_version()?;
        cfi_check_eq(advanced, candidate, jitter)?;
        jitter.jitter_default();

        if cfi_launder(advanced) == ceiling {
            cprintln!("[rollback] ceiling reached, locking");
            self.otp.lock(self.region)?;
        }
        jitter.jitter_default();
        Ok(())
    }

    /// Like [`Self::check`], reduced to a decision.
    pub fn verify(&mut self, candidate: u32, jitter: &mut JitterSource) -> RollbackDecision {
        match self.check(candidate, jitter) {
            Ok(()) => RollbackDecision::Accept,
            Err(_) => RollbackDecision::Reject,
        }
    }

    /// Address of counter word `idx`.
    fn word_addr(&self, idx: u32) -> BootResult<u32> {
        self.region
            .base
            .checked_add(idx)
            .ok_or(BootError::ROLLBACK_COUNTER_CORRUPT)
    }

    /// Set counter bit `index` and read it back.
    fn set_bit(&mut self, index: u32) -> BootResult<()> {
        let addr = self.word_addr(index / BITS_PER_WORD)?;
        let bit = 1u32 << (index % BITS_PER_WORD);
        if !self.region.contains(addr) {
            return Err(BootError::ROLLBACK_COUNTER_CEILING);
        }
        let word = self.otp.read(addr)? | bit;
        self.otp.write_once(addr, word)?;
        if self.otp.read(addr)? != word {
            return Err(BootError::ROLLBACK_INCREMENT_FAILURE);
        }
        Ok(())
    }
}
