/*++

Licensed under the Apache-2.0 license.

File Name:

    otp.rs

Abstract:

    File contains the emulated one-time-programmable word array.

--*/

use hardboot_drivers::{BootError, BootResult, OtpRegion, OtpStorage};

pub struct EmuOtp {
    words: Vec<u32>,
    locked: Vec<OtpRegion>,
    writes: u32,

    /// Writes accepted before every further write fails
    fail_after: Option<u32>,
}

impl EmuOtp {
    /// Blank OTP of `size` words.
    pub fn new(size: u32) -> Self {
        Self {
            words: vec![0; size as usize],
            locked: Vec::new(),
            writes: 0,
            fail_after: None,
        }
    }

    /// Pre-program a unary counter holding `value` into `region`.
    pub fn with_counter(mut self, region: OtpRegion, value: u32) -> Self {
        for bit in 0..value {
            let addr = region.base + bit / 32;
            self.words[addr as usize] |= 1 << (bit % 32);
        }
        self
    }

    /// Value of the unary counter in `region`.
    pub fn counter(&self, region: OtpRegion) -> u32 {
        (region.base..region.base + region.words)
            .map(|addr| self.words[addr as usize].count_ones())
            .sum()
    }

    /// Fail every write after the first `writes`.
    pub fn fail_writes_after(&mut self, writes: u32) {
        self.fail_after = Some(writes);
    }

    pub fn word(&self, addr: u32) -> u32 {
        self.words[addr as usize]
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }

    pub fn is_locked(&self, addr: u32) -> bool {
        self.locked.iter().any(|region| region.contains(addr))
    }
}

impl OtpStorage for EmuOtp {
    fn read(&mut self, addr: u32) -> BootResult<u32> {
        self.words
            .get(addr as usize)
            .copied()
            .ok_or(BootError::DRIVER_OTP_ADDRESS_OUT_OF_RANGE)
    }

    fn write_once(&mut self, addr: u32, word: u32) -> BootResult<()> {
        let current = self.read(addr)?;
        if self.is_locked(addr) {
            return Err(BootError::DRIVER_OTP_REGION_LOCKED);
        }
        if self.fail_after.is_some_and(|limit| self.writes >= limit) {
            return Err(BootError::DRIVER_OTP_WRITE_FAILURE);
        }
        // Programming cannot clear a fuse.
        if current & !word != 0 {
            return Err(BootError::DRIVER_OTP_WRITE_FAILURE);
        }
        self.words[addr as usize] = word;
        self.writes += 1;
        Ok(())
    }

    fn lock(&mut self, region: OtpRegion) -> BootResult<()> {
        if region.base + region.words > self.words.len() as u32 {
            return Err(BootError::DRIVER_OTP_ADDRESS_OUT_OF_RANGE);
        }
        self.locked.push(region);
        Ok(())
    }
}
