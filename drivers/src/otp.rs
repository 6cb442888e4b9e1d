/*++

Licensed under the Apache-2.0 license.

File Name:

    otp.rs

Abstract:

    File contains the one-time-programmable storage interface.

--*/

use hardboot_error::BootResult;

/// A contiguous range of OTP words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpRegion {
    /// First word address
    pub base: u32,

    /// Number of 32-bit words
    pub words: u32,
}

impl OtpRegion {
    /// Returns `true` if `addr` falls inside the region.
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && addr - self.base < self.words
    }
}

/// Write-once storage. Programming can only move bits from erased (0) to
/// set (1).
pub trait OtpStorage {
    /// Read the word at `addr`.
    fn read(&mut self, addr: u32) -> BootResult<u32>;

    /// Program `word` at `addr`. Bits already set stay set; a word that would
    /// clear a set bit is rejected by the implementation.
    fn write_once(&mut self, addr: u32, word: u32) -> BootResult<()>;

    /// Permanently block programming of `region`.
    fn lock(&mut self, region: OtpRegion) -> BootResult<()>;
}
