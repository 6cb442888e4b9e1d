/*++

Licensed under the Apache-2.0 license.

File Name:

    trng.rs

Abstract:

    File contains the true random number generator interface and the bounded
    helpers used to draw entropy from it.

--*/

use crate::wait;
use hardboot_error::{BootError, BootResult};

/// Poll budget for a single entropy word.
pub const TRNG_MAX_POLLS: u32 = 10_000;

/// True random number generator.
pub trait Trng {
    /// Returns `true` when a fresh entropy word can be read.
    fn entropy_ready(&mut self) -> bool;

    /// Reads one entropy word. Only valid after `entropy_ready` returned `true`.
    fn read_entropy(&mut self) -> u32;
}

/// Read one fresh 32-bit word from the TRNG.
pub fn next_u32(trng: &mut dyn Trng) -> BootResult<u32> {
    wait::until(
        || trng.entropy_ready(),
        TRNG_MAX_POLLS,
        BootError::DRIVER_TRNG_TIMEOUT,
    )?;
    Ok(trng.read_entropy())
}

/// Fill `out` with TRNG output.
///
/// # Arguments
///
/// * `trng` - Entropy source
/// * `out` - Destination buffer
///
/// # Returns
///
/// * `BootResult<()>` - `DRIVER_TRNG_TIMEOUT` if any word is not ready in time
pub fn fill_bytes(trng: &mut dyn Trng, out: &mut [u8]) -> BootResult<()> {
    for chunk in out.chunks_mut(4) {
        let word = next_u32(trng)?.to_le_bytes();
        chunk.copy_from_slice(&word[..chunk.len()]);
    }
    Ok(())
}
