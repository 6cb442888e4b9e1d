/*++

Licensed under the Apache-2.0 license.

File Name:

    puf.rs

Abstract:

    File contains the physically unclonable function interface.

--*/

use hardboot_error::BootResult;

pub const PUF_KEY_SIZE: usize = 32;

/// PUF key reconstruction engine.
pub trait Puf {
    /// Returns `true` once enrollment helper data exists.
    fn is_enrolled(&mut self) -> bool;

    /// Generate and store enrollment helper data.
    fn enroll(&mut self) -> BootResult<()>;

    /// Begin reconstructing the device root key from helper data.
    fn start_reconstruction(&mut self) -> BootResult<()>;

    /// Returns `true` when the reconstructed key is available.
    fn reconstruction_done(&mut self) -> bool;

    /// Copy the reconstructed root key into `out` and clear the engine output.
    fn read_root_key(&mut self, out: &mut [u8; PUF_KEY_SIZE]) -> BootResult<()>;
}
