/*++

Licensed under the Apache-2.0 license.

File Name:

    rom_env.rs

Abstract:

    File implements a context holding all the services utilized by the boot
    core. The primary need for this abstraction is to hide the hardware
    details from the boot flow. The natural side benefit of this abstraction
    is it makes authoring fakes and unit tests easy.

--*/

use hardboot_drivers::{
    CryptoProvider, DebugAuth, HaltControl, IsolationBoundary, OtpStorage, Puf, SensorDriver, Trng,
};

/// Boot Environment
pub struct BootEnv<'a> {
    /// True random number generator
    pub trng: &'a mut dyn Trng,

    /// Voltage, temperature and clock sensors
    pub sensors: &'a mut dyn SensorDriver,

    /// Write-once storage
    pub otp: &'a mut dyn OtpStorage,

    /// Physically unclonable function
    pub puf: &'a mut dyn Puf,

    /// Cryptographic provider
    pub crypto: &'a dyn CryptoProvider,

    /// Isolation boundary query
    pub isolation: &'a dyn IsolationBoundary,

    /// Debug authentication state
    pub debug: &'a dyn DebugAuth,

    /// Processor halt
    pub halt: &'a mut dyn HaltControl,
}
