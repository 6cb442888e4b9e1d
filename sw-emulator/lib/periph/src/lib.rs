/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the hardboot emulator peripherals: host
    implementations of the driver traits used by the boot core.

--*/

mod otp;
mod platform;
mod puf;
mod sensors;
mod trng;

pub use otp::EmuOtp;
pub use platform::{EmuDebug, EmuHalt, EmuIsolation};
pub use puf::EmuPuf;
pub use sensors::EmuSensors;
pub use trng::EmuTrng;
