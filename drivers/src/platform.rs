/*++

Licensed under the Apache-2.0 license.

File Name:

    platform.rs

Abstract:

    File contains the narrow platform queries the boot core relies on:
    isolation boundary membership, debug lock state and halt.

--*/

/// Memory/peripheral domain separation.
pub trait IsolationBoundary {
    /// Returns `true` if `addr` belongs to the trusted domain.
    fn is_trusted(&self, addr: u32) -> bool;
}

/// Debug port authentication state.
pub trait DebugAuth {
    /// Returns `true` if an authenticated debugger has unlocked the device.
    fn is_debug_unlocked(&self) -> bool;
}

/// Processor halt.
pub trait HaltControl {
    /// Stop execution until power cycle. Hardware implementations never
    /// return; host implementations record the request.
    fn halt(&mut self);
}
