/*++

Licensed under the Apache-2.0 license.

File Name:

    wait.rs

Abstract:

    File contains the bounded polling routine used for every hardware wait.

--*/

use hardboot_error::{BootError, BootResult};

/// Poll `predicate` until it reports completion or the poll budget runs out.
///
/// # Arguments
///
/// * `max_polls` - Maximum number of times the predicate is evaluated
/// * `timeout_err` - Error returned when the budget is exhausted
///
/// # Returns
///
/// * `BootResult<()>` - `Ok` once the predicate returned `true`
pub fn until<F>(mut predicate: F, max_polls: u32, timeout_err: BootError) -> BootResult<()>
where
    F: FnMut() -> bool,
{
    for _ in 0..max_polls {
        if predicate() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(timeout_err)
}
