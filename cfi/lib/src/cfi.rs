/*++

Licensed under the Apache-2.0 license.

File Name:

    cfi.rs

Abstract:

    File contains the CFI launder and the redundant, jittered comparison
    primitives.

References:
    https://github.com/lowRISC/opentitan/blob/7a61300cf7c409fa68fd892942c1d7b58a7cd4c0/sw/device/lib/base/hardened.h#L260

--*/

use crate::JitterSource;
use hardboot_error::{BootError, BootResult};

/// Minimum number of evaluations performed by [`cfi_redundant`].
pub const CFI_MIN_ROUNDS: u32 = 2;

/// CFI Violation Information
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CfiViolation {
    /// CFI Counter decode error
    CounterCorrupt,

    /// CFI Counter overflow
    CounterOverflow,

    /// CFI Counter mismatch
    CounterMismatch,

    /// CFI Check Equal failed
    CheckEqFail,

    /// CFI Check Not Equal failed
    CheckNeFail,

    /// CFI Greater Than failed
    CheckGtFail,

    /// CFI Less Than failed
    CheckLtFail,

    /// CFI Greater Than Equal failed
    CheckGeFail,

    /// CFI Less Than Equal failed
    CheckLeFail,

    /// A state machine was asked to move somewhere other than its successor
    IllegalTransition,
}

impl From<CfiViolation> for BootError {
    /// Converts to this type from the input type.
    fn from(info: CfiViolation) -> BootError {
        match info {
            CfiViolation::CounterCorrupt => BootError::CFI_COUNTER_CORRUPT,
            CfiViolation::CounterOverflow => BootError::CFI_COUNTER_OVERFLOW,
            CfiViolation::CounterMismatch => BootError::CFI_COUNTER_MISMATCH,
            CfiViolation::CheckEqFail => BootError::CFI_CHECK_EQ_FAILURE,
            CfiViolation::CheckNeFail => BootError::CFI_CHECK_NE_FAILURE,
            CfiViolation::CheckGtFail => BootError::CFI_CHECK_GT_FAILURE,
            CfiViolation::CheckLtFail => BootError::CFI_CHECK_LT_FAILURE,
            CfiViolation::CheckGeFail => BootError::CFI_CHECK_GE_FAILURE,
            CfiViolation::CheckLeFail => BootError::CFI_CHECK_LE_FAILURE,
            CfiViolation::IllegalTransition => BootError::CFI_ILLEGAL_TRANSITION,
        }
    }
}

/// Launder the value to prevent compiler optimization
///
/// # Arguments
///
/// * `val` - Value to launder
///
/// # Returns
///
/// `T` - Same value
#[inline(always)]
pub fn cfi_launder<T>(val: T) -> T {
    if cfg!(feature = "cfi") {
        core::hint::black_box(val)
    } else {
        val
    }
}

macro_rules! cfi_check_macro {
    ($name: ident, $op: tt, $trait1: path, $trait2: path, $violation: ident) => {
        /// CFI Binary Condition Check
        ///
        /// Evaluates the condition twice with a jittered delay before each
        /// evaluation. Both results must hold.
        ///
        /// # Arguments
        ///
        /// `lhs` - Left hand side
        /// `rhs` - Right hand side
        /// `jitter` - Delay source interleaved with the evaluations
        #[inline(never)]
        pub fn $name<T>(lhs: T, rhs: T, jitter: &mut JitterSource) -> BootResult<()>
        where
            T: Copy + $trait1 + $trait2,
        {
            jitter.jitter_default();
            let first = lhs $op rhs;
            if !cfi_launder(first) {
                return Err(CfiViolation::$violation.into());
            }

            // Second check for glitch protection
            jitter.jitter_default();
            let second = cfi_launder(lhs) $op cfi_launder(rhs);
            if !(cfi_launder(first) & cfi_launder(second)) {
                return Err(CfiViolation::$violation.into());
            }
            Ok(())
        }
    };
}

cfi_check_macro!(cfi_check_eq, ==, PartialEq, PartialEq, CheckEqFail);
cfi_check_macro!(cfi_check_ne, !=, PartialEq, PartialEq, CheckNeFail);
cfi_check_macro!(cfi_check_gt, >, Ord, PartialOrd, CheckGtFail);
cfi_check_macro!(cfi_check_lt, <, Ord, PartialOrd, CheckLtFail);
cfi_check_macro!(cfi_check_ge, >=, Ord, PartialOrd, CheckGeFail);
cfi_check_macro!(cfi_check_le, <=, Ord, PartialOrd, CheckLeFail);

/// Evaluate `predicate` `rounds` times (at least [`CFI_MIN_ROUNDS`]) with a
/// jittered delay before each evaluation.
///
/// The results are combined with a non-short-circuiting AND. Evaluation stops
/// at the first `false`.
///
/// # Returns
///
/// * `bool` - `true` only if every evaluation returned `true`
#[inline(never)]
pub fn cfi_redundant<F>(rounds: u32, jitter: &mut JitterSource, mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    let rounds = rounds.max(CFI_MIN_ROUNDS);
    let mut all = true;
    let mut evaluated = 0u32;
    for _ in 0..rounds {
        jitter.jitter_default();
        let result = cfi_launder(predicate());
        all = cfi_launder(all) & result;
        if !result {
            return false;
        }
        evaluated += 1;
    }
    cfi_launder(all) & (cfi_launder(evaluated) == rounds)
}

/// Compare two byte strings without an early exit on the first difference.
pub fn cfi_bytes_eq(lhs: &[u8], rhs: &[u8]) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }
    let diff = lhs
        .iter()
        .zip(rhs.iter())
        .fold(0u8, |acc, (a, b)| acc | (cfi_launder(*a) ^ cfi_launder(*b)));
    cfi_launder(diff) == 0
}
