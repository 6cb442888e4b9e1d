/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod cfi;
mod cfi_ctr;
mod jitter;

pub use cfi::*;
pub use cfi_ctr::{CfiCounter, CfiInt};
pub use jitter::{
    JitterBounds, JitterSource, JITTER_FALLBACK_UNITS, JITTER_MAX_UNITS, JITTER_MIN_UNITS,
};
