/*++

Licensed under the Apache-2.0 license.

File Name:

    token_verifier.rs

Abstract:

    File contains the verification token check gating the boot state machine.

--*/

use crate::context::{BootContext, TokenSlot, TOKEN_COUNT};
use hardboot_cfi_lib::{cfi_launder, CfiCounter, JitterSource};
use hardboot_drivers::{cprintln, HexWord};

const ALL_SLOTS: u32 = (1 << TOKEN_COUNT) - 1;

/// Result of a token verification. No other value is ever produced.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Invalid = 0x0FF0_A55A,
    AllValid = 0x5AA5_C33C,
}

pub enum TokenVerifier {}

impl TokenVerifier {
    /// Verify the four verification tokens of `ctx`.
    ///
    /// Each token is compared twice, directly and through an XOR against
    /// its expected value, with a jittered delay before each comparison.
    /// Once all four pass, a final sweep re-reads every token.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Boot context holding the tokens
    /// * `jitter` - Delay source
    ///
    /// # Returns
    ///
    /// * `TokenState` - `AllValid` only if every comparison held
    #[inline(never)]
    pub fn verify(ctx: &BootContext, jitter: &mut JitterSource) -> TokenState {
        let mut passed = 0u32;
        let mut layers = CfiCounter::new();

        for slot in TokenSlot::ALL {
            let expected = slot.expected();

            jitter.jitter_default();
            let direct = cfi_launder(ctx.token(slot).load()) == cfi_launder(expected);
            if !direct {
                return Self::reject(slot);
            }

            jitter.jitter_default();
            let xored = cfi_launder(ctx.token(slot).load() ^ expected) == 0;
            if !(cfi_launder(direct) & cfi_launder(xored)) {
                return Self::reject(slot);
            }

            passed |= 1 << (slot as u32);
            if layers.increment().is_err() {
                return TokenState::Invalid;
            }
        }

        jitter.jitter_default();
        if (cfi_launder(passed) != ALL_SLOTS) | layers.check_eq(TOKEN_COUNT as u32).is_err() {
            cprintln!("[tokens] incomplete pass {}", HexWord(passed));
            return TokenState::Invalid;
        }

        // Final sweep, no early exit.
        jitter.jitter_default();
        let mut sweep = true;
        for slot in TokenSlot::ALL {
            sweep &= cfi_launder(ctx.token(slot).load()) == slot.expected();
        }
        let valid = cfi_launder(sweep) & (cfi_launder(passed) == ALL_SLOTS);
        jitter.jitter_default();
        if !cfi_launder(valid) {
            cprintln!("[tokens] sweep mismatch");
            return TokenState::Invalid;
        }

        TokenState::AllValid
    }

    fn reject(slot: TokenSlot) -> TokenState {
        cprintln!("[tokens] slot {} mismatch", slot as u32);
        TokenState::Invalid
    }
}
