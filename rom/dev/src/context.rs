/*++

Licensed under the Apache-2.0 license.

File Name:

    context.rs

Abstract:

    File contains the per-boot context: verification tokens, the boot state
    machine and the CFI step counter.

--*/

use crate::tamper::{TamperEvents, TamperLatch};
use core::sync::atomic::{AtomicU32, Ordering};
use hardboot_cfi_lib::{cfi_launder, CfiCounter, CfiViolation};
use hardboot_drivers::{cprintln, BootResult, HexWord};

/// Number of verification tokens.
pub const TOKEN_COUNT: usize = 4;

/// Token values deposited by the boot stages. Any two differ in at least
/// twelve bit positions and none is zero or all ones.
pub const EXPECTED_TOKENS: [u32; TOKEN_COUNT] = [0x3CA5_5AC3, 0xC35A_A53C, 0x96E1_1E69, 0x691E_E196];

/// Stage that deposits each token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSlot {
    Init = 0,
    Isolation = 1,
    Vault = 2,
    Tamper = 3,
}

impl TokenSlot {
    pub const ALL: [TokenSlot; TOKEN_COUNT] = [
        TokenSlot::Init,
        TokenSlot::Isolation,
        TokenSlot::Vault,
        TokenSlot::Tamper,
    ];

    pub fn expected(self) -> u32 {
        EXPECTED_TOKENS[self as usize]
    }
}

/// Verification token cell.
///
/// Starts out poisoned (zero) and is written once by its stage.
#[derive(Debug, Default)]
pub struct VerificationToken(AtomicU32);

impl VerificationToken {
    pub const fn poisoned() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Read from memory; never served from a cached copy.
    #[inline(never)]
    pub fn load(&self) -> u32 {
        cfi_launder(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn store(&self, val: u32) {
        self.0.store(val, Ordering::SeqCst);
    }

    /// Flip bit `bit` in place, as a fault on the token storage would.
    #[cfg(any(test, feature = "fault-inject"))]
    pub fn flip_bit(&self, bit: u32) {
        self.0.fetch_xor(1 << (bit % 32), Ordering::SeqCst);
    }
}

/// Boot state
///
/// Encodings are far apart in Hamming distance so a single fault cannot turn
/// one state into another.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Init = 0x269E_0D37,
    RootOfTrustChecked = 0x0C5C_7FD0,
    TamperChecked = 0xE8E2_5D94,
    TokensVerified = 0x6B0D_549B,
    SignatureVerified = 0x8D11_6ECE,
    RollbackVerified = 0x0FD6_30F1,
    AttestationGenerated = 0x24ED_E6A4,
    Success = 0x8A6A_63EC,
    Failure = 0x5F55_7203,
}

impl BootState {
    /// The only state reachable from `self` other than `Failure`.
    pub fn successor(self) -> Option<BootState> {
        match self {
            BootState::Init => Some(BootState::RootOfTrustChecked),
            BootState::RootOfTrustChecked => Some(BootState::TamperChecked),
            BootState::TamperChecked => Some(BootState::TokensVerified),
            BootState::TokensVerified => Some(BootState::SignatureVerified),
            BootState::SignatureVerified => Some(BootState::RollbackVerified),
            BootState::RollbackVerified => Some(BootState::AttestationGenerated),
            BootState::AttestationGenerated => Some(BootState::Success),
            BootState::Success | BootState::Failure => None,
        }
    }
}

impl From<BootState> for u32 {
    fn from(state: BootState) -> u32 {
        state as u32
    }
}

/// Boot Context
pub struct BootContext<'a> {
    tokens: [VerificationToken; TOKEN_COUNT],
    jitter_seed: u32,
    state: BootState,
    tamper: &'a TamperLatch,
    boot_count: u32,
    steps: CfiCounter,
}

impl<'a> BootContext<'a> {
    /// Fresh context for one boot attempt. Tokens start poisoned and the
    /// tamper latch is cleared.
    pub fn new(tamper: &'a TamperLatch, boot_count: u32) -> Self {
        tamper.reset();
        Self {
            tokens: Default::default(),
            jitter_seed: 0,
            state: BootState::Init,
            tamper,
            boot_count,
            steps: CfiCounter::new(),
        }
    }

    pub fn token(&self, slot: TokenSlot) -> &VerificationToken {
        &self.tokens[slot as usize]
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn tokens(&self) -> &[VerificationToken; TOKEN_COUNT] {
        &self.tokens
    }

    pub(crate) fn deposit(&self, slot: TokenSlot) {
        self.tokens[slot as usize].store(slot.expected());
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    /// Move to `next`, which must be the successor of the current state.
    #[inline(never)]
    pub fn advance(&mut self, next: BootState) -> BootResult<()> {
        let legal = self.state.successor() == Some(next);
        if !cfi_launder(legal) {
            return Err(CfiViolation::IllegalTransition.into());
        }
        if !(cfi_launder(legal) & (cfi_launder(self.state).successor() == Some(next))) {
            return Err(CfiViolation::IllegalTransition.into());
        }
        self.steps.increment()?;
        cprintln!(
            "[boot] {} -> {}",
            HexWord(self.state.into()),
            HexWord(next.into())
        );
        self.state = next;
        Ok(())
    }

    /// Enter the terminal failure state. Allowed from every state.
    pub fn fail(&mut self) {
        self.state = BootState::Failure;
    }

    pub fn tamper_events(&self) -> TamperEvents {
        self.tamper.events()
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn jitter_seed(&self) -> u32 {
        self.jitter_seed
    }

    pub fn set_jitter_seed(&mut self, seed: u32) {
        self.jitter_seed = seed;
    }

    pub fn boot_count(&self) -> u32 {
        self.boot_count
    }

    /// Transitions taken, tracked with a masked counter.
    pub fn steps(&self) -> &CfiCounter {
        &self.steps
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn steps_mut(&mut self) -> &mut CfiCounter {
        &mut self.steps
    }
}
