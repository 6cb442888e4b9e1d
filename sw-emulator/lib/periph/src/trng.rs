/*++

Licensed under the Apache-2.0 license.

File Name:

    trng.rs

Abstract:

    File contains the emulated TRNG. A hook observes every draw so tests can
    inject faults at a chosen point of the boot flow.

--*/

use hardboot_drivers::Trng;
use rand::{rngs::StdRng, RngCore, SeedableRng};

type DrawHook<'a> = Box<dyn FnMut(u32) + 'a>;

pub struct EmuTrng<'a> {
    rng: StdRng,
    ready: bool,
    draws: u32,
    hook: Option<DrawHook<'a>>,
}

impl<'a> EmuTrng<'a> {
    /// Deterministic TRNG seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ready: true,
            draws: 0,
            hook: None,
        }
    }

    /// Call `hook` with the draw index before every word is produced.
    pub fn with_hook(mut self, hook: impl FnMut(u32) + 'a) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Starve the TRNG; `entropy_ready` then never reports ready.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Words produced so far.
    pub fn draws(&self) -> u32 {
        self.draws
    }
}

impl Trng for EmuTrng<'_> {
    fn entropy_ready(&mut self) -> bool {
        self.ready
    }

    fn read_entropy(&mut self) -> u32 {
        if let Some(hook) = self.hook.as_mut() {
            hook(self.draws);
        }
        self.draws += 1;
        self.rng.next_u32()
    }
}
