/*++

Licensed under the Apache-2.0 license.

File Name:

    jitter.rs

Abstract:

    File contains the randomized delay source used around every
    security-relevant comparison.

--*/

use hardboot_drivers::{cprintln, trng, Trng};

/// Default lower bound of a jittered delay, in spin iterations.
pub const JITTER_MIN_UNITS: u32 = 100;

/// Default upper bound of a jittered delay, in spin iterations.
pub const JITTER_MAX_UNITS: u32 = 1100;

/// Delay used when the TRNG cannot supply a sample. Never shorter than the
/// requested upper bound.
pub const JITTER_FALLBACK_UNITS: u32 = 1100;

/// Rejection sampling attempts before falling back.
const MAX_SAMPLE_ATTEMPTS: u32 = 4;

/// Inclusive delay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for JitterBounds {
    fn default() -> Self {
        Self {
            min: JITTER_MIN_UNITS,
            max: JITTER_MAX_UNITS,
        }
    }
}

/// Bounded random delay generator.
///
/// Every delay draws fresh TRNG output; nothing is cached between calls.
pub struct JitterSource<'a> {
    trng: &'a mut dyn Trng,
    bounds: JitterBounds,
    calls: u32,
    fallbacks: u32,
    total_units: u64,
}

impl<'a> JitterSource<'a> {
    pub fn new(trng: &'a mut dyn Trng, bounds: JitterBounds) -> Self {
        Self {
            trng,
            bounds,
            calls: 0,
            fallbacks: 0,
            total_units: 0,
        }
    }

    /// Block for a uniformly distributed number of units in `[min, max]`.
    ///
    /// # Arguments
    ///
    /// * `min` - Lower bound
    /// * `max` - Upper bound
    ///
    /// # Returns
    ///
    /// * `u32` - Units actually spent
    pub fn jitter(&mut self, min: u32, max: u32) -> u32 {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let units = match self.sample(min, max) {
            Some(units) => units,
            None => {
                self.fallbacks += 1;
                cprintln!("[cfi] jitter fallback");
                Self::fallback_units(max)
            }
        };
        self.delay(units);
        units
    }

    /// Block for a delay drawn from the configured bounds.
    pub fn jitter_default(&mut self) -> u32 {
        self.jitter(self.bounds.min, self.bounds.max)
    }

    /// Block for exactly `units`.
    pub fn delay(&mut self, units: u32) {
        spin(units);
        self.calls = self.calls.wrapping_add(1);
        self.total_units = self.total_units.wrapping_add(u64::from(units));
    }

    /// Underlying entropy source, for callers that also need raw random bytes.
    pub fn trng(&mut self) -> &mut dyn Trng {
        &mut *self.trng
    }

    pub fn bounds(&self) -> JitterBounds {
        self.bounds
    }

    /// Number of delays issued.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Number of delays that used the fallback duration.
    pub fn fallbacks(&self) -> u32 {
        self.fallbacks
    }

    pub fn total_units(&self) -> u64 {
        self.total_units
    }

    /// Fallback duration for a request whose upper bound is `max`.
    pub fn fallback_units(max: u32) -> u32 {
        max.max(JITTER_FALLBACK_UNITS)
    }

    fn sample(&mut self, min: u32, max: u32) -> Option<u32> {
        let range = u64::from(max - min) + 1;
        let space = 1u64 << 32;
        let zone = space - (space % range);
        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            let word = u64::from(trng::next_u32(&mut *self.trng).ok()?);
            if word < zone {
                return Some(min + (word % range) as u32);
            }
        }
        None
    }
}

#[inline(never)]
fn spin(units: u32) {
    for i in 0..units {
        core::hint::black_box(i);
        core::hint::spin_loop();
    }
}
