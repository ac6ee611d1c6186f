//! Bounded per-page size perturbation.
//!
//! Jitter only ever touches page width and height. Slice thickness is never
//! jittered because the page stack must tile the block exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Default jitter bound as a fraction of the nominal dimension (±0.5%).
pub const DEFAULT_AMPLITUDE: f32 = 0.005;

/// Seed used by [`SeededJitter::default`].
pub const DEFAULT_SEED: u64 = 0x0B1B_1E5E_ED00_0001;

/// Which page dimension is being perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JitterKind {
    PageWidth,
    PageHeight,
}

/// Source of page perturbations.
pub trait JitterSource {
    /// Fractional perturbation in `[-amplitude, amplitude]` for page `index`.
    fn jitter(&mut self, kind: JitterKind, index: usize) -> f32;
}

/// Deterministic jitter keyed by `(kind, index)`.
///
/// Each value is drawn from its own seeded stream and cached, so it does not
/// depend on call order, page count, or how many layouts ran before. A color
/// change therefore never moves a page.
#[derive(Debug, Clone)]
pub struct SeededJitter {
    seed: u64,
    amplitude: f32,
    cache: HashMap<(JitterKind, usize), f32>,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self::with_amplitude(seed, DEFAULT_AMPLITUDE)
    }

    pub fn with_amplitude(seed: u64, amplitude: f32) -> Self {
        Self {
            seed,
            amplitude: amplitude.abs(),
            cache: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of cached values.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn draw(&self, kind: JitterKind, index: usize) -> f32 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        let mut rng = StdRng::seed_from_u64(stream_seed(self.seed, kind, index));
        rng.random_range(-self.amplitude..=self.amplitude)
    }
}

impl Default for SeededJitter {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl JitterSource for SeededJitter {
    fn jitter(&mut self, kind: JitterKind, index: usize) -> f32 {
        if let Some(value) = self.cache.get(&(kind, index)) {
            return *value;
        }
        let value = self.draw(kind, index);
        self.cache.insert((kind, index), value);
        value
    }
}

/// Fresh thread-local randomness on every call.
///
/// Pages change size on every layout, which shows up as popping whenever any
/// setting changes. Only useful for stills.
#[derive(Debug, Clone, Copy)]
pub struct ThreadJitter {
    pub amplitude: f32,
}

impl Default for ThreadJitter {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_AMPLITUDE,
        }
    }
}

impl JitterSource for ThreadJitter {
    fn jitter(&mut self, _kind: JitterKind, _index: usize) -> f32 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        rand::rng().random_range(-self.amplitude..=self.amplitude)
    }
}

/// Perfectly uniform pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn jitter(&mut self, _kind: JitterKind, _index: usize) -> f32 {
        0.0
    }
}

// splitmix64 finalizer over the key
fn stream_seed(seed: u64, kind: JitterKind, index: usize) -> u64 {
    let tag = match kind {
        JitterKind::PageWidth => 0x57,
        JitterKind::PageHeight => 0x48,
    };
    let mut z = seed
        ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (tag << 56);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
