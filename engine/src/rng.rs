//! Uniform integer sources backing every die in the engine.
//!
//! All sources go through [`sample_uniform`], which rejects raw 32-bit draws
//! falling in the remainder band so `1..=sides` comes out without modulo bias.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{trace, warn};

/// One capability: a uniform integer in `1..=sides`.
pub trait RandomSource {
    fn roll_uniform(&mut self, sides: u32) -> u32;
}

/// Rejection-sample `draw` into `1..=sides`.
///
/// Raw values at or above the largest multiple of `sides` that fits under
/// `u32::MAX` are discarded and drawn again. `sides == 0` is treated as 1.
pub fn sample_uniform(mut draw: impl FnMut() -> u32, sides: u32) -> u32 {
    let sides = sides.max(1);
    let limit = u32::MAX - (u32::MAX % sides);
    loop {
        let v = draw();
        if v < limit {
            return (v % sides) + 1;
        }
        trace!(raw = v, sides, "rejected draw in remainder band");
    }
}

/// OS entropy when available, ChaCha seeded from the clock otherwise.
///
/// The fallback is picked lazily on the first failed OS read and kept for the
/// lifetime of the source.
pub struct EntropySource {
    fallback: Option<ChaCha8Rng>,
}

impl EntropySource {
    pub fn new() -> Self {
        Self { fallback: None }
    }

    fn next_u32(&mut self) -> u32 {
        if let Some(rng) = self.fallback.as_mut() {
            return rng.next_u32();
        }
        let mut buf = [0u8; 4];
        match OsRng.try_fill_bytes(&mut buf) {
            Ok(()) => u32::from_le_bytes(buf),
            Err(err) => {
                warn!(%err, "OS entropy unavailable; falling back to clock-seeded rng");
                let mut rng = ChaCha8Rng::seed_from_u64(clock_seed());
                let v = rng.next_u32();
                self.fallback = Some(rng);
                v
            }
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropySource {
    fn roll_uniform(&mut self, sides: u32) -> u32 {
        sample_uniform(|| self.next_u32(), sides)
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

/// Reproducible source for simulations.
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn roll_uniform(&mut self, sides: u32) -> u32 {
        sample_uniform(|| self.rng.next_u32(), sides)
    }
}

/// Replays fixed faces in order, cycling when exhausted.
///
/// Faces are clamped into `1..=sides` so a script can never produce an
/// impossible roll. An empty script always yields 1.
pub struct ScriptedSource {
    faces: VecDeque<u32>,
}

impl ScriptedSource {
    pub fn new(faces: Vec<u32>) -> Self {
        Self {
            faces: faces.into(),
        }
    }
}

impl RandomSource for ScriptedSource {
    fn roll_uniform(&mut self, sides: u32) -> u32 {
        let Some(face) = self.faces.pop_front() else {
            return 1;
        };
        self.faces.push_back(face);
        face.clamp(1, sides.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_skips_remainder_band() {
        // u32::MAX % 20 == 15, so the limit is u32::MAX - 15.
        let limit = u32::MAX - 15;
        let mut draws = vec![limit, limit + 3, 41].into_iter();
        let v = sample_uniform(|| draws.next().unwrap_or(0), 20);
        assert_eq!(v, 2);
        assert!(draws.next().is_none());
    }

    #[test]
    fn zero_sides_behaves_like_one() {
        let mut src = SeededSource::new(9);
        for _ in 0..50 {
            assert_eq!(src.roll_uniform(0), 1);
        }
    }

    #[test]
    fn scripted_cycles_and_clamps() {
        let mut src = ScriptedSource::new(vec![20, 2]);
        assert_eq!(src.roll_uniform(6), 6);
        assert_eq!(src.roll_uniform(6), 2);
        assert_eq!(src.roll_uniform(20), 20);
    }

    #[test]
    fn entropy_source_stays_in_range() {
        let mut src = EntropySource::new();
        for _ in 0..500 {
            let v = src.roll_uniform(12);
            assert!((1..=12).contains(&v));
        }
    }
}
