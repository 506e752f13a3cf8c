//! Random source for the filler values in chart payloads and the technical-coverage
//! perturbation. Injected so tests can pin the output.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait FillerSource {
    /// Uniform integer in `[low, high)`. Implementations return `low` when the range is empty.
    fn sample(&mut self, low: i32, high: i32) -> i32;
}

/// Thread-local RNG. Holds no state, so it is `Send` and cheap to create per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadFiller;

impl FillerSource for ThreadFiller {
    fn sample(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        rand::thread_rng().gen_range(low..high)
    }
}

/// Reproducible filler, for replaying an analysis or for tests.
#[derive(Debug, Clone)]
pub struct SeededFiller(StdRng);

impl SeededFiller {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl FillerSource for SeededFiller {
    fn sample(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.0.gen_range(low..high)
    }
}
