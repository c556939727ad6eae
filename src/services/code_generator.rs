//! Short code generation
//!
//! Codes are drawn uniformly and independently per character from the
//! 62-symbol alphabet `[A-Za-z0-9]`. Uniqueness, not secrecy, is the goal,
//! so a non-cryptographic source is fine.

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::distr::{Alphanumeric, Distribution};
use rand::rngs::StdRng;

/// Default short code length.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Width of the `short_urls.short_code` column.
pub const MAX_CODE_LENGTH: usize = 32;

/// Produces candidate short codes. Injected into `LinkService`.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

enum RandomSource {
    Thread,
    Seeded(Mutex<StdRng>),
}

/// `CodeGenerator` backed by `rand`.
pub struct RandomCodeGenerator {
    source: RandomSource,
}

impl RandomCodeGenerator {
    /// Draws from the thread-local RNG, no shared state between workers.
    pub fn new() -> Self {
        Self {
            source: RandomSource::Thread,
        }
    }

    /// Deterministic sequence for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RandomSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> String {
        match &self.source {
            RandomSource::Thread => {
                let mut rng = rand::rng();
                (0..length)
                    .map(|_| Alphanumeric.sample(&mut rng) as char)
                    .collect()
            }
            RandomSource::Seeded(rng) => {
                let mut rng = rng.lock();
                (0..length)
                    .map(|_| Alphanumeric.sample(&mut *rng) as char)
                    .collect()
            }
        }
    }
}

/// Whether `code` could have been produced by a `CodeGenerator`.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
