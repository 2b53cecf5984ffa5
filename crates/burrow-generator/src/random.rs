use crate::{Generator, GeneratorError};
use burrow_core::shortcode::{ALPHABET, SHORT_CODE_LENGTH};
use burrow_core::ShortCode;
use parking_lot::Mutex;
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

/// Bytes at or above this value are rejected so that `byte % 62` stays uniform.
const ACCEPT_BELOW: u8 = (u8::MAX / ALPHABET.len() as u8) * ALPHABET.len() as u8;

/// Draws short codes uniformly at random from the 62-character alphabet.
///
/// The randomness source is injected at construction, so tests can use a
/// seeded RNG and get a reproducible code sequence.
#[derive(Debug)]
pub struct RandomGenerator<R = StdRng> {
    rng: Mutex<R>,
}

impl RandomGenerator<StdRng> {
    /// Creates a generator seeded from the operating system's entropy source.
    pub fn from_entropy() -> Result<Self, GeneratorError> {
        let rng = StdRng::from_rng(OsRng).map_err(|e| GeneratorError::Unavailable(e.to_string()))?;
        Ok(Self::with_rng(rng))
    }

    /// Creates a deterministic generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send + 'static> RandomGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + Send + 'static> Generator for RandomGenerator<R> {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let mut code = String::with_capacity(SHORT_CODE_LENGTH);
        let mut buf = [0_u8; 16];
        let mut rng = self.rng.lock();

        while code.len() < SHORT_CODE_LENGTH {
            rng.try_fill_bytes(&mut buf)
                .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

            for byte in buf.iter().copied().filter(|b| *b < ACCEPT_BELOW) {
                code.push(ALPHABET[usize::from(byte) % ALPHABET.len()] as char);
                if code.len() == SHORT_CODE_LENGTH {
                    break;
                }
            }
        }

        Ok(ShortCode::new_unchecked(code))
    }
}
