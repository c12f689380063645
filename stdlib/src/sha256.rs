use bitblast::{BitError, BitVector};

use crate::constants::{initial_digest, round_constants};
use crate::functions::{init_words, round_big};

const BLOCK_BITS: usize = 512;
const LENGTH_BITS: usize = 64;

/// SHA-256 over symbolic bit-vectors, as laid out in FIPS PUB 180-4.
///
/// When the message is concrete the whole pipeline short-circuits to
/// constant arithmetic; when it carries free variables the digest words are
/// gate networks over those variables.
pub struct Sha256 {
    digest: Vec<BitVector>,
    constants: Vec<BitVector>,
}

impl Default for Sha256 {
    fn default() -> Sha256 {
        Sha256::new()
    }
}

impl Sha256 {
    pub fn new() -> Sha256 {
        Sha256 { digest: initial_digest(), constants: round_constants() }
    }

    /// Pads a message to a whole number of 512-bit blocks: a one bit, a
    /// zero fill and the 64-bit message length.
    pub fn pad(message: &BitVector) -> Result<BitVector, BitError> {
        let length = message.len();
        let padded = (length + 1 + LENGTH_BITS).div_ceil(BLOCK_BITS) * BLOCK_BITS;
        let mut data = BitVector::variables(padded);
        data.assign(0..length, message)?;
        data.assign(length..length + 1, 1u8)?;
        data.assign(length + 1..padded - LENGTH_BITS, 0u8)?;
        data.assign(padded - LENGTH_BITS..padded, BitVector::from_integer(length, LENGTH_BITS))?;
        Ok(data)
    }

    /// Runs every block of the padded message through the compression
    /// function and returns the eight digest words.
    pub fn finalize(mut self, message: &BitVector) -> Result<Vec<BitVector>, BitError> {
        let data = Sha256::pad(message)?;
        for start in (0..data.len()).step_by(BLOCK_BITS) {
            self.transform(&data.slice(start..start + BLOCK_BITS)?)?;
        }
        Ok(self.digest)
    }

    fn transform(&mut self, block: &BitVector) -> Result<(), BitError> {
        let w = init_words(block)?;
        let mut registers = self.digest.clone();
        for offset in (0..64).step_by(4) {
            round_big(&mut registers, &w, offset, &self.constants)?;
        }
        for index in 0..8 {
            self.digest[index] = self.digest[index].add(&registers[index])?;
        }
        Ok(())
    }
}
