//! SHA-256 as laid out in FIPS PUB 180-4, assembled from the bitblast
//! bit-vector algebra. Concrete inputs produce ordinary digests; symbolic
//! inputs produce gate networks over the free message bits.

mod constants;
mod functions;
mod sha256;

pub use constants::{initial_digest, round_constants, SIZE_WORD};
pub use functions::{
    choose, gamma0, gamma1, init_words, majority, round_big, round_small, sigma0, sigma1, word,
};
pub use sha256::Sha256;
