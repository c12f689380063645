use thiserror::Error;

/// Errors surfaced by the bit and bit-vector algebra.
///
/// Nothing is retried internally and a failing operation leaves the
/// operands untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BitError {
    #[error("assignment must be 0, 1 or unset, got {0}")]
    BadAssignment(u8),
    #[error("only variable bits accept assignments")]
    NotVariable,
    #[error("bit vectors must have the same length: {lhs} != {rhs}")]
    LengthMismatch { lhs: usize, rhs: usize },
    #[error("range {start}..{end} is out of bounds for a vector of {len} bits")]
    BadSlice { start: usize, end: usize, len: usize },
    #[error("bit vector is not concrete")]
    NotConcrete,
    #[error("cannot shift a vector of {len} bits by {amount}")]
    BadShift { amount: usize, len: usize },
}
