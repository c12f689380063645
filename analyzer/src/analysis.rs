use std::collections::BTreeSet;
use std::ops::Range;

use log::trace;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use thiserror::Error;

use bitblast::{BitError, BitVector, Reference};

/// Errors surfaced by the analysis layer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Bit(#[from] BitError),
    #[error("{count} free inputs cannot be enumerated exhaustively")]
    InputSpaceTooLarge { count: usize },
}

/// Inspects the free-variable surface of a bit-vector and evaluates the
/// vector across assignments of those variables.
pub struct Analysis {
    vector: BitVector,
}

impl Analysis {
    pub fn new(vector: BitVector) -> Analysis {
        Analysis { vector }
    }

    /// The vector under analysis.
    pub fn vector(&self) -> &BitVector {
        &self.vector
    }

    /// The distinct unset variables the vector depends on, in identity
    /// order. Variables holding a definite value are excluded; assigning
    /// one of the returned variables removes it from subsequent calls.
    pub fn inputs(&self) -> Vec<Reference> {
        let mut found = BTreeSet::new();
        for index in 0..self.vector.len() {
            for reference in self.vector.bit(index).inputs() {
                if !reference.bit().is_concrete() {
                    found.insert(reference);
                }
            }
        }
        found.into_iter().collect()
    }

    /// The distinct top-level bits of the vector.
    pub fn outputs(&self) -> BTreeSet<Reference> {
        (0..self.vector.len()).map(|index| Reference::from(self.vector.bit(index))).collect()
    }

    /// Cardinality of the output value space over the distinct top-level
    /// bits.
    pub fn outputs_size(&self) -> BigUint {
        BigUint::one() << self.outputs().len()
    }

    pub fn inputs_len(&self) -> usize {
        self.inputs().len()
    }

    /// Cardinality of the input assignment space; zero by convention when
    /// the vector has no free inputs.
    pub fn inputs_size(&self) -> BigUint {
        let count = self.inputs_len();
        if count == 0 {
            BigUint::zero()
        } else {
            BigUint::one() << count
        }
    }

    /// Free-input count of each position.
    pub fn inputs_len_individualized(&self) -> Vec<usize> {
        (0..self.vector.len())
            .map(|index| {
                self.vector
                    .bit(index)
                    .inputs()
                    .iter()
                    .filter(|reference| !reference.bit().is_concrete())
                    .count()
            })
            .collect()
    }

    /// Sum over positions of each position's assignment space, skipping
    /// positions with no free inputs.
    pub fn inputs_size_individualized(&self) -> BigUint {
        let mut total = BigUint::zero();
        for count in self.inputs_len_individualized() {
            if count > 0 {
                total += BigUint::one() << count;
            }
        }
        total
    }

    /// One analysis per position, each over a one-bit-wide view.
    pub fn individualize(&self) -> Vec<Analysis> {
        (0..self.vector.len())
            .map(|index| Analysis::new(BitVector::new(vec![self.vector.bit(index).clone()])))
            .collect()
    }

    /// Evaluates the vector for every assignment of its free inputs, in
    /// index order `0..2^inputs_len()`.
    ///
    /// Destructive while running: input variables are assigned and then
    /// reset to unset, on failing sweeps too. Not re-entrant over
    /// overlapping variable sets.
    pub fn compute(&self) -> Result<Vec<BigUint>, AnalysisError> {
        let inputs = self.inputs();
        if inputs.len() >= 64 {
            return Err(AnalysisError::InputSpaceTooLarge { count: inputs.len() });
        }
        self.compute_over(&inputs, 0..(1u64 << inputs.len()))
    }

    /// Evaluates each position separately across the assignments of its
    /// own free inputs.
    pub fn compute_individualized(&self) -> Result<Vec<Vec<BigUint>>, AnalysisError> {
        self.individualize().iter().map(Analysis::compute).collect()
    }

    /// Evaluates the vector for each assignment index in `range`; input
    /// variable `k` takes bit `k` of the index.
    pub fn compute_range(&self, range: Range<u64>) -> Result<Vec<BigUint>, AnalysisError> {
        let inputs = self.inputs();
        if inputs.len() > 64 {
            return Err(AnalysisError::InputSpaceTooLarge { count: inputs.len() });
        }
        self.compute_over(&inputs, range)
    }

    fn compute_over(
        &self,
        inputs: &[Reference],
        range: Range<u64>,
    ) -> Result<Vec<BigUint>, AnalysisError> {
        trace!(
            "computing {} assignments over {} free inputs",
            range.end.saturating_sub(range.start),
            inputs.len()
        );
        let outputs = self.sweep(inputs, range);
        // Touched variables go back to unknown even when a sweep fails
        // part-way through.
        for input in inputs {
            let _ = input.bit().assign(None);
        }
        outputs
    }

    fn sweep(&self, inputs: &[Reference], range: Range<u64>) -> Result<Vec<BigUint>, AnalysisError> {
        let mut outputs = Vec::new();
        for assignment in range {
            for (position, input) in inputs.iter().enumerate() {
                input.bit().assign(Some(((assignment >> position) & 1) as u8))?;
            }
            outputs.push(self.vector.to_integer()?);
        }
        Ok(outputs)
    }
}
