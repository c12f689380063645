use num_bigint::BigUint;

use bitblast::{Bit, BitVector};
use bitblast_analyzer::{Analysis, AnalysisError};

#[test]
fn symbolic_addition_agrees_with_concrete_addition() {
    let width = 4;
    let symbolic = BitVector::variables(width);
    let offset = BitVector::from_integer(0b0101u8, width);
    let sum = symbolic.add(&offset).unwrap();

    // Sweeping the free inputs reproduces every concrete sum, wrap-around
    // included.
    let analysis = Analysis::new(sum);
    let inputs = analysis.inputs();
    assert_eq!(inputs.len(), width);
    let outputs = analysis.compute().unwrap();
    assert_eq!(outputs.len(), 16);

    for (assignment, output) in outputs.iter().enumerate() {
        // Input k holds bit k of the assignment index; input order follows
        // construction order, most significant vector position first.
        let mut operand = 0u64;
        for position in 0..width {
            let bit = (assignment >> position) & 1;
            operand |= (bit as u64) << (width - 1 - position);
        }
        let expected = (operand + 0b0101) % 16;
        assert_eq!(output, &BigUint::from(expected));
    }
}

#[test]
fn compute_only_touches_free_variables() {
    let assigned = Bit::variable();
    assigned.assign(Some(1)).unwrap();
    let free = Bit::variable();
    let vector = BitVector::new(vec![Bit::and(&assigned, &free)]);
    let analysis = Analysis::new(vector);

    // Only the free variable is swept; the assigned one keeps its value.
    assert_eq!(analysis.inputs_len(), 1);
    let outputs = analysis.compute().unwrap();
    assert_eq!(outputs, vec![BigUint::from(0u8), BigUint::from(1u8)]);
    assert!(assigned.is_concrete());
    assert!(!free.is_concrete());
}

#[test]
fn compute_rejects_unenumerable_input_spaces() {
    let vector = BitVector::variables(64);
    let error = Analysis::new(vector).compute().unwrap_err();
    assert_eq!(error, AnalysisError::InputSpaceTooLarge { count: 64 });
}

#[test]
fn individualize_matches_per_position_analyses() {
    let a = Bit::variable();
    let b = Bit::variable();
    let vector = BitVector::new(vec![Bit::xor(&a, &b), a.clone(), Bit::zero()]);
    let analysis = Analysis::new(vector);

    let individualized = analysis.individualize();
    let lens: Vec<usize> =
        individualized.iter().map(|analysis| analysis.inputs_len()).collect();
    assert_eq!(lens, analysis.inputs_len_individualized());
}
