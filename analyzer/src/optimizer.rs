use log::debug;
use num_traits::Zero;

use bitblast::{Bit, BitVector};

use crate::analysis::{Analysis, AnalysisError};

/// Reduces gate expressions by discovering inputs with no effect on their
/// truth tables.
pub struct Optimizer;

impl Optimizer {
    /// Node-local reduction: repeatedly drops an inert immediate dependency
    /// or collapses a constant table, until the node is a constant or no
    /// dependency is inert.
    ///
    /// Returns the input handle itself when it is already minimal, so the
    /// smallest form is a fixed point by identity.
    pub fn optimize(bit: &Bit) -> Bit {
        let mut best = bit.clone();
        loop {
            let reduced = match (best.table(), best.dependencies()) {
                (Some(table), Some(dependencies)) => reduce_node(table, dependencies),
                _ => None,
            };
            match reduced {
                Some(next) => best = next,
                None => return best,
            }
        }
    }

    /// Whole-cone reduction: rebuilds the bit as a single gate over only
    /// the free inputs that affect its truth table, which is obtained by
    /// exhaustively evaluating a one-bit-wide vector around the bit.
    ///
    /// Returns the input handle unchanged when the bit has no free inputs,
    /// when none of them is inert, or when more than three survive (a gate
    /// cannot hold them).
    pub fn fix_inputs(bit: &Bit) -> Result<Bit, AnalysisError> {
        let analysis = Analysis::new(BitVector::new(vec![bit.clone()]));
        let mut survivors = analysis.inputs();
        if survivors.is_empty() {
            return Ok(bit.clone());
        }
        if survivors.len() >= 64 {
            return Err(AnalysisError::InputSpaceTooLarge { count: survivors.len() });
        }

        // Survivor k drives bit k of the enumeration index, so the computed
        // outputs are a truth table over the survivor list.
        let mut table: Vec<u8> = analysis
            .compute()?
            .iter()
            .map(|value| u8::from(!value.is_zero()))
            .collect();

        let mut eliminated = false;
        let mut position = 0;
        while position < survivors.len() {
            if axis_inert(&table, position) {
                debug!("input {:?} has no effect, dropping it", survivors[position]);
                table = drop_axis(&table, position);
                survivors.remove(position);
                eliminated = true;
            } else {
                position += 1;
            }
        }
        if !eliminated {
            return Ok(bit.clone());
        }
        if table.iter().all(|row| *row == 0) {
            return Ok(Bit::zero());
        }
        if table.iter().all(|row| *row == 1) {
            return Ok(Bit::one());
        }
        if survivors.len() > 3 {
            return Ok(bit.clone());
        }

        // Gate indices grow LSB-first over reversed dependency order while
        // the enumeration grew LSB-first over the survivor list; reversing
        // the survivors lines the two up.
        let dependencies: Vec<Bit> =
            survivors.iter().rev().map(|reference| reference.bit().clone()).collect();
        Ok(Bit::gate(table, dependencies))
    }
}

// True when the table ignores the axis: entries agree pairwise across it.
fn axis_inert(table: &[u8], axis: usize) -> bool {
    let stride = 1 << axis;
    (0..table.len())
        .filter(|index| index & stride == 0)
        .all(|index| table[index] == table[index | stride])
}

// Halves the table by fixing the (inert) axis to zero.
fn drop_axis(table: &[u8], axis: usize) -> Vec<u8> {
    let stride = 1 << axis;
    (0..table.len()).filter(|index| index & stride == 0).map(|index| table[index]).collect()
}

fn reduce_node(table: &[u8], dependencies: &[Bit]) -> Option<Bit> {
    match (dependencies.len(), table.len()) {
        (1, 2) => reduce1(table),
        (2, 4) => reduce2(table, dependencies),
        (3, 8) => reduce3(table, dependencies),
        _ => None,
    }
}

// A 1-input gate only reduces when its table is constant.
fn reduce1(table: &[u8]) -> Option<Bit> {
    if table == [0, 0] {
        return Some(Bit::zero());
    }
    if table == [1, 1] {
        return Some(Bit::one());
    }
    None
}

// Index layout for dependencies (a, b): idx = 2a + b.
fn reduce2(table: &[u8], dependencies: &[Bit]) -> Option<Bit> {
    if table[0] == table[1] && table[2] == table[3] {
        // b is inert
        return Some(Bit::gate(vec![table[0], table[2]], vec![dependencies[0].clone()]));
    }
    if table[0] == table[2] && table[1] == table[3] {
        // a is inert
        return Some(Bit::gate(vec![table[0], table[1]], vec![dependencies[1].clone()]));
    }
    None
}

// Index layout for dependencies (a, b, c): idx = 4a + 2b + c.
fn reduce3(table: &[u8], dependencies: &[Bit]) -> Option<Bit> {
    if table[0] == table[1] && table[2] == table[3] && table[4] == table[5] && table[6] == table[7]
    {
        // c is inert
        return Some(Bit::gate(
            vec![table[0], table[2], table[4], table[6]],
            vec![dependencies[0].clone(), dependencies[1].clone()],
        ));
    }
    if table[0] == table[2] && table[1] == table[3] && table[4] == table[6] && table[5] == table[7]
    {
        // b is inert
        return Some(Bit::gate(
            vec![table[0], table[1], table[4], table[5]],
            vec![dependencies[0].clone(), dependencies[2].clone()],
        ));
    }
    if table[0] == table[4] && table[1] == table[5] && table[2] == table[6] && table[3] == table[7]
    {
        // a is inert
        return Some(Bit::gate(
            vec![table[0], table[1], table[2], table[3]],
            vec![dependencies[1].clone(), dependencies[2].clone()],
        ));
    }
    None
}
