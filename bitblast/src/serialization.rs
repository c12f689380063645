use std::collections::HashMap;
use std::io::{Read, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bit::{Bit, Kind, Reference};
use crate::bitvector::BitVector;

/// Errors surfaced by the document layer.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("malformed document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("node {id} references undefined dependency {dependency}")]
    UndefinedDependency { id: u64, dependency: u64 },
    #[error("node {id} is defined more than once")]
    DuplicateNode { id: u64 },
    #[error("node {id} does not decode to a constant, variable or gate")]
    AmbiguousNode { id: u64 },
    #[error("node {id} has {count} dependencies, expected 1 to 3")]
    BadArity { id: u64, count: usize },
    #[error("node {id} carries value {value}, expected a bit")]
    BadValue { id: u64, value: u8 },
    #[error("node {id} encodes a table wider than its arity allows")]
    BadTable { id: u64 },
    #[error("bitvector references undefined node {id}")]
    UndefinedTopLevel { id: u64 },
}

/// The persisted document: node records in topological order plus the
/// per-position top-level node ids.
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    bits: Vec<NodeRecord>,
    bitvector: Vec<u64>,
}

/// One node of the DAG. A record with a `value` is a constant (assigned
/// variables are persisted the same way), a record with a `gate` is a gate
/// expression, and a bare record is an unset variable.
#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<u64>>,
}

/// Packs a truth table into an unsigned integer, highest table index in the
/// lowest bit: `[0, 0, 0, 1]` encodes to 1, `[1, 0, 0, 0]` to 8.
pub fn encode_gate(table: &[u8]) -> u64 {
    let mut value = 0;
    for row in table {
        value = (value << 1) | u64::from(*row);
    }
    value
}

/// Unpacks a truth table of `2^arity` rows from its integer encoding.
pub fn decode_gate(gate: u64, arity: usize) -> Vec<u8> {
    let rows = 1usize << arity;
    (0..rows).rev().map(|row| ((gate >> row) & 1) as u8).collect()
}

/// Writes the vector's DAG to the stream as a YAML document.
///
/// Nodes are emitted children before parents, with dense ids assigned in
/// first-visit order of a left-to-right depth-first walk over each
/// position's top node. Shared subgraphs are emitted once.
pub fn serialize<W: Write>(vector: &BitVector, writer: W) -> Result<(), SerializationError> {
    let mut seen: IndexMap<Reference, u64> = IndexMap::new();
    let mut records = Vec::new();
    let mut top = Vec::new();
    for index in 0..vector.len() {
        top.push(collect(vector.bit(index), &mut seen, &mut records));
    }
    serde_yaml::to_writer(writer, &Document { bits: records, bitvector: top })?;
    Ok(())
}

// Post-order DFS with an explicit stack; rebuilt message schedules nest far
// too deep for recursion.
fn collect(bit: &Bit, seen: &mut IndexMap<Reference, u64>, records: &mut Vec<NodeRecord>) -> u64 {
    enum Step {
        Enter(Bit),
        Exit(Bit),
    }

    let mut stack = vec![Step::Enter(bit.clone())];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(bit) => {
                if seen.contains_key(&Reference::from(&bit)) {
                    continue;
                }
                if let Some(dependencies) = bit.dependencies() {
                    // Reversed pushes keep the visit order left-to-right.
                    stack.push(Step::Exit(bit.clone()));
                    for dependency in dependencies.iter().rev() {
                        stack.push(Step::Enter(dependency.clone()));
                    }
                } else {
                    stack.push(Step::Exit(bit));
                }
            }
            Step::Exit(bit) => {
                let reference = Reference::from(&bit);
                if seen.contains_key(&reference) {
                    continue;
                }
                let id = seen.len() as u64;
                records.push(record(&bit, id, seen));
                seen.insert(reference, id);
            }
        }
    }
    seen[&Reference::from(bit)]
}

fn record(bit: &Bit, id: u64, seen: &IndexMap<Reference, u64>) -> NodeRecord {
    match bit.kind() {
        Kind::Constant(value) => {
            NodeRecord { id, value: Some(*value), gate: None, dependencies: None }
        }
        Kind::Variable(slot) => NodeRecord { id, value: slot.get(), gate: None, dependencies: None },
        Kind::Gate { table, dependencies } => NodeRecord {
            id,
            value: None,
            gate: Some(encode_gate(table)),
            dependencies: Some(
                dependencies.iter().map(|dependency| seen[&Reference::from(dependency)]).collect(),
            ),
        },
    }
}

/// Reads a YAML document back into a bit-vector.
///
/// Records are materialized in document order, so every dependency id must
/// already be defined. A record with a `value` loads as a constant and a
/// bare record as an unset variable; the format cannot tell an assigned
/// variable from a constant.
pub fn deserialize<R: Read>(reader: R) -> Result<BitVector, SerializationError> {
    let document: Document = serde_yaml::from_reader(reader)?;
    let mut nodes: HashMap<u64, Bit> = HashMap::new();
    for record in &document.bits {
        if nodes.contains_key(&record.id) {
            return Err(SerializationError::DuplicateNode { id: record.id });
        }
        let bit = match (record.value, record.gate, &record.dependencies) {
            (Some(value), None, None) => match value {
                0 => Bit::zero(),
                1 => Bit::one(),
                value => return Err(SerializationError::BadValue { id: record.id, value }),
            },
            (None, Some(gate), Some(dependency_ids)) => {
                if !(1..=3).contains(&dependency_ids.len()) {
                    return Err(SerializationError::BadArity {
                        id: record.id,
                        count: dependency_ids.len(),
                    });
                }
                let rows = 1u32 << dependency_ids.len();
                if gate >> rows != 0 {
                    return Err(SerializationError::BadTable { id: record.id });
                }
                let mut dependencies = Vec::with_capacity(dependency_ids.len());
                for dependency in dependency_ids {
                    let node = nodes.get(dependency).ok_or(
                        SerializationError::UndefinedDependency {
                            id: record.id,
                            dependency: *dependency,
                        },
                    )?;
                    dependencies.push(node.clone());
                }
                Bit::gate(decode_gate(gate, dependency_ids.len()), dependencies)
            }
            (None, None, None) => Bit::variable(),
            _ => return Err(SerializationError::AmbiguousNode { id: record.id }),
        };
        nodes.insert(record.id, bit);
    }
    let mut bits = Vec::with_capacity(document.bitvector.len());
    for id in &document.bitvector {
        let node =
            nodes.get(id).ok_or(SerializationError::UndefinedTopLevel { id: *id })?;
        bits.push(node.clone());
    }
    Ok(BitVector::new(bits))
}
