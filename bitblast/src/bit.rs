use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::error::BitError;
use crate::serialization::encode_gate;

// Identity tags are assigned monotonically at construction so that the
// ordering of references is reproducible within a process.
static NEXT_TAG: AtomicU64 = AtomicU64::new(0);

fn next_tag() -> u64 {
    NEXT_TAG.fetch_add(1, AtomicOrdering::Relaxed)
}

thread_local! {
    static ZERO: Bit = Bit::with_kind(Kind::Constant(0));
    static ONE: Bit = Bit::with_kind(Kind::Constant(1));
}

/// A single bit in the symbolic DAG: a constant, a mutable variable slot or
/// a gate expression over one to three dependency bits.
///
/// `Bit` is a cheap handle; cloning shares the underlying node. Identity,
/// not structure, distinguishes nodes — two distinct variables are distinct
/// even when both hold the same value. Use [`Reference`] wherever set or map
/// semantics over bits are required.
#[derive(Clone)]
pub struct Bit(Rc<Node>);

struct Node {
    tag: u64,
    kind: Kind,
}

impl Drop for Node {
    fn drop(&mut self) {
        // Unlink dependencies iteratively; SHA-scale gate chains are deep
        // enough to overflow the stack under the default recursive drop.
        let mut stack: Vec<Bit> = match &mut self.kind {
            Kind::Gate { dependencies, .. } => std::mem::take(dependencies),
            _ => return,
        };
        while let Some(Bit(node)) = stack.pop() {
            if let Ok(mut node) = Rc::try_unwrap(node) {
                if let Kind::Gate { dependencies, .. } = &mut node.kind {
                    stack.extend(std::mem::take(dependencies));
                }
            }
        }
    }
}

pub(crate) enum Kind {
    Constant(u8),
    Variable(Cell<Option<u8>>),
    Gate { table: Vec<u8>, dependencies: Vec<Bit> },
}

impl Bit {
    fn with_kind(kind: Kind) -> Bit {
        Bit(Rc::new(Node { tag: next_tag(), kind }))
    }

    /// The canonical constant-zero bit.
    pub fn zero() -> Bit {
        ZERO.with(Bit::clone)
    }

    /// The canonical constant-one bit.
    pub fn one() -> Bit {
        ONE.with(Bit::clone)
    }

    /// The canonical constant for the given value.
    pub fn constant(value: u8) -> Result<Bit, BitError> {
        match value {
            0 => Ok(Bit::zero()),
            1 => Ok(Bit::one()),
            other => Err(BitError::BadAssignment(other)),
        }
    }

    /// A fresh variable with no value yet.
    pub fn variable() -> Bit {
        Bit::with_kind(Kind::Variable(Cell::new(None)))
    }

    /// A gate with the given truth table over one to three dependencies.
    ///
    /// The table holds `2^n` output bits for `n` dependencies and is indexed
    /// by assembling the dependency values LSB-first over reversed
    /// dependency order: the last dependency contributes the lowest index
    /// bit.
    ///
    /// # Panics
    ///
    /// Panics when the arity is outside `1..=3`, when the table length is
    /// not `2^arity` or when a table entry is not a bit.
    pub fn gate(table: Vec<u8>, dependencies: Vec<Bit>) -> Bit {
        assert!((1..=3).contains(&dependencies.len()), "gates take 1 to 3 dependencies");
        assert_eq!(table.len(), 1 << dependencies.len(), "table length must be 2^arity");
        assert!(table.iter().all(|row| *row <= 1), "table entries must be bits");
        Bit::with_kind(Kind::Gate { table, dependencies })
    }

    pub fn not(a: &Bit) -> Bit {
        Bit::gate(vec![1, 0], vec![a.clone()])
    }

    pub fn and(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![0, 0, 0, 1], vec![a.clone(), b.clone()])
    }

    pub fn or(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![0, 1, 1, 1], vec![a.clone(), b.clone()])
    }

    pub fn xor(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![0, 1, 1, 0], vec![a.clone(), b.clone()])
    }

    pub fn lt(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![0, 0, 1, 0], vec![a.clone(), b.clone()])
    }

    pub fn le(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![1, 0, 1, 1], vec![a.clone(), b.clone()])
    }

    pub fn gt(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![0, 1, 0, 0], vec![a.clone(), b.clone()])
    }

    pub fn ge(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![1, 1, 0, 1], vec![a.clone(), b.clone()])
    }

    pub fn eq(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![1, 0, 0, 1], vec![a.clone(), b.clone()])
    }

    pub fn ne(a: &Bit, b: &Bit) -> Bit {
        Bit::gate(vec![0, 1, 1, 0], vec![a.clone(), b.clone()])
    }

    /// Builds the sum and carry gates of a full adder; both share the same
    /// three dependency bits.
    pub fn add3(a: &Bit, b: &Bit, carry: &Bit) -> (Bit, Bit) {
        let dependencies = vec![a.clone(), b.clone(), carry.clone()];
        let sum = Bit::gate(vec![0, 1, 1, 0, 1, 0, 0, 1], dependencies.clone());
        let carry_out = Bit::gate(vec![0, 0, 0, 1, 0, 1, 1, 1], dependencies);
        (sum, carry_out)
    }

    pub(crate) fn tag(&self) -> u64 {
        self.0.tag
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.0.kind
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.0.kind, Kind::Constant(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.0.kind, Kind::Variable(_))
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.0.kind, Kind::Gate { .. })
    }

    /// The truth table, for gate bits.
    pub fn table(&self) -> Option<&[u8]> {
        match &self.0.kind {
            Kind::Gate { table, .. } => Some(table),
            _ => None,
        }
    }

    /// The ordered dependency bits, for gate bits.
    pub fn dependencies(&self) -> Option<&[Bit]> {
        match &self.0.kind {
            Kind::Gate { dependencies, .. } => Some(dependencies),
            _ => None,
        }
    }

    /// Writes a value into a variable slot; `None` clears it back to
    /// unknown. Constants and gates reject assignment.
    pub fn assign(&self, value: Option<u8>) -> Result<(), BitError> {
        if let Some(value) = value {
            if value > 1 {
                return Err(BitError::BadAssignment(value));
            }
        }
        match &self.0.kind {
            Kind::Variable(slot) => {
                slot.set(value);
                Ok(())
            }
            _ => Err(BitError::NotVariable),
        }
    }

    /// True for constants, for variables holding a definite value and for
    /// gates whose whole dependency cone is concrete.
    pub fn is_concrete(&self) -> bool {
        // Iterative sweep with identity dedup: SHA-scale cones share
        // subgraphs heavily and nest thousands of nodes deep.
        let mut visited = HashSet::new();
        let mut stack = vec![self.clone()];
        while let Some(bit) = stack.pop() {
            if !visited.insert(bit.tag()) {
                continue;
            }
            match &bit.0.kind {
                Kind::Constant(_) => {}
                Kind::Variable(slot) => {
                    if slot.get().is_none() {
                        return false;
                    }
                }
                Kind::Gate { dependencies, .. } => stack.extend(dependencies.iter().cloned()),
            }
        }
        true
    }

    /// Evaluates a concrete bit.
    ///
    /// Fails with [`BitError::NotConcrete`] when any variable in the
    /// dependency cone is unset. Shared subgraphs are evaluated once.
    pub fn eval(&self) -> Result<u8, BitError> {
        let mut values: HashMap<u64, u8> = HashMap::new();
        let mut stack = vec![self.clone()];
        while let Some(bit) = stack.pop() {
            if values.contains_key(&bit.tag()) {
                continue;
            }
            match &bit.0.kind {
                Kind::Constant(value) => {
                    values.insert(bit.tag(), *value);
                }
                Kind::Variable(slot) => match slot.get() {
                    Some(value) => {
                        values.insert(bit.tag(), value);
                    }
                    None => return Err(BitError::NotConcrete),
                },
                Kind::Gate { table, dependencies } => {
                    let pending: Vec<Bit> = dependencies
                        .iter()
                        .filter(|dependency| !values.contains_key(&dependency.tag()))
                        .cloned()
                        .collect();
                    if pending.is_empty() {
                        let mut index = 0usize;
                        for (position, dependency) in dependencies.iter().rev().enumerate() {
                            index |= usize::from(values[&dependency.tag()]) << position;
                        }
                        values.insert(bit.tag(), table[index]);
                    } else {
                        stack.push(bit.clone());
                        stack.extend(pending);
                    }
                }
            }
        }
        Ok(values[&self.tag()])
    }

    /// Renders the gate-vector form bottom-up. Shared subgraphs are
    /// rendered once and reused; deep chains do not recurse.
    pub(crate) fn render(&self) -> String {
        let mut rendered: HashMap<u64, String> = HashMap::new();
        let mut stack = vec![self.clone()];
        while let Some(bit) = stack.pop() {
            if rendered.contains_key(&bit.tag()) {
                continue;
            }
            match &bit.0.kind {
                Kind::Constant(value) => {
                    rendered.insert(bit.tag(), value.to_string());
                }
                Kind::Variable(slot) => {
                    let text = match slot.get() {
                        Some(value) => value.to_string(),
                        None => "?".to_string(),
                    };
                    rendered.insert(bit.tag(), text);
                }
                Kind::Gate { table, dependencies } => {
                    let pending: Vec<Bit> = dependencies
                        .iter()
                        .filter(|dependency| !rendered.contains_key(&dependency.tag()))
                        .cloned()
                        .collect();
                    if pending.is_empty() {
                        let encoded = encode_gate(table);
                        let text = match dependencies.as_slice() {
                            [a] => format!("({encoded} {})", rendered[&a.tag()]),
                            [a, b] => {
                                format!("({} {encoded} {})", rendered[&a.tag()], rendered[&b.tag()])
                            }
                            [a, b, c] => format!(
                                "({} {encoded} {} {})",
                                rendered[&a.tag()],
                                rendered[&b.tag()],
                                rendered[&c.tag()]
                            ),
                            _ => unreachable!("gates take 1 to 3 dependencies"),
                        };
                        rendered.insert(bit.tag(), text);
                    } else {
                        stack.push(bit.clone());
                        stack.extend(pending);
                    }
                }
            }
        }
        rendered.remove(&self.tag()).unwrap_or_default()
    }

    /// All variable leaves of the dependency cone, deduplicated by
    /// identity. Constants contribute nothing; a variable contributes
    /// itself whether or not it currently holds a value.
    pub fn inputs(&self) -> BTreeSet<Reference> {
        let mut visited = HashSet::new();
        let mut found = BTreeSet::new();
        let mut stack = vec![self.clone()];
        while let Some(bit) = stack.pop() {
            if !visited.insert(bit.tag()) {
                continue;
            }
            match &bit.0.kind {
                Kind::Constant(_) => {}
                Kind::Variable(_) => {
                    found.insert(Reference::new(bit.clone()));
                }
                Kind::Gate { dependencies, .. } => stack.extend(dependencies.iter().cloned()),
            }
        }
        found
    }
}

impl Not for &Bit {
    type Output = Bit;
    fn not(self) -> Bit {
        Bit::not(self)
    }
}

impl BitAnd for &Bit {
    type Output = Bit;
    fn bitand(self, rhs: &Bit) -> Bit {
        Bit::and(self, rhs)
    }
}

impl BitOr for &Bit {
    type Output = Bit;
    fn bitor(self, rhs: &Bit) -> Bit {
        Bit::or(self, rhs)
    }
}

impl BitXor for &Bit {
    type Output = Bit;
    fn bitxor(self, rhs: &Bit) -> Bit {
        Bit::xor(self, rhs)
    }
}

impl fmt::Display for Bit {
    /// Renders constants and set variables as their value, unset variables
    /// as `?` and gates as a parenthesized list around the encoded table,
    /// e.g. `(0 7 (1 1 ?))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// An identity-keyed handle to a bit.
///
/// Equality, ordering and hashing follow the node's identity tag, never its
/// structure. This is the only admissible key type for sets and maps over
/// bits: distinct variables compare unequal even when their values agree.
#[derive(Clone)]
pub struct Reference(Bit);

impl Reference {
    pub fn new(bit: Bit) -> Reference {
        Reference(bit)
    }

    /// The referenced bit.
    pub fn bit(&self) -> &Bit {
        &self.0
    }

    /// The identity tag the reference is keyed on.
    pub fn tag(&self) -> u64 {
        self.0.tag()
    }
}

impl From<&Bit> for Reference {
    fn from(bit: &Bit) -> Reference {
        Reference(bit.clone())
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Reference) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for Reference {}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Reference) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Reference) -> Ordering {
        self.tag().cmp(&other.tag())
    }
}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reference").field(&self.tag()).finish()
    }
}
