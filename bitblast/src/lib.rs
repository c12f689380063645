// Symbolic bit-level computation. Bits are nodes in a directed acyclic
// graph whose leaves are constants or variables and whose interior nodes
// are gates described by truth tables over their dependencies.

pub mod bit;
pub mod bitvector;
mod error;
pub mod serialization;

pub use bit::{Bit, Reference};
pub use bitvector::{bit_len, AssignSource, BitVector};
pub use error::BitError;
pub use serialization::{deserialize, serialize, SerializationError};
