use std::fmt;
use std::ops::{Not, Range};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bit::Bit;
use crate::error::BitError;

/// Number of bits in the given number of bytes.
pub fn bit_len(bytes: usize) -> usize {
    bytes * 8
}

/// A fixed-length ordered sequence of bits with big-endian integer
/// semantics: index 0 is the most significant bit.
///
/// Vectors own their positional slot list but share the bit nodes those
/// slots point to. Slicing copies the slot list, never the nodes, so a
/// slice is an independently assignable view whose variables stay live in
/// the parent.
#[derive(Clone)]
pub struct BitVector {
    bits: Vec<Bit>,
}

/// The accepted right-hand sides of a range assignment.
pub enum AssignSource {
    /// Element-wise copy of another vector's bit handles.
    Vector(BitVector),
    /// A single bit; the target range must be exactly one wide.
    Single(Bit),
    /// Constant bits reading back the integer modulo the range width.
    Integer(BigUint),
}

impl From<BitVector> for AssignSource {
    fn from(vector: BitVector) -> AssignSource {
        AssignSource::Vector(vector)
    }
}

impl From<&BitVector> for AssignSource {
    fn from(vector: &BitVector) -> AssignSource {
        AssignSource::Vector(vector.clone())
    }
}

impl From<Bit> for AssignSource {
    fn from(bit: Bit) -> AssignSource {
        AssignSource::Single(bit)
    }
}

impl From<&Bit> for AssignSource {
    fn from(bit: &Bit) -> AssignSource {
        AssignSource::Single(bit.clone())
    }
}

impl From<BigUint> for AssignSource {
    fn from(value: BigUint) -> AssignSource {
        AssignSource::Integer(value)
    }
}

macro_rules! assign_source_from_uint {
    ($($t:ty),*) => {
        $(impl From<$t> for AssignSource {
            fn from(value: $t) -> AssignSource {
                AssignSource::Integer(BigUint::from(value))
            }
        })*
    };
}

assign_source_from_uint!(u8, u16, u32, u64, u128, usize);

impl BitVector {
    /// A vector over the given bit handles.
    pub fn new(bits: Vec<Bit>) -> BitVector {
        BitVector { bits }
    }

    /// A vector of `length` fresh unset variables.
    pub fn variables(length: usize) -> BitVector {
        BitVector { bits: (0..length).map(|_| Bit::variable()).collect() }
    }

    /// A vector of `length` constant bits reading back `value mod 2^length`.
    pub fn from_integer(value: impl Into<BigUint>, length: usize) -> BitVector {
        let value = value.into();
        let bits = (0..length)
            .map(|index| {
                if value.bit((length - 1 - index) as u64) {
                    Bit::one()
                } else {
                    Bit::zero()
                }
            })
            .collect();
        BitVector { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The bit at the given position.
    pub fn bit(&self, index: usize) -> &Bit {
        &self.bits[index]
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), BitError> {
        if range.start > range.end || range.end > self.bits.len() {
            return Err(BitError::BadSlice {
                start: range.start,
                end: range.end,
                len: self.bits.len(),
            });
        }
        Ok(())
    }

    /// An independently assignable view of the given range.
    pub fn slice(&self, range: Range<usize>) -> Result<BitVector, BitError> {
        self.check_range(&range)?;
        Ok(BitVector { bits: self.bits[range].to_vec() })
    }

    /// Copies a source into the given range by reference: after assignment
    /// the range's slots point at the source's bit nodes, so later variable
    /// assignments in the source remain observable here.
    ///
    /// The whole assignment is validated before any slot is written; a
    /// failing assignment leaves the vector untouched.
    pub fn assign(
        &mut self,
        range: Range<usize>,
        source: impl Into<AssignSource>,
    ) -> Result<(), BitError> {
        self.check_range(&range)?;
        let width = range.end - range.start;
        match source.into() {
            AssignSource::Vector(vector) => {
                if vector.bits.len() != width {
                    return Err(BitError::LengthMismatch { lhs: width, rhs: vector.bits.len() });
                }
                self.bits[range].clone_from_slice(&vector.bits);
            }
            AssignSource::Single(bit) => {
                if width != 1 {
                    return Err(BitError::LengthMismatch { lhs: width, rhs: 1 });
                }
                self.bits[range.start] = bit;
            }
            AssignSource::Integer(value) => {
                for (offset, slot) in self.bits[range].iter_mut().enumerate() {
                    *slot = if value.bit((width - 1 - offset) as u64) {
                        Bit::one()
                    } else {
                        Bit::zero()
                    };
                }
            }
        }
        Ok(())
    }

    /// True when every bit of the vector is concrete.
    pub fn is_concrete(&self) -> bool {
        self.bits.iter().all(Bit::is_concrete)
    }

    /// True when every bit in the given range is concrete.
    pub fn is_concrete_range(&self, range: Range<usize>) -> Result<bool, BitError> {
        self.check_range(&range)?;
        Ok(self.bits[range].iter().all(Bit::is_concrete))
    }

    /// Reads the vector as an unsigned integer, most significant bit first.
    pub fn to_integer(&self) -> Result<BigUint, BitError> {
        let mut value = BigUint::zero();
        for bit in &self.bits {
            value <<= 1u8;
            value |= BigUint::from(bit.eval()?);
        }
        Ok(value)
    }

    /// Cyclic right rotation; the amount is reduced modulo the length. The
    /// result references the same bit nodes as the original.
    pub fn rotate_right(&self, amount: usize) -> BitVector {
        if self.bits.is_empty() {
            return self.clone();
        }
        let length = self.bits.len();
        let amount = amount % length;
        let mut bits = Vec::with_capacity(length);
        bits.extend_from_slice(&self.bits[length - amount..]);
        bits.extend_from_slice(&self.bits[..length - amount]);
        BitVector { bits }
    }

    /// Cyclic left rotation; the amount is reduced modulo the length.
    pub fn rotate_left(&self, amount: usize) -> BitVector {
        if self.bits.is_empty() {
            return self.clone();
        }
        self.rotate_right(self.bits.len() - amount % self.bits.len())
    }

    /// Logical right shift: a rotation with the vacated high positions
    /// replaced by constant zero.
    pub fn shift_right(&self, amount: usize) -> Result<BitVector, BitError> {
        if amount > self.bits.len() {
            return Err(BitError::BadShift { amount, len: self.bits.len() });
        }
        let mut shifted = self.rotate_right(amount);
        for slot in &mut shifted.bits[..amount] {
            *slot = Bit::zero();
        }
        Ok(shifted)
    }

    /// Logical left shift: a rotation with the vacated low positions
    /// replaced by constant zero.
    pub fn shift_left(&self, amount: usize) -> Result<BitVector, BitError> {
        let length = self.bits.len();
        if amount > length {
            return Err(BitError::BadShift { amount, len: length });
        }
        let mut shifted = self.rotate_left(amount);
        for slot in &mut shifted.bits[length - amount..] {
            *slot = Bit::zero();
        }
        Ok(shifted)
    }

    fn zip_with(
        &self,
        other: &BitVector,
        build: impl Fn(&Bit, &Bit) -> Bit,
    ) -> Result<BitVector, BitError> {
        if self.bits.len() != other.bits.len() {
            return Err(BitError::LengthMismatch { lhs: self.bits.len(), rhs: other.bits.len() });
        }
        let bits =
            self.bits.iter().zip(&other.bits).map(|(lhs, rhs)| build(lhs, rhs)).collect();
        Ok(BitVector { bits })
    }

    /// Element-wise exclusive or.
    pub fn xor(&self, other: &BitVector) -> Result<BitVector, BitError> {
        self.zip_with(other, |lhs, rhs| Bit::xor(lhs, rhs))
    }

    /// Element-wise conjunction.
    pub fn and(&self, other: &BitVector) -> Result<BitVector, BitError> {
        self.zip_with(other, |lhs, rhs| Bit::and(lhs, rhs))
    }

    /// Element-wise disjunction.
    pub fn or(&self, other: &BitVector) -> Result<BitVector, BitError> {
        self.zip_with(other, |lhs, rhs| Bit::or(lhs, rhs))
    }

    /// Wrap-around addition.
    ///
    /// Fully concrete operands short-circuit to a constant vector;
    /// otherwise a ripple-carry chain is built from the least significant
    /// position upward and the final carry is discarded.
    pub fn add(&self, other: &BitVector) -> Result<BitVector, BitError> {
        if self.bits.len() != other.bits.len() {
            return Err(BitError::LengthMismatch { lhs: self.bits.len(), rhs: other.bits.len() });
        }
        if self.is_concrete() && other.is_concrete() {
            let sum = self.to_integer()? + other.to_integer()?;
            return Ok(BitVector::from_integer(sum, self.bits.len()));
        }
        let mut bits = self.bits.clone();
        let mut carry = Bit::zero();
        for index in (0..bits.len()).rev() {
            let (sum, carry_out) = Bit::add3(&bits[index], &other.bits[index], &carry);
            bits[index] = sum;
            carry = carry_out;
        }
        Ok(BitVector { bits })
    }

    /// Wrap-around subtraction; both operands must be concrete.
    pub fn sub(&self, other: &BitVector) -> Result<BitVector, BitError> {
        if self.bits.len() != other.bits.len() {
            return Err(BitError::LengthMismatch { lhs: self.bits.len(), rhs: other.bits.len() });
        }
        if !self.is_concrete() || !other.is_concrete() {
            return Err(BitError::NotConcrete);
        }
        let modulus = BigUint::one() << self.bits.len();
        let difference = (self.to_integer()? + modulus) - other.to_integer()?;
        Ok(BitVector::from_integer(difference, self.bits.len()))
    }
}

impl Not for &BitVector {
    type Output = BitVector;

    fn not(self) -> BitVector {
        BitVector { bits: self.bits.iter().map(|bit| Bit::not(bit)).collect() }
    }
}

impl fmt::Display for BitVector {
    /// The hexadecimal integer reading when concrete, the per-bit list
    /// otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_integer() {
            Ok(value) => write!(f, "{value:#x}"),
            Err(_) => fmt::Debug::fmt(self, f),
        }
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Per-element iterative rendering; symbolic digest words nest too
        // deep for the recursive formatter machinery.
        f.write_str("[")?;
        for (index, bit) in self.bits.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&bit.render())?;
        }
        f.write_str("]")
    }
}
