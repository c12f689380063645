use std::ops::Range;

use bitblast::{BitError, BitVector};

use crate::constants::SIZE_WORD;

/// Lowercase gamma 0, the first message-schedule mixing function.
pub fn gamma0(x: &BitVector) -> Result<BitVector, BitError> {
    x.rotate_right(7).xor(&x.rotate_right(18))?.xor(&x.shift_right(3)?)
}

/// Lowercase gamma 1, the second message-schedule mixing function.
pub fn gamma1(x: &BitVector) -> Result<BitVector, BitError> {
    x.rotate_right(17).xor(&x.rotate_right(19))?.xor(&x.shift_right(10)?)
}

/// Uppercase sigma 0, mixed into the `a` register each round.
pub fn sigma0(x: &BitVector) -> Result<BitVector, BitError> {
    x.rotate_right(2).xor(&x.rotate_right(13))?.xor(&x.rotate_right(22))
}

/// Uppercase sigma 1, mixed into the `e` register each round.
pub fn sigma1(x: &BitVector) -> Result<BitVector, BitError> {
    x.rotate_right(6).xor(&x.rotate_right(11))?.xor(&x.rotate_right(25))
}

/// The bit range of the 32-bit word at the given position of a word array.
pub fn word(position: usize) -> Range<usize> {
    position * SIZE_WORD..position * SIZE_WORD + SIZE_WORD
}

/// Expands 16 words of message data into the 64-word schedule.
pub fn init_words(data: &BitVector) -> Result<BitVector, BitError> {
    let mut w = BitVector::variables(SIZE_WORD * 64);
    w.assign(0..SIZE_WORD * 16, data.slice(0..SIZE_WORD * 16)?)?;
    for index in 16..64 {
        let expanded = gamma1(&w.slice(word(index - 2))?)?
            .add(&w.slice(word(index - 7))?)?
            .add(&gamma0(&w.slice(word(index - 15))?)?)?
            .add(&w.slice(word(index - 16))?)?;
        w.assign(word(index), expanded)?;
    }
    Ok(w)
}

/// `ch(x, y, z)`: picks y or z depending on x.
pub fn choose(x: &BitVector, y: &BitVector, z: &BitVector) -> Result<BitVector, BitError> {
    z.xor(&x.and(&y.xor(z)?)?)
}

/// `maj(x, y, z)`: the bitwise majority vote.
pub fn majority(x: &BitVector, y: &BitVector, z: &BitVector) -> Result<BitVector, BitError> {
    x.or(y)?.and(z)?.or(&x.and(y)?)
}

/// One compression round over the eight working registers; returns the new
/// values destined for the `e` and `a` positions.
#[allow(clippy::too_many_arguments)]
pub fn round_small(
    a: &BitVector,
    b: &BitVector,
    c: &BitVector,
    d: &BitVector,
    e: &BitVector,
    f: &BitVector,
    g: &BitVector,
    h: &BitVector,
    constant: &BitVector,
    message: &BitVector,
) -> Result<(BitVector, BitVector), BitError> {
    let t1 = sigma1(e)?.add(&choose(e, f, g)?)?.add(h)?.add(constant)?.add(message)?;
    let t2 = sigma0(a)?.add(&majority(a, b, c)?)?;
    Ok((d.add(&t1)?, t2.add(&t1)?))
}

/// Four compression rounds with the register rotation unrolled in place,
/// followed by the swap that realigns the register file.
pub fn round_big(
    registers: &mut [BitVector],
    w: &BitVector,
    offset: usize,
    constants: &[BitVector],
) -> Result<(), BitError> {
    let (e, a) = round_small(
        &registers[0],
        &registers[1],
        &registers[2],
        &registers[3],
        &registers[4],
        &registers[5],
        &registers[6],
        &registers[7],
        &constants[offset],
        &w.slice(word(offset))?,
    )?;
    registers[3] = e;
    registers[7] = a;
    let (e, a) = round_small(
        &registers[7],
        &registers[0],
        &registers[1],
        &registers[2],
        &registers[3],
        &registers[4],
        &registers[5],
        &registers[6],
        &constants[offset + 1],
        &w.slice(word(offset + 1))?,
    )?;
    registers[2] = e;
    registers[6] = a;
    let (e, a) = round_small(
        &registers[6],
        &registers[7],
        &registers[0],
        &registers[1],
        &registers[2],
        &registers[3],
        &registers[4],
        &registers[5],
        &constants[offset + 2],
        &w.slice(word(offset + 2))?,
    )?;
    registers[1] = e;
    registers[5] = a;
    let (e, a) = round_small(
        &registers[5],
        &registers[6],
        &registers[7],
        &registers[0],
        &registers[1],
        &registers[2],
        &registers[3],
        &registers[4],
        &constants[offset + 3],
        &w.slice(word(offset + 3))?,
    )?;
    registers[0] = e;
    registers[4] = a;

    registers.swap(3, 7);
    registers.swap(2, 6);
    registers.swap(1, 5);
    registers.swap(0, 4);
    Ok(())
}
