//! Parameter Value Codec
//!
//! Command parameters travel as 16-bit words, most-significant byte first.

use crate::error::UlcdError;

/// Size in bytes of one packed word
pub const WORD_SIZE: usize = 2;

/// Pack the low 16 bits of `value` into `dest[0..2]`, MSB first
///
/// Bits above the low 16 are discarded. Returns the number of bytes written.
pub fn pack(dest: &mut [u8], value: u32) -> Result<usize, UlcdError> {
    if dest.len() < WORD_SIZE {
        return Err(UlcdError::BufferTooSmall {
            needed: WORD_SIZE,
            available: dest.len(),
        });
    }
    dest[..WORD_SIZE].copy_from_slice(&encode(value));
    Ok(WORD_SIZE)
}

/// Encode the low 16 bits of `value`, MSB first
pub fn encode(value: u32) -> [u8; WORD_SIZE] {
    ((value & 0xFFFF) as u16).to_be_bytes()
}

/// Reconstruct a word from two bytes, MSB first
pub fn unpack(src: [u8; WORD_SIZE]) -> u16 {
    u16::from_be_bytes(src)
}

/// Pack a sequence of values back to back into `buffer`
///
/// Returns `2 * values.len()`. Fails without writing anything if the buffer
/// cannot hold every value.
pub fn pack_many(buffer: &mut [u8], values: &[u32]) -> Result<usize, UlcdError> {
    let needed = values.len() * WORD_SIZE;
    if buffer.len() < needed {
        return Err(UlcdError::BufferTooSmall {
            needed,
            available: buffer.len(),
        });
    }

    for (chunk, &value) in buffer.chunks_exact_mut(WORD_SIZE).zip(values) {
        chunk.copy_from_slice(&encode(value));
    }
    Ok(needed)
}
