//! Command Frame Construction
//!
//! A command frame is a 16-bit opcode followed by zero or more 16-bit
//! parameters, all packed MSB first:
//!
//! ```text
//! ┌──────────┬──────────┬─────┬──────────┐
//! │ OPCODE   │ PARAM 0  │ ... │ PARAM N  │
//! │ 2B       │ 2B       │     │ 2B       │
//! └──────────┴──────────┴─────┴──────────┘
//! ```

use crate::codec::{self, WORD_SIZE};
use crate::error::UlcdError;

/// Positive acknowledgement reply byte
pub const ACK: u8 = 0x06;

/// Negative acknowledgement reply byte
pub const NAK: u8 = 0x15;

/// Maximum size of a single command frame in bytes
pub const MAX_FRAME_SIZE: usize = 4096;

/// An outgoing command, ready to hand to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Vec<u8>,
}

impl CommandFrame {
    /// Start a frame with the given opcode and no parameters
    pub fn new(opcode: u16) -> Self {
        let mut bytes = Vec::with_capacity(WORD_SIZE * 4);
        bytes.extend_from_slice(&codec::encode(u32::from(opcode)));
        Self { bytes }
    }

    /// Build a frame from an opcode and a full parameter list
    pub fn with_params(opcode: u16, params: &[u32]) -> Result<Self, UlcdError> {
        let size = WORD_SIZE * (params.len() + 1);
        if size > MAX_FRAME_SIZE {
            return Err(UlcdError::FrameTooLarge {
                size,
                max: MAX_FRAME_SIZE,
            });
        }

        let mut frame = Self::new(opcode);
        frame.bytes.resize(size, 0);
        codec::pack_many(&mut frame.bytes[WORD_SIZE..], params)?;
        Ok(frame)
    }

    /// Append one parameter (low 16 bits)
    pub fn push(&mut self, value: u32) -> Result<&mut Self, UlcdError> {
        let size = self.bytes.len() + WORD_SIZE;
        if size > MAX_FRAME_SIZE {
            return Err(UlcdError::FrameTooLarge {
                size,
                max: MAX_FRAME_SIZE,
            });
        }
        self.bytes.extend_from_slice(&codec::encode(value));
        Ok(self)
    }

    /// Opcode this frame starts with
    pub fn opcode(&self) -> u16 {
        codec::unpack([self.bytes[0], self.bytes[1]])
    }

    /// Number of parameters after the opcode
    pub fn param_count(&self) -> usize {
        self.bytes.len() / WORD_SIZE - 1
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a frame carries at least its opcode
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_only() {
        let frame = CommandFrame::new(0xFFD7);
        assert_eq!(frame.as_bytes(), &[0xFF, 0xD7]);
        assert_eq!(frame.opcode(), 0xFFD7);
        assert_eq!(frame.param_count(), 0);
    }

    #[test]
    fn test_with_params() {
        let frame = CommandFrame::with_params(0xFFCF, &[10, 20, 0xF800]).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[0xFF, 0xCF, 0x00, 0x0A, 0x00, 0x14, 0xF8, 0x00]
        );
        assert_eq!(frame.param_count(), 3);
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn test_push_chains() {
        let mut frame = CommandFrame::new(0x0001);
        frame.push(0x1234).unwrap().push(0x5678).unwrap();
        assert_eq!(frame.as_bytes(), &[0x00, 0x01, 0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_frame_size_limit() {
        let max_params = MAX_FRAME_SIZE / WORD_SIZE - 1;
        let params = vec![0u32; max_params];
        let mut frame = CommandFrame::with_params(0x0001, &params).unwrap();
        assert_eq!(frame.len(), MAX_FRAME_SIZE);

        assert_eq!(
            frame.push(1).unwrap_err(),
            UlcdError::FrameTooLarge {
                size: MAX_FRAME_SIZE + 2,
                max: MAX_FRAME_SIZE
            }
        );

        let too_many = vec![0u32; max_params + 1];
        assert!(matches!(
            CommandFrame::with_params(0x0001, &too_many),
            Err(UlcdError::FrameTooLarge { .. })
        ));
    }
}
