//! uLCD Serial Protocol Driver
//!
//! This crate drives 4D Systems uLCD graphical display modules over a serial
//! line. Commands are a 16-bit opcode plus 16-bit parameters, packed MSB
//! first; the module answers each one with a single ACK/NAK byte, optionally
//! followed by a fixed-size payload:
//!
//! ```text
//! host → device: OPCODE [PARAM ...]         (2 bytes each)
//! device → host: 0x06 ACK | 0x15 NAK | other
//! device → host: payload                    (only for commands with a reply)
//! ```
//!
//! All I/O is blocking and one transaction runs at a time per [`Connection`].

mod baud;
mod connection;
mod error;
mod frame;
mod serial;
mod settings;

pub mod codec;
pub mod engine;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use baud::{BaudRate, BAUD_TABLE};
pub use connection::Connection;
pub use engine::Transport;
pub use error::{ErrorKind, ErrorState, UlcdError, MAX_ERROR_MESSAGE};
pub use frame::{CommandFrame, ACK, MAX_FRAME_SIZE, NAK};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use serial::SerialPort;
pub use settings::{DisplayConfig, ENV_PREFIX};
