//! Command/Acknowledge Transaction Engine
//!
//! Every transaction follows the same sequence over a blocking byte stream:
//!
//! 1. write the whole command frame
//! 2. read one reply byte: ACK, NAK, or anything else
//! 3. optionally read a fixed-size response payload
//!
//! The first failing step aborts the transaction. Writes and reads loop until
//! the exact byte count has moved, since the transport may accept or deliver
//! fewer bytes per call. The engine keeps no state between calls.

use crate::codec::{self, WORD_SIZE};
use crate::error::UlcdError;
use crate::frame::{ACK, NAK};
use std::fmt::Write as _;
use std::io::{Read, Write};
use tracing::{debug, trace, warn};

/// Blocking byte stream a display is attached through
pub trait Transport: Read + Write {}

impl<T: Read + Write + ?Sized> Transport for T {}

/// Write all of `data`, returning the number of bytes sent
pub fn send<T: Transport + ?Sized>(transport: &mut T, data: &[u8]) -> Result<usize, UlcdError> {
    let mut total = 0;
    while total < data.len() {
        match transport.write(&data[total..]) {
            Ok(0) => {
                warn!(
                    "Transport accepted no bytes after {} of {}",
                    total,
                    data.len()
                );
                return Err(UlcdError::transport(
                    None,
                    "Unable to send data to device: transport accepted no bytes",
                ));
            }
            Ok(sent) => total += sent,
            Err(e) => {
                warn!("Unable to send data to device: {}", e);
                return Err(UlcdError::transport(
                    e.raw_os_error(),
                    format!("Unable to send data to device: {}", e),
                ));
            }
        }
    }

    trace!("send: {}", hex_dump(data));
    Ok(total)
}

/// Read one reply byte and interpret it
pub fn recv_ack<T: Transport + ?Sized>(transport: &mut T) -> Result<(), UlcdError> {
    let mut reply = [0u8; 1];
    recv_exact(transport, &mut reply)?;
    trace!("read ack: {:#04x}", reply[0]);

    match reply[0] {
        ACK => Ok(()),
        NAK => {
            warn!("Device sent NAK instead of ACK");
            Err(UlcdError::Nak)
        }
        other => {
            warn!("Device sent unknown reply {:#04x} instead of ACK", other);
            Err(UlcdError::UnknownReply(other))
        }
    }
}

/// Send a command and wait for its acknowledgement
pub fn send_recv_ack<T: Transport + ?Sized>(
    transport: &mut T,
    data: &[u8],
) -> Result<(), UlcdError> {
    send(transport, data)?;
    recv_ack(transport)
}

/// Send a command, wait for ACK, then fill `buffer` with the response payload
pub fn send_recv_ack_into<T: Transport + ?Sized>(
    transport: &mut T,
    data: &[u8],
    buffer: &mut [u8],
) -> Result<(), UlcdError> {
    send_recv_ack(transport, data)?;
    recv_exact(transport, buffer)?;
    trace!("read: {}", hex_dump(buffer));
    Ok(())
}

/// Send a command, wait for ACK, then read `out_size` payload bytes
pub fn send_recv_ack_data<T: Transport + ?Sized>(
    transport: &mut T,
    data: &[u8],
    out_size: usize,
) -> Result<Vec<u8>, UlcdError> {
    let mut payload = vec![0u8; out_size];
    send_recv_ack_into(transport, data, &mut payload)?;
    Ok(payload)
}

/// Send a command, wait for ACK, then read a single 16-bit word
pub fn send_recv_ack_word<T: Transport + ?Sized>(
    transport: &mut T,
    data: &[u8],
) -> Result<u16, UlcdError> {
    let mut word = [0u8; WORD_SIZE];
    send_recv_ack_into(transport, data, &mut word)?;
    let value = codec::unpack(word);
    debug!("Received word {:#06x}", value);
    Ok(value)
}

/// Fill `buffer` completely from the transport
fn recv_exact<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut [u8],
) -> Result<(), UlcdError> {
    let mut total = 0;
    while total < buffer.len() {
        match transport.read(&mut buffer[total..]) {
            Ok(0) => {
                warn!("Transport closed after {} of {} bytes", total, buffer.len());
                return Err(UlcdError::transport(
                    None,
                    "Unable to read data from device: end of stream",
                ));
            }
            Ok(read) => total += read,
            Err(e) => {
                warn!("Unable to read data from device: {}", e);
                return Err(UlcdError::transport(
                    e.raw_os_error(),
                    format!("Unable to read data from device: {}", e),
                ));
            }
        }
    }
    Ok(())
}

/// Render bytes as `N bytes: 0x.. 0x..` for trace output
fn hex_dump(bytes: &[u8]) -> String {
    let mut out = format!("{} bytes:", bytes.len());
    for byte in bytes {
        let _ = write!(out, " {:#04x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mock::MockTransport;

    #[test]
    fn test_send_single_byte_writes() {
        let mut mock = MockTransport::new().with_write_chunk(1);
        let sent = send(&mut mock, &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(sent, 5);
        assert_eq!(mock.write_calls(), 5);
        assert_eq!(mock.written(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_send_empty_frame() {
        let mut mock = MockTransport::new();
        assert_eq!(send(&mut mock, &[]).unwrap(), 0);
        assert_eq!(mock.write_calls(), 0);
    }

    #[test]
    fn test_send_failure_mid_transfer() {
        let mut mock = MockTransport::new()
            .with_write_chunk(2)
            .fail_write_after(1, libc::EIO);
        let err = send(&mut mock, &[1, 2, 3, 4, 5]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
        assert_eq!(err.native_code(), Some(libc::EIO));
        // One successful chunk, then the failing call, then nothing
        assert_eq!(mock.write_calls(), 2);
        assert_eq!(mock.written(), &[1, 2]);
    }

    #[test]
    fn test_send_zero_progress_is_error() {
        let mut mock = MockTransport::new().with_write_chunk(0);
        let err = send(&mut mock, &[1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
        assert_eq!(mock.write_calls(), 1);
    }

    #[test]
    fn test_recv_ack_replies() {
        let mut mock = MockTransport::new().with_incoming(&[ACK]);
        assert!(recv_ack(&mut mock).is_ok());

        let mut mock = MockTransport::new().with_incoming(&[NAK]);
        assert_eq!(recv_ack(&mut mock), Err(UlcdError::Nak));

        let mut mock = MockTransport::new().with_incoming(&[0x00]);
        assert_eq!(recv_ack(&mut mock), Err(UlcdError::UnknownReply(0x00)));
    }

    #[test]
    fn test_recv_ack_reads_one_byte() {
        let mut mock = MockTransport::new().with_incoming(&[ACK, 0xAB, 0xCD]);
        recv_ack(&mut mock).unwrap();
        assert_eq!(mock.remaining_incoming(), 2);
    }

    #[test]
    fn test_recv_ack_end_of_stream() {
        let mut mock = MockTransport::new();
        let err = recv_ack(&mut mock).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[test]
    fn test_send_recv_ack_stops_after_send_failure() {
        let mut mock = MockTransport::new()
            .with_incoming(&[ACK])
            .fail_write_after(0, libc::EPIPE);
        let err = send_recv_ack(&mut mock, &[0xFF, 0xD7]).unwrap_err();
        assert_eq!(err.native_code(), Some(libc::EPIPE));
        // ACK never consumed
        assert_eq!(mock.remaining_incoming(), 1);
    }

    #[test]
    fn test_send_recv_ack_data_short_reads() {
        let mut mock = MockTransport::new()
            .with_read_chunk(1)
            .with_incoming(&[ACK, 1, 2, 3, 4]);
        let data = send_recv_ack_data(&mut mock, &[0x00, 0x10], 4).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4]);
        assert_eq!(mock.read_calls(), 5);
    }

    #[test]
    fn test_send_recv_ack_data_nak_skips_payload() {
        let mut mock = MockTransport::new().with_incoming(&[NAK, 1, 2]);
        let err = send_recv_ack_data(&mut mock, &[0x00, 0x10], 2).unwrap_err();
        assert_eq!(err, UlcdError::Nak);
        assert_eq!(mock.remaining_incoming(), 2);
    }

    #[test]
    fn test_send_recv_ack_data_read_failure() {
        let mut mock = MockTransport::new()
            .with_read_chunk(1)
            .with_incoming(&[ACK, 1, 2, 3])
            .fail_read_after(2, libc::EIO);
        let err = send_recv_ack_data(&mut mock, &[0x00, 0x10], 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
        assert_eq!(err.native_code(), Some(libc::EIO));
    }

    #[test]
    fn test_send_recv_ack_word() {
        let mut mock = MockTransport::new().with_incoming(&[ACK, 0xAB, 0xCD]);
        let value = send_recv_ack_word(&mut mock, &[0xFF, 0x00]).unwrap();
        assert_eq!(value, 0xABCD);
        assert_eq!(mock.written(), &[0xFF, 0x00]);
    }

    #[test]
    fn test_send_recv_ack_word_keeps_specific_error() {
        let mut mock = MockTransport::new().with_incoming(&[0x42]);
        assert_eq!(
            send_recv_ack_word(&mut mock, &[0xFF, 0x00]),
            Err(UlcdError::UnknownReply(0x42))
        );

        let mut mock = MockTransport::new().with_incoming(&[ACK, 0xAB]);
        let err = send_recv_ack_word(&mut mock, &[0xFF, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(hex_dump(&[0x06, 0xAB]), "2 bytes: 0x06 0xab");
        assert_eq!(hex_dump(&[]), "0 bytes:");
    }
}
