//! Serial device transport
//!
//! Opens the display's serial line through `serialport` and configures it
//! for 8N1, raw input and output, no flow control, and reads that wait for
//! at least one byte. There is no overall read or write deadline.

use crate::baud::BaudRate;
use crate::error::UlcdError;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort as _, StopBits, TTYPort};
use std::fmt;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Length of one wait for line activity; an expired wait is simply re-armed
const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// An open, configured serial device
pub struct SerialPort {
    port: TTYPort,
    path: String,
    baud_rate: BaudRate,
}

impl SerialPort {
    /// Open `path` and configure it for the display link at `baud_rate`
    ///
    /// The device is opened for exclusive use. Input that arrived before the
    /// line was configured is discarded.
    pub fn open(path: &str, baud_rate: BaudRate) -> Result<Self, UlcdError> {
        let mut port = serialport::new(path, baud_rate.bits_per_second())
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(POLL_INTERVAL)
            .open_native()
            .map_err(|e| open_error(path, e))?;

        port.clear(ClearBuffer::Input)
            .map_err(|e| open_error(path, e))?;
        debug!("Configured {} for 8N1 raw mode", path);

        info!(
            "Opened serial device {} at {} baud",
            path,
            baud_rate.bits_per_second()
        );
        Ok(Self {
            port,
            path: path.to_string(),
            baud_rate,
        })
    }

    /// Allow or refuse further opens of the device while this port is open
    pub fn set_exclusive(&mut self, exclusive: bool) -> Result<(), UlcdError> {
        self.port.set_exclusive(exclusive).map_err(|e| {
            UlcdError::transport(
                None,
                format!("Unable to change exclusive access to {}: {}", self.path, e),
            )
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn baud_rate(&self) -> BaudRate {
        self.baud_rate
    }
}

fn open_error(path: &str, err: serialport::Error) -> UlcdError {
    UlcdError::transport(
        None,
        format!("Unable to open serial device {}: {}", path, err),
    )
}

/// Expired waits and interrupted calls are retried; the link has no deadline
fn is_retryable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

impl fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .finish_non_exhaustive()
    }
}

impl AsRawFd for SerialPort {
    fn as_raw_fd(&self) -> RawFd {
        self.port.as_raw_fd()
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.port.read(buf) {
                Err(e) if is_retryable(&e) => trace!("Still waiting for {}", self.path),
                result => return result,
            }
        }
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match self.port.write(buf) {
                Err(e) if is_retryable(&e) => trace!("{} not ready for writing", self.path),
                result => return result,
            }
        }
    }

    /// Wait until all queued output has been transmitted
    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_open_missing_device() {
        let err = SerialPort::open("/dev/nonexistent-ulcd", BaudRate::B9600).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
        assert!(err.to_string().contains("/dev/nonexistent-ulcd"));
    }

    #[test]
    fn test_open_rejects_nul_in_path() {
        let err = SerialPort::open("/dev/tty\0USB0", BaudRate::B9600).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[test]
    fn test_open_non_terminal_fails_configuration() {
        // /dev/null opens fine but is not a tty
        let err = SerialPort::open("/dev/null", BaudRate::B9600).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_open_configures_raw_8n1() {
        let pty = pty::Pty::open();
        let port = SerialPort::open(&pty.path, BaudRate::B115200).unwrap();
        assert_eq!(port.path(), pty.path);
        assert_eq!(port.baud_rate(), BaudRate::B115200);

        let mut options: libc::termios = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { libc::tcgetattr(port.as_raw_fd(), &mut options) }, 0);

        assert_eq!(options.c_cflag & libc::CSIZE, libc::CS8);
        assert_eq!(options.c_cflag & (libc::PARENB | libc::CSTOPB), 0);
        assert_eq!(options.c_lflag & (libc::ICANON | libc::ECHO), 0);
        assert_eq!(options.c_iflag & (libc::IXON | libc::IXOFF), 0);
        assert_eq!(options.c_oflag & libc::OPOST, 0);
        assert_eq!(options.c_cc[libc::VMIN], 1);
        assert_eq!(options.c_cc[libc::VTIME], 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_bytes_pass_through_unchanged() {
        let mut pty = pty::Pty::open();
        let mut port = SerialPort::open(&pty.path, BaudRate::B9600).unwrap();

        // CR and LF would be translated by a cooked line
        port.write_all(&[0xFF, 0x0D, 0x0A, 0x00]).unwrap();
        let mut sent = [0u8; 4];
        pty.device.read_exact(&mut sent).unwrap();
        assert_eq!(sent, [0xFF, 0x0D, 0x0A, 0x00]);

        pty.device.write_all(&[0x06, 0x0D]).unwrap();
        let mut reply = [0u8; 2];
        port.read_exact(&mut reply).unwrap();
        assert_eq!(reply, [0x06, 0x0D]);
    }
}
