//! Display Connection
//!
//! A [`Connection`] owns at most one transport and runs transactions against
//! it one at a time. Every public operation returns its outcome and also
//! records it as the connection's [`ErrorState`].

use crate::baud::BaudRate;
use crate::engine::{self, Transport};
use crate::error::{ErrorKind, ErrorState, UlcdError};
use crate::serial::SerialPort;
use crate::settings::DisplayConfig;
use tracing::{debug, info};

/// Connection to a display module
pub struct Connection<T: Transport = SerialPort> {
    config: DisplayConfig,
    transport: Option<T>,
    state: ErrorState,
}

impl<T: Transport> Connection<T> {
    /// Create a connection with no transport
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            transport: None,
            state: ErrorState::default(),
        }
    }

    /// Create a connection around an already-open transport
    pub fn from_transport(config: DisplayConfig, transport: T) -> Self {
        Self {
            config,
            transport: Some(transport),
            state: ErrorState::default(),
        }
    }

    /// Release the transport, if owned
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            info!("Closed display connection on {}", self.config.device);
        }
        self.state.set(ErrorKind::Success, None);
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Line speed selected by the configured baud code
    pub fn baud_rate(&self) -> Result<BaudRate, UlcdError> {
        self.config.baud_rate()
    }

    /// Outcome of the most recent operation
    pub fn last_error(&self) -> &ErrorState {
        &self.state
    }

    pub fn error_kind(&self) -> ErrorKind {
        self.state.kind()
    }

    pub fn error_message(&self) -> &str {
        self.state.message()
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    /// Write a whole command frame, returning the number of bytes sent
    pub fn send(&mut self, data: &[u8]) -> Result<usize, UlcdError> {
        let result = self.with_transport(|t| engine::send(t, data));
        self.finish(result)
    }

    /// Read and interpret one reply byte
    pub fn recv_ack(&mut self) -> Result<(), UlcdError> {
        let result = self.with_transport(|t| engine::recv_ack(t));
        self.finish(result)
    }

    /// Send a command and wait for ACK
    pub fn send_recv_ack(&mut self, data: &[u8]) -> Result<(), UlcdError> {
        debug!("Transaction: {} byte command, no payload", data.len());
        let result = self.with_transport(|t| engine::send_recv_ack(t, data));
        self.finish(result)
    }

    /// Send a command, wait for ACK, and read `out_size` payload bytes
    pub fn send_recv_ack_data(
        &mut self,
        data: &[u8],
        out_size: usize,
    ) -> Result<Vec<u8>, UlcdError> {
        debug!(
            "Transaction: {} byte command, {} byte payload",
            data.len(),
            out_size
        );
        let result = self.with_transport(|t| engine::send_recv_ack_data(t, data, out_size));
        self.finish(result)
    }

    /// Send a command, wait for ACK, and fill `buffer` with the payload
    pub fn send_recv_ack_into(&mut self, data: &[u8], buffer: &mut [u8]) -> Result<(), UlcdError> {
        debug!(
            "Transaction: {} byte command, {} byte payload",
            data.len(),
            buffer.len()
        );
        let result = self.with_transport(|t| engine::send_recv_ack_into(t, data, buffer));
        self.finish(result)
    }

    /// Send a command, wait for ACK, and read a 16-bit reply word
    pub fn send_recv_ack_word(&mut self, data: &[u8]) -> Result<u16, UlcdError> {
        debug!("Transaction: {} byte command, word reply", data.len());
        let result = self.with_transport(|t| engine::send_recv_ack_word(t, data));
        self.finish(result)
    }

    fn with_transport<R>(
        &mut self,
        op: impl FnOnce(&mut T) -> Result<R, UlcdError>,
    ) -> Result<R, UlcdError> {
        match self.transport.as_mut() {
            Some(transport) => op(transport),
            None => Err(UlcdError::NotOpen),
        }
    }

    /// Record the outcome on the connection and hand it back
    fn finish<R>(&mut self, result: Result<R, UlcdError>) -> Result<R, UlcdError> {
        self.state.record(&result);
        result
    }
}

impl Connection<SerialPort> {
    /// Open and configure the serial device named in the configuration
    ///
    /// The baud code is resolved before the device is touched, so an unknown
    /// code leaves the connection without a transport. Opening an already
    /// open connection replaces (and releases) the previous transport only
    /// once the new one is ready.
    pub fn open(&mut self) -> Result<(), UlcdError> {
        let result = self.open_serial();
        self.finish(result)
    }

    /// Create a connection and open it in one step
    pub fn connect(config: DisplayConfig) -> Result<Self, UlcdError> {
        let mut connection = Self::new(config);
        connection.open()?;
        Ok(connection)
    }

    fn open_serial(&mut self) -> Result<(), UlcdError> {
        let baud_rate = self.config.baud_rate()?;
        let port = SerialPort::open(&self.config.device, baud_rate)?;
        self.transport = Some(port);
        Ok(())
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.close();
    }
}
