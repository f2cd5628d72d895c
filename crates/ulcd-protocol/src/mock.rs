//! Scripted in-memory transport for testing without hardware.
//!
//! [`MockTransport`] plays back pre-loaded incoming bytes and records
//! everything written to it. Per-call chunk limits emulate a serial line that
//! accepts or delivers fewer bytes than requested, and failures can be
//! injected after a given number of calls.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// A [`Transport`](crate::Transport) backed by in-memory buffers.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Bytes the "device" will send, in order
    incoming: VecDeque<u8>,
    /// Every byte accepted by `write`, concatenated
    written: Vec<u8>,
    /// Maximum bytes accepted per `write` call
    write_chunk: Option<usize>,
    /// Maximum bytes delivered per `read` call
    read_chunk: Option<usize>,
    /// Fail the write call after this many successful ones
    write_failure: Option<(usize, i32)>,
    /// Fail the read call after this many successful ones
    read_failure: Option<(usize, i32)>,
    write_calls: usize,
    read_calls: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for subsequent reads
    pub fn with_incoming(mut self, bytes: &[u8]) -> Self {
        self.push_incoming(bytes);
        self
    }

    /// Accept at most `chunk` bytes per write call
    pub fn with_write_chunk(mut self, chunk: usize) -> Self {
        self.write_chunk = Some(chunk);
        self
    }

    /// Deliver at most `chunk` bytes per read call
    pub fn with_read_chunk(mut self, chunk: usize) -> Self {
        self.read_chunk = Some(chunk);
        self
    }

    /// Let `calls` writes succeed, then fail with OS error `errno`
    pub fn fail_write_after(mut self, calls: usize, errno: i32) -> Self {
        self.write_failure = Some((calls, errno));
        self
    }

    /// Let `calls` reads succeed, then fail with OS error `errno`
    pub fn fail_read_after(mut self, calls: usize, errno: i32) -> Self {
        self.read_failure = Some((calls, errno));
        self
    }

    /// Queue more bytes for subsequent reads
    pub fn push_incoming(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes);
    }

    /// All bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Forget recorded writes
    pub fn clear_written(&mut self) {
        self.written.clear();
    }

    /// Number of write calls made, failed ones included
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Number of read calls made, failed ones included
    pub fn read_calls(&self) -> usize {
        self.read_calls
    }

    /// Queued bytes not yet read
    pub fn remaining_incoming(&self) -> usize {
        self.incoming.len()
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_calls += 1;
        if let Some((calls, errno)) = self.read_failure {
            if self.read_calls > calls {
                return Err(io::Error::from_raw_os_error(errno));
            }
        }

        let limit = self.read_chunk.unwrap_or(usize::MAX);
        let count = buf.len().min(limit).min(self.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_calls += 1;
        if let Some((calls, errno)) = self.write_failure {
            if self.write_calls > calls {
                return Err(io::Error::from_raw_os_error(errno));
            }
        }

        let count = buf.len().min(self.write_chunk.unwrap_or(usize::MAX));
        self.written.extend_from_slice(&buf[..count]);
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
