//! Read-side buffering.
//!
//! A [`ReadBuffer`] sits between the transport and the receiver. With a
//! real capacity it amortizes small reads (frame heads, control frames);
//! with capacity zero every read larger than one byte goes straight to
//! the transport and the buffer only serves as the one-byte stash the
//! per-call deadline needs.

use std::cmp;
use std::io::{Read, Result};

/// Default capacity used by a buffered connection.
pub const DEFAULT_READ_BUFFER: usize = 4096;

/// A draining read buffer over some transport.
#[derive(Debug)]
pub struct ReadBuffer {
    buf: Vec<u8>,
    pos: usize,
    end: usize,
}

impl ReadBuffer {
    /// `capacity == 0` keeps direct reads, with a single stash byte.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; cmp::max(capacity, 1)],
            pos: 0,
            end: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool { self.pos == self.end }

    /// Blocking-read at least one byte from `io` into the buffer, unless
    /// some are already stashed. `Ok(0)` means EOF.
    ///
    /// On error nothing is consumed, so an armed read timeout surfaces as
    /// a clean `WouldBlock` and the stream can be retried.
    pub fn prefetch<R: Read>(&mut self, io: &mut R) -> Result<usize> {
        if !self.is_empty() {
            return Ok(self.end - self.pos);
        }
        self.pos = 0;
        self.end = 0;
        let n = io.read(&mut self.buf)?;
        self.end = n;
        Ok(n)
    }

    fn take(&mut self, dst: &mut [u8]) -> usize {
        let n = cmp::min(dst.len(), self.end - self.pos);
        dst[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        n
    }
}

/// [`Read`] view over a buffer and its transport.
#[derive(Debug)]
pub struct BufStream<'a, IO> {
    buffer: &'a mut ReadBuffer,
    io: &'a mut IO,
}

impl<'a, IO> BufStream<'a, IO> {
    #[inline]
    pub(crate) fn new(buffer: &'a mut ReadBuffer, io: &'a mut IO) -> Self {
        Self { buffer, io }
    }
}

impl<IO: Read> Read for BufStream<'_, IO> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        if self.buffer.is_empty() {
            // large reads skip the copy
            if dst.len() >= self.buffer.buf.len() {
                return self.io.read(dst);
            }
            if self.buffer.prefetch(self.io)? == 0 {
                return Ok(0);
            }
        }
        Ok(self.buffer.take(dst))
    }
}
