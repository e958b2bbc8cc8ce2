//! Frame and request emission.

use std::io::Write;

use log::debug;

use crate::error::{Error, UsageError};
use crate::frame::{mask, FrameHead, OpCode, MAX_CONTROL_FRAME_LENGTH, MAX_HEAD_LENGTH};
use crate::handshake::{request, Header};

/// Payloads are masked through a scratch buffer of this many bytes.
pub(crate) const MASK_BUFFER_SIZE: usize = 1024;

/// The emitting half of a client.
///
/// Owns the masking key, drawn once at construction and reused for every
/// outbound frame (the key travels in each frame head, so reuse is
/// protocol-legal). The sender keeps no other state; in particular it
/// does not order [`stream`](Sender::stream) calls - the caller does.
#[derive(Debug)]
pub struct Sender {
    mask: [u8; 4],
}

impl Sender {
    /// Constructor, draws a random masking key.
    pub fn new() -> Self {
        Self {
            mask: mask::new_key(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_mask(mask: [u8; 4]) -> Self { Self { mask } }

    /// Emit the opening http request in a single write.
    pub fn send_request<W: Write>(
        &self,
        io: &mut W,
        resource: &str,
        sec_key: &[u8; 24],
        headers: &[Header<'_>],
    ) -> Result<(), Error> {
        let buf = request::encode(resource, sec_key, headers);
        io.write_all(&buf)?;
        io.flush()?;
        debug!("upgrade request sent for {}", resource);
        Ok(())
    }

    /// Emit one complete message.
    ///
    /// Text and binary payloads go out as a single final frame. Ping and
    /// pong payloads are capped at 125 bytes ([`Error::Frame`] with
    /// `PayloadTooBig` beyond that). `Close` always emits an empty close
    /// frame, whatever `data` holds; a status code and reason go through
    /// [`close_with`](Sender::close_with). `Continue` and `End` belong to
    /// [`stream`](Sender::stream) and fail with
    /// [`UsageError::UseStream`].
    pub fn send<W: Write>(&self, io: &mut W, opcode: OpCode, data: &[u8]) -> Result<(), Error> {
        match opcode {
            OpCode::Text | OpCode::Binary => self.frame(io, opcode, true, data),
            OpCode::Ping | OpCode::Pong => {
                if data.len() > MAX_CONTROL_FRAME_LENGTH {
                    return Err(crate::error::FrameError::PayloadTooBig.into());
                }
                self.frame(io, opcode, true, data)
            }
            OpCode::Close => self.close(io),
            OpCode::Continue | OpCode::End => Err(UsageError::UseStream.into()),
        }
    }

    /// Emit one fragment of a larger message.
    ///
    /// The opcode names the fragment's position: `Text`/`Binary` opens a
    /// sequence, `Continue` extends it, `End` finishes it (a continuation
    /// frame with fin set). `None` emits a zero-length fragment, which
    /// terminates a stream whose last data fit into an earlier fragment.
    pub fn stream<W: Write>(
        &self,
        io: &mut W,
        opcode: OpCode,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let (wire, fin) = match opcode {
            OpCode::Text | OpCode::Binary => (opcode, false),
            OpCode::Continue => (OpCode::Continue, false),
            OpCode::End => (OpCode::Continue, true),
            OpCode::Close | OpCode::Ping | OpCode::Pong => {
                return Err(UsageError::ControlInStream.into())
            }
        };
        self.frame(io, wire, fin, data.unwrap_or(&[]))
    }

    /// Emit an empty close frame.
    pub fn close<W: Write>(&self, io: &mut W) -> Result<(), Error> {
        self.frame(io, OpCode::Close, true, &[])
    }

    /// Emit a close frame with a status code and reason
    /// (RFC-6455 Section 5.5.1).
    pub fn close_with<W: Write>(&self, io: &mut W, code: u16, reason: &[u8]) -> Result<(), Error> {
        if 2 + reason.len() > MAX_CONTROL_FRAME_LENGTH {
            return Err(crate::error::FrameError::PayloadTooBig.into());
        }
        let mut payload = Vec::with_capacity(2 + reason.len());
        payload.extend_from_slice(&code.to_be_bytes());
        payload.extend_from_slice(reason);
        self.frame(io, OpCode::Close, true, &payload)
    }

    /// One frame: head in a single write, then the masked payload.
    fn frame<W: Write>(
        &self,
        io: &mut W,
        opcode: OpCode,
        fin: bool,
        data: &[u8],
    ) -> Result<(), Error> {
        self.put_head(io, opcode, fin, data.len() as u64)?;
        self.put_masked(io, data)?;
        io.flush()?;
        Ok(())
    }

    fn put_head<W: Write>(
        &self,
        io: &mut W,
        opcode: OpCode,
        fin: bool,
        len: u64,
    ) -> Result<(), Error> {
        let head = FrameHead::new(fin, opcode, Some(self.mask), len);
        let mut buf = [0u8; MAX_HEAD_LENGTH];
        let n = head.encode(&mut buf);
        io.write_all(&buf[..n])?;
        Ok(())
    }

    /// Mask and emit the payload, chunked through the scratch buffer.
    /// The rolling key index survives chunk boundaries.
    fn put_masked<W: Write>(&self, io: &mut W, data: &[u8]) -> Result<(), Error> {
        let mut scratch = [0u8; MASK_BUFFER_SIZE];

        let chunks = data.len() / MASK_BUFFER_SIZE;
        for c in 0..chunks {
            let at = c * MASK_BUFFER_SIZE;
            scratch.copy_from_slice(&data[at..at + MASK_BUFFER_SIZE]);
            mask::apply(self.mask, &mut scratch, at);
            io.write_all(&scratch)?;
        }

        let rest = &data[chunks * MASK_BUFFER_SIZE..];
        if !rest.is_empty() {
            let tail = &mut scratch[..rest.len()];
            tail.copy_from_slice(rest);
            mask::apply(self.mask, tail, chunks * MASK_BUFFER_SIZE);
            io.write_all(tail)?;
        }

        Ok(())
    }
}

impl Default for Sender {
    fn default() -> Self { Self::new() }
}
