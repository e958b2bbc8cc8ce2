//! Frame reception and message assembly.
//!
//! One [`Receiver::receive`] call decodes frames until a complete
//! message is on hand: a single data frame, an assembled fragment
//! sequence, or a control frame (which may legally interleave a
//! fragment sequence and leaves it undisturbed). The payload lands in
//! the caller's [`Sink`]; control payloads land in the receiver's
//! scratch and are surfaced as slices over it.
//!
//! [`Receiver::receive_partial`] is the third discipline: it stops
//! after the frame head and hands back a bounded reader over the
//! payload, one item per frame. The caller must drain that reader
//! completely before the next call, otherwise the stream is left in the
//! middle of a frame and further decoding is undefined.

use std::cmp;
use std::io::{ErrorKind, Read, Result as IoResult, Write};

use log::debug;

use crate::error::{Error, FrameError, HandshakeError};
use crate::frame::{read_exact_frame, FrameHead, OpCode, MAX_CONTROL_FRAME_LENGTH};
use crate::handshake::{Response, ResponseHeaders, MAX_HTTP_HEADER_LENGTH};
use crate::message::{Data, Message};

/// Payloads are drained into a writer through a chunk of this many bytes.
const DRAIN_CHUNK: usize = 1024;

/// Where [`Receiver::receive`] should put the payload.
pub enum Sink<'s> {
    /// Drain each frame into this writer; the message reports the byte
    /// count as [`Data::Written`].
    Writer(&'s mut dyn Write),

    /// Read each frame straight into this buffer; the message borrows
    /// the written prefix as [`Data::Slice`]. The capacity caps the
    /// message size.
    Buffer(&'s mut [u8]),
}

/// Fragment sequence in progress.
#[derive(Debug)]
struct Fragment {
    on: bool,
    opcode: OpCode,
    taken: u64,
}

impl Fragment {
    const fn clear() -> Self {
        Self {
            on: false,
            opcode: OpCode::Text,
            taken: 0,
        }
    }
}

/// The decoding half of a client.
///
/// Owns the fragmentation state and the control-frame scratch. Not for
/// concurrent use; one thread receives while another may send.
#[derive(Debug)]
pub struct Receiver {
    fragment: Fragment,
    scratch: [u8; MAX_CONTROL_FRAME_LENGTH],
}

impl Receiver {
    /// Constructor.
    pub fn new() -> Self {
        Self {
            fragment: Fragment::clear(),
            scratch: [0u8; MAX_CONTROL_FRAME_LENGTH],
        }
    }

    /// Read the handshake response head and return the value of
    /// `Sec-WebSocket-Accept`, if the server sent one.
    ///
    /// Reads up to the blank line and not a byte further - anything
    /// after it already belongs to the frame stream. The head is capped
    /// at [`MAX_HTTP_HEADER_LENGTH`] bytes.
    pub fn receive_response<R: Read>(
        &mut self,
        io: &mut R,
        collect: Option<&mut ResponseHeaders>,
    ) -> Result<Option<Vec<u8>>, Error> {
        let mut head = Vec::with_capacity(256);
        let mut byte = [0u8; 1];

        while !head.ends_with(b"\r\n\r\n") {
            if head.len() >= MAX_HTTP_HEADER_LENGTH {
                return Err(HandshakeError::HttpHeaderTooLong.into());
            }
            io.read_exact(&mut byte).map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => Error::from(HandshakeError::BadHttpResponse),
                _ => Error::Io(e),
            })?;
            head.push(byte[0]);
        }

        let response = Response::decode(&head, collect)?;
        Ok(response.accept)
    }

    /// Decode frames until one message is complete and deliver its
    /// payload into `sink`.
    ///
    /// `max_len` bounds the cumulative payload of one message; zero
    /// means unbounded. The bound is enforced before any payload byte is
    /// read. A fragment sequence may span several calls when control
    /// frames interleave it; pass the same buffer sink until the
    /// sequence completes.
    pub fn receive<'m, R: Read>(
        &'m mut self,
        io: &mut R,
        mut sink: Sink<'m>,
        max_len: u64,
    ) -> Result<Message<'m>, Error> {
        loop {
            let head = FrameHead::read_from(io)?;
            check_rsv(&head)?;

            match head.opcode {
                // control frames interleave; fragmentation survives them
                OpCode::Ping | OpCode::Pong | OpCode::Close => {
                    return self.control(io, head, max_len);
                }
                OpCode::Text | OpCode::Binary => {
                    if self.fragment.on {
                        return Err(FrameError::BadMessageOrder.into());
                    }
                    self.check_limit(head.len, &sink, max_len)?;
                    let n = deliver(io, &mut sink, 0, head.len)?;
                    if head.fin {
                        return Ok(Message::new(head.opcode, finish(sink, n))?);
                    }
                    self.fragment = Fragment {
                        on: true,
                        opcode: head.opcode,
                        taken: n,
                    };
                }
                OpCode::Continue => {
                    if !self.fragment.on {
                        return Err(FrameError::BadMessageOrder.into());
                    }
                    self.check_limit(head.len, &sink, max_len)?;
                    let at = self.fragment.taken;
                    deliver(io, &mut sink, at, head.len)?;
                    self.fragment.taken += head.len;
                    if head.fin {
                        let opcode = self.fragment.opcode;
                        let total = self.fragment.taken;
                        self.fragment = Fragment::clear();
                        return Ok(Message::new(opcode, finish(sink, total))?);
                    }
                }
                // never parses from the wire
                OpCode::End => unreachable!(),
            }
        }
    }

    /// Decode one frame head and hand back the payload as a bounded
    /// reader instead of draining it.
    ///
    /// Control frames are the exception: their payload is read into the
    /// receiver's scratch and the reader serves it from there, so the
    /// close code is already parsed. For a fragment sequence this
    /// returns one item per frame, each carrying the opcode that opened
    /// the sequence; the caller stops once `complete` is set.
    pub fn receive_partial<'c, R: Read>(
        &'c mut self,
        mut io: R,
        max_len: u64,
    ) -> Result<Partial<'c, R>, Error> {
        let head = FrameHead::read_from(&mut io)?;
        check_rsv(&head)?;

        match head.opcode {
            OpCode::Ping | OpCode::Pong | OpCode::Close => {
                if !head.fin {
                    return Err(FrameError::FragmentedControl.into());
                }
                if head.len > MAX_CONTROL_FRAME_LENGTH as u64 {
                    return Err(FrameError::PayloadTooBig.into());
                }
                if max_len > 0 && head.len > max_len {
                    return Err(FrameError::PayloadTooBig.into());
                }
                let len = head.len as usize;
                read_exact_frame(&mut io, &mut self.scratch[..len])?;

                let mut code = None;
                let mut at = 0;
                if head.opcode == OpCode::Close {
                    if len >= 2 {
                        code = Some(u16::from_be_bytes([self.scratch[0], self.scratch[1]]));
                    }
                    at = cmp::min(2, len);
                }
                Ok(Partial {
                    opcode: head.opcode,
                    complete: true,
                    code,
                    reader: PartialReader {
                        src: Source::Scratch(&self.scratch[at..len]),
                    },
                })
            }
            OpCode::Text | OpCode::Binary => {
                if self.fragment.on {
                    return Err(FrameError::BadMessageOrder.into());
                }
                if max_len > 0 && head.len > max_len {
                    return Err(FrameError::PayloadTooBig.into());
                }
                if !head.fin {
                    self.fragment = Fragment {
                        on: true,
                        opcode: head.opcode,
                        taken: head.len,
                    };
                }
                Ok(Partial {
                    opcode: head.opcode,
                    complete: head.fin,
                    code: None,
                    reader: PartialReader {
                        src: Source::Stream { io, left: head.len },
                    },
                })
            }
            OpCode::Continue => {
                if !self.fragment.on {
                    return Err(FrameError::BadMessageOrder.into());
                }
                if max_len > 0 && self.fragment.taken + head.len > max_len {
                    return Err(FrameError::PayloadTooBig.into());
                }
                let opcode = self.fragment.opcode;
                if head.fin {
                    self.fragment = Fragment::clear();
                } else {
                    self.fragment.taken += head.len;
                }
                Ok(Partial {
                    opcode,
                    complete: head.fin,
                    code: None,
                    reader: PartialReader {
                        src: Source::Stream { io, left: head.len },
                    },
                })
            }
            OpCode::End => unreachable!(),
        }
    }

    /// One complete control frame, payload read into the scratch.
    fn control<'m, R: Read>(
        &'m mut self,
        io: &mut R,
        head: FrameHead,
        max_len: u64,
    ) -> Result<Message<'m>, Error> {
        if !head.fin {
            return Err(FrameError::FragmentedControl.into());
        }
        if head.len > MAX_CONTROL_FRAME_LENGTH as u64 {
            return Err(FrameError::PayloadTooBig.into());
        }
        if max_len > 0 && head.len > max_len {
            return Err(FrameError::PayloadTooBig.into());
        }

        // exactly the declared length, never the whole scratch
        let len = head.len as usize;
        read_exact_frame(io, &mut self.scratch[..len])?;

        if head.opcode == OpCode::Close {
            let code = if len >= 2 {
                Some(u16::from_be_bytes([self.scratch[0], self.scratch[1]]))
            } else {
                None
            };
            debug!("close frame received, code {:?}", code);
            let reason_at = cmp::min(2, len);
            let mut msg = Message::new(OpCode::Close, Data::Slice(&self.scratch[reason_at..len]))?;
            msg.code = code;
            return Ok(msg);
        }

        Ok(Message::new(
            head.opcode,
            Data::Slice(&self.scratch[..len]),
        )?)
    }

    /// `PayloadTooBig` before the payload is touched.
    fn check_limit(&self, len: u64, sink: &Sink<'_>, max_len: u64) -> Result<(), FrameError> {
        let total = self.fragment.taken + len;
        if max_len > 0 && total > max_len {
            return Err(FrameError::PayloadTooBig);
        }
        if let Sink::Buffer(buf) = sink {
            if total > buf.len() as u64 {
                return Err(FrameError::PayloadTooBig);
            }
        }
        Ok(())
    }
}

impl Default for Receiver {
    fn default() -> Self { Self::new() }
}

fn check_rsv(head: &FrameHead) -> Result<(), FrameError> {
    // no extension is ever negotiated
    if head.rsv1 || head.rsv2 || head.rsv3 {
        return Err(FrameError::RsvNotZero);
    }
    Ok(())
}

/// Pull one frame's payload into the sink. `at` is the write offset of
/// a buffer sink, the running total of the current message.
fn deliver<R: Read>(io: &mut R, sink: &mut Sink<'_>, at: u64, len: u64) -> Result<u64, Error> {
    match sink {
        Sink::Buffer(buf) => {
            let at = at as usize;
            read_exact_frame(io, &mut buf[at..at + len as usize])?;
        }
        Sink::Writer(w) => {
            let mut chunk = [0u8; DRAIN_CHUNK];
            let mut left = len;
            while left > 0 {
                let n = cmp::min(left, DRAIN_CHUNK as u64) as usize;
                read_exact_frame(io, &mut chunk[..n])?;
                w.write_all(&chunk[..n])?;
                left -= n as u64;
            }
        }
    }
    Ok(len)
}

fn finish(sink: Sink<'_>, total: u64) -> Data<'_> {
    match sink {
        Sink::Buffer(buf) => Data::Slice(&buf[..total as usize]),
        Sink::Writer(_) => Data::Written(total),
    }
}

/// One frame of the partial discipline: the head is decoded, the
/// payload is still on the stream behind `reader`.
#[derive(Debug)]
pub struct Partial<'c, R> {
    /// The message opcode; continuation frames carry the opcode that
    /// opened their sequence.
    pub opcode: OpCode,

    /// Set on the final frame of the message.
    pub complete: bool,

    /// Close status code, parsed ahead of the reader.
    pub code: Option<u16>,

    /// Bounded reader over this frame's payload. Drain it fully before
    /// the next receive.
    pub reader: PartialReader<'c, R>,
}

/// Bounded reader over one frame's payload.
#[derive(Debug)]
pub struct PartialReader<'c, R> {
    src: Source<'c, R>,
}

#[derive(Debug)]
enum Source<'c, R> {
    Stream { io: R, left: u64 },
    Scratch(&'c [u8]),
}

impl<R> PartialReader<'_, R> {
    /// Bytes of this frame not yet read.
    pub fn remaining(&self) -> u64 {
        match &self.src {
            Source::Stream { left, .. } => *left,
            Source::Scratch(s) => s.len() as u64,
        }
    }
}

impl<R: Read> Read for PartialReader<'_, R> {
    fn read(&mut self, dst: &mut [u8]) -> IoResult<usize> {
        match &mut self.src {
            Source::Stream { io, left } => {
                if *left == 0 {
                    return Ok(0);
                }
                let n = cmp::min(dst.len() as u64, *left) as usize;
                let read_n = io.read(&mut dst[..n])?;
                *left -= read_n as u64;
                Ok(read_n)
            }
            Source::Scratch(slice) => {
                let n = cmp::min(dst.len(), slice.len());
                let (head, tail) = slice.split_at(n);
                dst[..n].copy_from_slice(head);
                *slice = tail;
                Ok(n)
            }
        }
    }
}
