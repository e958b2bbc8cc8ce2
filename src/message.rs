//! Decoded messages.

use crate::error::FrameError;
use crate::frame::OpCode;

/// Where a message's payload ended up.
#[derive(Debug, PartialEq, Eq)]
pub enum Data<'b> {
    /// The payload sits in a contiguous buffer: the caller's receive
    /// buffer for data messages, the receiver's control scratch for
    /// control messages.
    Slice(&'b [u8]),

    /// The payload was drained into the caller's writer; this is the
    /// byte count.
    Written(u64),
}

impl Data<'_> {
    /// Payload length in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        match self {
            Data::Slice(b) => b.len() as u64,
            Data::Written(n) => *n,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// The payload bytes, when they are in reach.
    #[inline]
    pub fn as_slice(&self) -> Option<&[u8]> {
        match self {
            Data::Slice(b) => Some(b),
            Data::Written(_) => None,
        }
    }
}

/// One decoded message.
///
/// Fragmentation is invisible here: an assembled message carries the
/// opcode of its first frame, never [`OpCode::Continue`].
#[derive(Debug, PartialEq, Eq)]
pub struct Message<'b> {
    /// Text, binary, ping, pong or close.
    pub opcode: OpCode,

    /// The payload. For close frames, the reason without the status code.
    pub data: Data<'b>,

    /// Close status code, present only for close frames whose payload
    /// held at least two bytes.
    pub code: Option<u16>,
}

impl<'b> Message<'b> {
    /// Build a data or control message.
    ///
    /// A continuation opcode is rejected with
    /// [`FrameError::FragmentedMessage`]; the receiver resolves
    /// fragments to the opcode that opened the sequence.
    pub fn new(opcode: OpCode, data: Data<'b>) -> Result<Self, FrameError> {
        if opcode == OpCode::Continue {
            return Err(FrameError::FragmentedMessage);
        }
        Ok(Message {
            opcode,
            data,
            code: None,
        })
    }

    #[inline]
    pub fn is_text(&self) -> bool { self.opcode == OpCode::Text }

    #[inline]
    pub fn is_binary(&self) -> bool { self.opcode == OpCode::Binary }

    #[inline]
    pub fn is_close(&self) -> bool { self.opcode == OpCode::Close }

    #[inline]
    pub fn is_ping(&self) -> bool { self.opcode == OpCode::Ping }

    #[inline]
    pub fn is_pong(&self) -> bool { self.opcode == OpCode::Pong }
}
