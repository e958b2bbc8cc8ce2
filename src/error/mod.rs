//! Failure surface of the crate.
//!
//! Each fault domain keeps its own enum - [`HandshakeError`] for the
//! http upgrade, [`FrameError`] for wire-protocol violations,
//! [`UsageError`] for api misuse - and [`Error`] folds them together
//! with transport io failures. Apart from a read timeout (see
//! [`Error::is_would_block`]), every receive-side failure leaves the
//! byte stream in an indeterminate state; the only safe next step is to
//! close the connection.

mod frame;
mod handshake;
mod usage;

pub use frame::FrameError;
pub use handshake::HandshakeError;
pub use usage::UsageError;

use std::fmt::{Display, Formatter};
use std::io::ErrorKind;

/// Anything a connection can fail with.
#[derive(Debug)]
pub enum Error {
    /// The opening handshake went wrong; the connection never became a
    /// websocket.
    Handshake(HandshakeError),

    /// The peer broke the framing protocol mid-session.
    Frame(FrameError),

    /// The caller drove the api in an unsupported way; nothing was
    /// written to the wire.
    Usage(UsageError),

    /// The transport failed, read timeouts included.
    Io(std::io::Error),
}

impl Error {
    /// Whether this error is a read timeout.
    ///
    /// A timed-out receive has not consumed any frame bytes, so retrying
    /// with a longer deadline is well defined. Every other receive error
    /// leaves the stream in an indeterminate state and the connection
    /// should be closed.
    #[inline]
    pub fn is_would_block(&self) -> bool {
        match self {
            Error::Io(e) => matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut),
            _ => false,
        }
    }
}

impl From<HandshakeError> for Error {
    fn from(e: HandshakeError) -> Self { Error::Handshake(e) }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self { Error::Frame(e) }
}

impl From<UsageError> for Error {
    fn from(e: UsageError) -> Self { Error::Usage(e) }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error { Error::Io(e) }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Error::*;
        match self {
            Handshake(e) => write!(f, "websocket handshake failed: {}", e),
            Frame(e) => write!(f, "websocket framing violated: {}", e),
            Usage(e) => write!(f, "websocket api misused: {}", e),
            Io(e) => write!(f, "websocket transport failed: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use Error::*;

        match self {
            Handshake(e) => Some(e),
            Frame(e) => Some(e),
            Usage(e) => Some(e),
            Io(e) => Some(e),
        }
    }
}
