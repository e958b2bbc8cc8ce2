//! Websocket client: sender, receiver and the opening handshake.

pub mod receiver;
pub mod sender;

pub use receiver::{Partial, PartialReader, Receiver, Sink};
pub use sender::Sender;

use std::io::{Read, Write};

use log::debug;

use crate::error::{Error, HandshakeError};
use crate::handshake::{derive_accept_key, new_sec_key, Header, ResponseHeaders};
use crate::location::Location;

/// A websocket client over some byte stream.
///
/// Composes a [`Sender`] (which owns the masking key, drawn at
/// construction) and a [`Receiver`] (which owns the fragmentation
/// state). The client holds no transport; every operation takes the
/// stream it works on. [`Connection`](crate::connection::Connection)
/// binds a client to one transport and is the usual entry point.
#[derive(Debug, Default)]
pub struct Client {
    pub(crate) sender: Sender,
    pub(crate) receiver: Receiver,
}

impl Client {
    /// Constructor; draws the masking key.
    pub fn new() -> Self {
        Self {
            sender: Sender::new(),
            receiver: Receiver::new(),
        }
    }

    /// The emitting half.
    #[inline]
    pub fn sender(&self) -> &Sender { &self.sender }

    /// The decoding half.
    #[inline]
    pub fn receiver_mut(&mut self) -> &mut Receiver { &mut self.receiver }

    /// Perform the opening handshake on `io`.
    ///
    /// Draws a fresh `Sec-WebSocket-Key`, emits the upgrade request
    /// (`headers` are appended verbatim; include `Host` when the server
    /// needs it), reads the response and checks the accept digest.
    /// On failure the connection is unusable and should be closed.
    pub fn handshake<IO: Read + Write>(
        &mut self,
        io: &mut IO,
        location: &Location,
        headers: &[Header<'_>],
        collect: Option<&mut ResponseHeaders>,
    ) -> Result<(), Error> {
        let sec_key = new_sec_key();
        self.sender
            .send_request(io, &location.resource(), &sec_key, headers)?;
        let accept = self.receiver.receive_response(io, collect)?;
        check_accept(&sec_key, accept)?;
        debug!("handshake complete for {}", location.host());
        Ok(())
    }
}

/// Compare the server's `Sec-WebSocket-Accept` against the digest of
/// the key we sent.
pub(crate) fn check_accept(
    sec_key: &[u8; 24],
    accept: Option<Vec<u8>>,
) -> Result<(), HandshakeError> {
    let expected = derive_accept_key(sec_key);
    match accept {
        None => Err(HandshakeError::AcceptKeyNotFound),
        Some(got) if got != expected => Err(HandshakeError::KeyControlFailed),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::{Cursor, Result as IoResult};

    // reads canned bytes, collects writes
    struct Scripted {
        r: Cursor<Vec<u8>>,
        w: Vec<u8>,
    }

    impl Scripted {
        fn new(inbound: &[u8]) -> Self {
            Self {
                r: Cursor::new(inbound.to_vec()),
                w: Vec::new(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> { self.r.read(buf) }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> IoResult<usize> { self.w.write(buf) }
        fn flush(&mut self) -> IoResult<()> { Ok(()) }
    }

    #[test]
    fn accept_check() {
        let key = *b"dGhlIHNhbXBsZSBub25jZQ==";

        check_accept(&key, Some(b"s3pPLMBiTxaQ9kYGzzhZRbK+xOo=".to_vec())).unwrap();

        let err = check_accept(&key, None).unwrap_err();
        assert!(matches!(err, HandshakeError::AcceptKeyNotFound));

        let err = check_accept(&key, Some(b"AAAAAAAAAAAAAAAAAAAAAAAAAAA=".to_vec())).unwrap_err();
        assert!(matches!(err, HandshakeError::KeyControlFailed));
    }

    #[test]
    fn handshake_rejects_bad_accept() {
        // the key is random per handshake, so a fixed accept cannot match
        let response = b"\
            HTTP/1.1 101 Switching Protocols\r\n\
            Upgrade: websocket\r\n\
            Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\
            \r\n";
        let mut io = Scripted::new(response);
        let mut client = Client::new();
        let location = Location::parse("ws://example.com/chat").unwrap();

        let err = client.handshake(&mut io, &location, &[], None).unwrap_err();
        assert!(matches!(
            err,
            Error::Handshake(HandshakeError::KeyControlFailed)
        ));

        // the request went out before the response was judged
        let sent = String::from_utf8(io.w).unwrap();
        assert!(sent.starts_with("GET /chat HTTP/1.1\r\n"));
        assert!(sent.contains("Sec-WebSocket-Key: "));
    }

    #[test]
    fn handshake_missing_accept() {
        let response = b"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\r\n";
        let mut io = Scripted::new(response);
        let mut client = Client::new();
        let location = Location::parse("ws://example.com/").unwrap();

        let err = client.handshake(&mut io, &location, &[], None).unwrap_err();
        assert!(matches!(
            err,
            Error::Handshake(HandshakeError::AcceptKeyNotFound)
        ));
    }

    #[test]
    fn handshake_wrong_status() {
        let response = b"HTTP/1.1 404 Not Found\r\n\r\n";
        let mut io = Scripted::new(response);
        let mut client = Client::new();
        let location = Location::parse("ws://example.com/").unwrap();

        let err = client.handshake(&mut io, &location, &[], None).unwrap_err();
        assert!(matches!(
            err,
            Error::Handshake(HandshakeError::FailedSwitchingProtocols)
        ));
    }
}
