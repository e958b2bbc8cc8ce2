//! A client bound to one transport.
//!
//! [`Connection`] owns the byte stream, a read-side buffer and a
//! [`Client`], and exposes the user-facing api. One value serves both
//! the buffered and the unbuffered shape: [`Options::buffered`] puts a
//! 4 KiB buffer in front of the receiver and retains the response
//! headers, [`Options::unbuffered`] reads straight off the transport
//! and keeps nothing but the accept key during the handshake.
//!
//! A connection must not be driven by two senders or two receivers at
//! once. The supported concurrent shape is one thread receiving in a
//! loop while another sends; the two directions share nothing but the
//! transport.

use std::io::{Read, Result as IoResult, Write};
use std::net::TcpStream;
use std::time::Duration;

use log::debug;

use crate::buffer::{BufStream, ReadBuffer, DEFAULT_READ_BUFFER};
use crate::client::{Client, Partial, Sink};
use crate::error::Error;
use crate::frame::OpCode;
use crate::handshake::{Header, ResponseHeaders};
use crate::location::Location;
use crate::message::Message;

/// A byte stream a connection can run over.
///
/// The timeout hook backs [`Connection::set_read_timeout`] and the
/// per-call deadline; transports without one (in-memory pipes in tests)
/// keep the default no-op and simply block.
pub trait Transport: Read + Write {
    /// Install or clear the receive-side timeout (`SO_RCVTIMEO`).
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> IoResult<()> {
        let _ = timeout;
        Ok(())
    }
}

impl Transport for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> IoResult<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

/// Connection construction knobs.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Read-side buffer capacity; zero reads straight off the transport.
    pub read_buffer: usize,

    /// Retain the full response header map after the handshake.
    pub collect_headers: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            read_buffer: DEFAULT_READ_BUFFER,
            collect_headers: false,
        }
    }
}

impl Options {
    /// Buffered reads plus the response header map.
    pub fn buffered() -> Self {
        Self {
            read_buffer: DEFAULT_READ_BUFFER,
            collect_headers: true,
        }
    }

    /// Direct reads, no header retention.
    pub fn unbuffered() -> Self {
        Self {
            read_buffer: 0,
            collect_headers: false,
        }
    }
}

/// A websocket client bound to a transport.
pub struct Connection<IO: Transport> {
    io: IO,
    buffer: ReadBuffer,
    client: Client,
    options: Options,
    headers: Option<ResponseHeaders>,
    read_timeout: Option<Duration>,
}

impl<IO: Transport> Connection<IO> {
    /// Bind a fresh client to `io` with default options.
    pub fn new(io: IO) -> Self { Self::with_options(io, Options::default()) }

    /// Bind a fresh client to `io`.
    pub fn with_options(io: IO, options: Options) -> Self {
        Self {
            io,
            buffer: ReadBuffer::with_capacity(options.read_buffer),
            client: Client::new(),
            options,
            headers: None,
            read_timeout: None,
        }
    }

    /// Perform the opening handshake.
    ///
    /// `headers` go out verbatim after the fixed upgrade headers;
    /// include `Host` when the server requires it
    /// ([`Location::host_header`] builds the value). On failure the
    /// connection is unusable.
    pub fn handshake(&mut self, location: &Location, headers: &[Header<'_>]) -> Result<(), Error> {
        if self.options.collect_headers {
            self.headers = Some(ResponseHeaders::new());
        }

        let Self {
            io,
            buffer,
            client,
            headers: collected,
            ..
        } = self;

        let sec_key = crate::handshake::new_sec_key();
        client
            .sender
            .send_request(io, &location.resource(), &sec_key, headers)?;

        // response bytes flow through the read buffer like frame bytes do
        let mut stream = BufStream::new(buffer, io);
        let accept = client
            .receiver
            .receive_response(&mut stream, collected.as_mut())?;
        crate::client::check_accept(&sec_key, accept)?;
        debug!("connection upgraded to websocket");
        Ok(())
    }

    /// Headers the server sent on the handshake response, when
    /// [`Options::collect_headers`] was set.
    pub fn response_headers(&self) -> Option<&ResponseHeaders> { self.headers.as_ref() }

    /// Install or clear the transport-level read timeout. A receive
    /// hitting it fails with a `WouldBlock` io error (see
    /// [`Error::is_would_block`]) and may be retried.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
        self.io.set_read_timeout(timeout)?;
        self.read_timeout = timeout;
        Ok(())
    }

    // ---- send side -------------------------------------------------

    /// Send one complete message. `Close` always goes out empty; a
    /// status code and reason go through [`close_with`](Self::close_with).
    pub fn send(&mut self, opcode: OpCode, data: &[u8]) -> Result<(), Error> {
        self.client.sender.send(&mut self.io, opcode, data)
    }

    /// Send a final text frame.
    pub fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.send(OpCode::Text, text.as_bytes())
    }

    /// Send a final binary frame.
    pub fn send_binary(&mut self, data: &[u8]) -> Result<(), Error> {
        self.send(OpCode::Binary, data)
    }

    /// Send a ping (payload at most 125 bytes).
    pub fn ping(&mut self, data: &[u8]) -> Result<(), Error> { self.send(OpCode::Ping, data) }

    /// Send a pong (payload at most 125 bytes).
    pub fn pong(&mut self, data: &[u8]) -> Result<(), Error> { self.send(OpCode::Pong, data) }

    /// Send one fragment of a larger message; see
    /// [`Sender::stream`](crate::client::Sender::stream).
    pub fn stream(&mut self, opcode: OpCode, data: Option<&[u8]>) -> Result<(), Error> {
        self.client.sender.stream(&mut self.io, opcode, data)
    }

    /// Send an empty close frame.
    pub fn close(&mut self) -> Result<(), Error> {
        debug!("sending close");
        self.client.sender.close(&mut self.io)
    }

    /// Send a close frame with a status code and reason.
    pub fn close_with(&mut self, code: u16, reason: &[u8]) -> Result<(), Error> {
        debug!("sending close, code {}", code);
        self.client.sender.close_with(&mut self.io, code, reason)
    }

    // ---- receive side ----------------------------------------------

    /// Receive one message into `sink`; the core that the convenience
    /// wrappers below delegate to.
    ///
    /// `max_len` bounds the message payload (zero = unbounded), checked
    /// before any payload byte is read. `deadline` bounds the wait for
    /// the first byte of the next frame: `None` blocks, `Duration::ZERO`
    /// does not wait, otherwise waits at most that long; when it fires,
    /// the error answers `is_would_block` and no frame byte has been
    /// consumed.
    pub fn receive<'s>(
        &'s mut self,
        sink: Sink<'s>,
        max_len: u64,
        deadline: Option<Duration>,
    ) -> Result<Message<'s>, Error> {
        self.wait_first_byte(deadline)?;
        let Self {
            io,
            buffer,
            client,
            ..
        } = self;
        let mut stream = BufStream::new(buffer, io);
        client.receiver.receive(&mut stream, sink, max_len)
    }

    /// Receive one message into `buf`; the payload is returned as a
    /// slice of it. While a fragmented message is in flight (control
    /// frames may interleave), keep passing the same buffer.
    pub fn recv<'b>(&'b mut self, buf: &'b mut [u8]) -> Result<Message<'b>, Error> {
        self.receive(Sink::Buffer(buf), 0, None)
    }

    /// Receive one message, draining the payload into `writer`.
    pub fn recv_into<'w>(
        &'w mut self,
        writer: &'w mut dyn Write,
        max_len: u64,
    ) -> Result<Message<'w>, Error> {
        self.receive(Sink::Writer(writer), max_len, None)
    }

    /// Receive one frame without draining its payload; the partial
    /// discipline. The returned reader must be drained fully before the
    /// next receive.
    pub fn recv_partial(
        &mut self,
        max_len: u64,
        deadline: Option<Duration>,
    ) -> Result<Partial<'_, BufStream<'_, IO>>, Error> {
        self.wait_first_byte(deadline)?;
        let Self {
            io,
            buffer,
            client,
            ..
        } = self;
        let stream = BufStream::new(buffer, io);
        client.receiver.receive_partial(stream, max_len)
    }

    /// Arm the per-call deadline and pull the first byte of the next
    /// frame into the buffer. Buffered bytes satisfy it immediately.
    fn wait_first_byte(&mut self, deadline: Option<Duration>) -> Result<(), Error> {
        let deadline = match deadline {
            None => return Ok(()),
            Some(d) => d,
        };
        if !self.buffer.is_empty() {
            return Ok(());
        }

        // SO_RCVTIMEO cannot express zero, it means blocking there;
        // "do not wait" becomes the shortest timeout std accepts on
        // every platform
        let armed = if deadline.is_zero() {
            Duration::from_millis(1)
        } else {
            deadline
        };

        self.io.set_read_timeout(Some(armed))?;
        let fetched = self.buffer.prefetch(&mut self.io);
        self.io.set_read_timeout(self.read_timeout)?;
        fetched?;
        Ok(())
    }

    /// The underlying transport.
    pub fn get_ref(&self) -> &IO { &self.io }

    /// The underlying transport. Reading from it mid-frame corrupts
    /// the stream.
    pub fn get_mut(&mut self) -> &mut IO { &mut self.io }

    /// Tear the connection apart, dropping buffers and the header map,
    /// and hand back the transport.
    pub fn into_inner(self) -> IO { self.io }
}
