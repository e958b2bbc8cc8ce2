//! Plain blocking websocket client.
//!
//! A client-side implement of [RFC-6455](https://datatracker.ietf.org/doc/html/rfc6455)
//! over any `Read + Write` byte stream, usually a [`TcpStream`](std::net::TcpStream).
//! Everything blocks on the caller's thread; there is no runtime and no
//! background work.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use plainws::{Connection, Location, OpCode};
//! use plainws::handshake::Header;
//!
//! let location = Location::parse("ws://echo.example.com/chat")?;
//! let tcp = TcpStream::connect((location.host(), location.port()))?;
//!
//! let mut ws = Connection::new(tcp);
//! let host = location.host_header();
//! ws.handshake(&location, &[Header::new("Host", &host)])?;
//!
//! ws.send_text("Hello")?;
//! let mut buf = [0u8; 4096];
//! let echo = ws.recv(&mut buf)?;
//! assert_eq!(echo.opcode, OpCode::Text);
//! # Ok::<(), plainws::Error>(())
//! ```

pub mod buffer;
pub mod client;
pub mod connection;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod location;
pub mod message;

pub use client::{Client, Partial, PartialReader, Receiver, Sender, Sink};
pub use connection::{Connection, Options, Transport};
pub use error::Error;
pub use frame::OpCode;
pub use location::Location;
pub use message::{Data, Message};
