//! Server upgrade response.
//!
//! The client accepts exactly one shape of response:
//!
//! ```text
//! HTTP/1.1 101 Switching Protocols
//! Upgrade: websocket
//! Connection: Upgrade
//! Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=
//! ```
//!
//! Only `Sec-WebSocket-Accept` is load-bearing; the other headers are
//! retained on request and otherwise dropped.

use super::{ResponseHeaders, ACCEPT_HEADER, MAX_ALLOW_HEADERS, SWITCHING_PROTOCOLS};
use crate::error::HandshakeError;

/// Decoded response head.
#[derive(Debug)]
pub struct Response {
    /// The value of `Sec-WebSocket-Accept`, when present.
    pub accept: Option<Vec<u8>>,
}

impl Response {
    /// Decode a complete response head (terminated by the blank line).
    ///
    /// The status line must be HTTP/1.1 with code 101, anything else is
    /// [`HandshakeError::FailedSwitchingProtocols`]. When `collect` is
    /// given, every header is stored under its case-exact name.
    pub fn decode(
        head: &[u8],
        mut collect: Option<&mut ResponseHeaders>,
    ) -> Result<Self, HandshakeError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_ALLOW_HEADERS];
        let mut response = httparse::Response::new(&mut headers);

        match response.parse(head)? {
            httparse::Status::Complete(_) => {}
            // the caller hands over a complete head
            httparse::Status::Partial => return Err(HandshakeError::BadHttpResponse),
        }

        // ref: https://docs.rs/httparse/latest/src/httparse/lib.rs.html
        // version is the minor digit of HTTP/1.x
        if response.version != Some(1) || response.code != Some(SWITCHING_PROTOCOLS) {
            return Err(HandshakeError::FailedSwitchingProtocols);
        }

        let mut accept = None;
        for hdr in response.headers.iter() {
            // header names are case insensitive
            // ref: https://datatracker.ietf.org/doc/html/rfc6455#section-4.1
            if hdr.name.eq_ignore_ascii_case(ACCEPT_HEADER) {
                accept = Some(hdr.value.to_vec());
            }
            if let Some(map) = collect.as_deref_mut() {
                map.insert(hdr.name, hdr.value);
            }
        }

        Ok(Response { accept })
    }
}
