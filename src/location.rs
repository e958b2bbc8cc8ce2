//! Websocket locations.
//!
//! A [`Location`] is a parsed `ws://` or `wss://` uri. It resolves the
//! port (80 for `ws`, 443 for `wss`) and carries the resource the
//! upgrade request asks for. Opening the transport is the caller's job;
//! `wss` parses here but no TLS transport ships with this crate.

use url::Url;

use crate::error::{Error, HandshakeError};

/// A parsed websocket uri.
#[derive(Debug, Clone)]
pub struct Location {
    url: Url,
    port: u16,
    secure: bool,
}

impl Location {
    /// Parse a `ws://` or `wss://` uri.
    ///
    /// Any other scheme fails with [`HandshakeError::UnknownScheme`],
    /// a uri without a host with [`HandshakeError::MissingHost`].
    pub fn parse(uri: &str) -> Result<Self, Error> {
        let url = Url::parse(uri).map_err(HandshakeError::from)?;

        let secure = match url.scheme() {
            "ws" => false,
            "wss" => true,
            _ => return Err(HandshakeError::UnknownScheme.into()),
        };

        if url.host_str().is_none() {
            return Err(HandshakeError::MissingHost.into());
        }

        let port = url.port().unwrap_or(if secure { 443 } else { 80 });

        Ok(Location { url, port, secure })
    }

    /// Host name, without the port.
    #[inline]
    pub fn host(&self) -> &str { self.url.host_str().unwrap() }

    /// Resolved port, scheme default unless the uri names one.
    #[inline]
    pub fn port(&self) -> u16 { self.port }

    /// Whether the scheme is `wss`.
    #[inline]
    pub fn is_secure(&self) -> bool { self.secure }

    /// The resource sent on the request line: path, query and fragment.
    pub fn resource(&self) -> String {
        let mut r = String::from(self.url.path());
        if let Some(q) = self.url.query() {
            r.push('?');
            r.push_str(q);
        }
        if let Some(frag) = self.url.fragment() {
            r.push('#');
            r.push_str(frag);
        }
        r
    }

    /// Value for the `Host` request header. The port is elided when it
    /// is the scheme default.
    pub fn host_header(&self) -> String {
        let default = if self.secure { 443 } else { 80 };
        if self.port == default {
            self.host().to_owned()
        } else {
            format!("{}:{}", self.host(), self.port)
        }
    }
}
