//! Client upgrade request.
//!
//! From [RFC-6455 Section 4.1](https://datatracker.ietf.org/doc/html/rfc6455#section-4.1):
//!
//! Once a connection to the server has been established (including a
//! connection via a proxy or over a TLS-encrypted tunnel), the client
//! MUST send an opening handshake to the server.
//!
//! Example:
//!
//! ```text
//! GET /chat HTTP/1.1
//! Pragma: no-cache
//! Cache-Control: no-cache
//! Connection: Upgrade
//! Upgrade: websocket
//! Sec-WebSocket-Version: 13
//! Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==
//! Host: www.example.com
//! ```

use super::{Header, HTTP_LINE_BREAK};

/// Encode the upgrade request for `resource` into one buffer.
///
/// The fixed headers come first, then `sec-websocket-key`, then the
/// caller-supplied headers in their given order, then the terminating
/// blank line. The result is written to the transport in a single pass.
pub fn encode(resource: &str, sec_key: &[u8; 24], headers: &[Header<'_>]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    push_line(&mut buf, &["GET ", resource, " HTTP/1.1"]);
    push_line(&mut buf, &["Pragma: no-cache"]);
    push_line(&mut buf, &["Cache-Control: no-cache"]);
    push_line(&mut buf, &["Connection: Upgrade"]);
    push_line(&mut buf, &["Upgrade: websocket"]);
    push_line(&mut buf, &["Sec-WebSocket-Version: 13"]);

    buf.extend_from_slice(b"Sec-WebSocket-Key: ");
    buf.extend_from_slice(sec_key);
    buf.extend_from_slice(HTTP_LINE_BREAK.as_bytes());

    for hdr in headers {
        push_line(&mut buf, &[hdr.name, ": ", hdr.value]);
    }

    buf.extend_from_slice(HTTP_LINE_BREAK.as_bytes());
    buf
}

fn push_line(buf: &mut Vec<u8>, parts: &[&str]) {
    for p in parts {
        buf.extend_from_slice(p.as_bytes());
    }
    buf.extend_from_slice(HTTP_LINE_BREAK.as_bytes());
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_bytes() {
        let headers = [
            Header::new("Host", "www.example.com"),
            Header::new("Origin", "http://www.example.com"),
        ];

        let buf = encode("/chat?q=1", b"dGhlIHNhbXBsZSBub25jZQ==", &headers);

        let expected = "\
            GET /chat?q=1 HTTP/1.1\r\n\
            Pragma: no-cache\r\n\
            Cache-Control: no-cache\r\n\
            Connection: Upgrade\r\n\
            Upgrade: websocket\r\n\
            Sec-WebSocket-Version: 13\r\n\
            Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
            Host: www.example.com\r\n\
            Origin: http://www.example.com\r\n\
            \r\n";

        assert_eq!(std::str::from_utf8(&buf).unwrap(), expected);
    }

    #[test]
    fn request_no_user_headers() {
        let buf = encode("/", b"dGhlIHNhbXBsZSBub25jZQ==", &[]);
        let text = std::str::from_utf8(&buf).unwrap();

        assert!(text.starts_with("GET / HTTP/1.1\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
        assert_eq!(text.matches("\r\n").count(), 8);
    }
}
