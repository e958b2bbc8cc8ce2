use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum HandshakeError {
    // location error
    UnknownScheme,

    MissingHost,

    Url(url::ParseError),

    // http error
    FailedSwitchingProtocols,

    BadHttpResponse,

    HttpHeaderTooLong,

    Httparse(httparse::Error),

    // key exchange error
    AcceptKeyNotFound,

    KeyControlFailed,
}

impl Display for HandshakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use HandshakeError::*;
        match self {
            // location error
            UnknownScheme => write!(f, "Scheme is neither ws nor wss"),

            MissingHost => write!(f, "Location has no host"),

            Url(e) => write!(f, "Bad location: {}", e),

            // http error
            FailedSwitchingProtocols => {
                write!(f, "Response is not 101 Switching Protocols")
            }

            BadHttpResponse => write!(f, "Malformed or truncated http response"),

            HttpHeaderTooLong => write!(f, "Response head exceeds the allowed length"),

            Httparse(e) => write!(f, "Http parse error: {}", e),

            // key exchange error
            AcceptKeyNotFound => {
                write!(f, "Missing sec-websocket-accept header")
            }

            KeyControlFailed => {
                write!(f, "sec-websocket-accept does not match the sent key")
            }
        }
    }
}

impl From<httparse::Error> for HandshakeError {
    fn from(e: httparse::Error) -> Self { HandshakeError::Httparse(e) }
}

impl From<url::ParseError> for HandshakeError {
    fn from(e: url::ParseError) -> Self {
        match e {
            url::ParseError::EmptyHost => HandshakeError::MissingHost,
            e => HandshakeError::Url(e),
        }
    }
}

impl std::error::Error for HandshakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandshakeError::Httparse(e) => Some(e),
            HandshakeError::Url(e) => Some(e),
            _ => None,
        }
    }
}
