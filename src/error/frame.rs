use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    MaskedFromServer,

    UnknownOpCode,

    RsvNotZero,

    FragmentedControl,

    BadMessageOrder,

    FragmentedMessage,

    PayloadTooBig,

    EndOfStream,
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use FrameError::*;
        match self {
            MaskedFromServer => write!(f, "Server sent a masked frame"),
            UnknownOpCode => write!(f, "Unknown or reserved opcode"),
            RsvNotZero => write!(f, "Reserved bits set without a negotiated extension"),
            FragmentedControl => write!(f, "Control frame without fin"),
            BadMessageOrder => write!(f, "Continuation frame out of order"),
            FragmentedMessage => write!(f, "Message constructed with continuation opcode"),
            PayloadTooBig => write!(f, "Payload exceeds the allowed length"),
            EndOfStream => write!(f, "Stream ended in the middle of a frame"),
        }
    }
}

// use default impl
impl std::error::Error for FrameError {}
