use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq, Eq)]
pub enum UsageError {
    UseStream,

    ControlInStream,
}

impl Display for UsageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use UsageError::*;
        match self {
            UseStream => write!(f, "Fragments go through stream(), not send()"),
            ControlInStream => write!(f, "Control frames go through send(), not stream()"),
        }
    }
}

// use default impl
impl std::error::Error for UsageError {}
