use thiserror::Error;

pub type HsResult<T> = Result<T, HsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HsError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Time moved backward: from {from_s}s to {to_s}s")]
    TimeReversed { from_s: f64, to_s: f64 },
}
