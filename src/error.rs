use thiserror::Error;

use crate::types::Lit;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid literal {0}: literals must be nonzero")]
    InvalidLiteral(Lit),

    #[error("literal {literal} refers to an unallocated variable ({var_count} allocated)")]
    InvalidArgument { literal: Lit, var_count: usize },

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("invalid handle {0:#x}")]
    InvalidHandle(u64),

    #[error("null array with nonzero length")]
    NullPointer,

    #[error("out of memory")]
    OutOfMemory,

    #[error("i/o error: {0}")]
    Io(String),
}

impl Error {
    /// Negative status code used on the C boundary.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidHandle(_) => -1,
            Error::InvalidLiteral(_) => -2,
            Error::InvalidArgument { .. } | Error::NullPointer => -3,
            Error::InvalidState(_) => -4,
            Error::OutOfMemory => -5,
            Error::Io(_) => -6,
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
