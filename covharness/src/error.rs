use std::{fmt, fmt::Formatter, io, path::PathBuf};

use crate::exit::{EXIT_ALLOCATION, EXIT_ARG_COUNT, EXIT_CAPACITY, EXIT_VALIDATION_FAILED};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// There was an IO error while reading stdin or touching one of the shared files
    Io(io::Error),
    /// The exclusive `flock` on a shared file could not be acquired
    Lock { path: PathBuf, reason: nix::Error },
    /// Standard input held more bytes than the argv buffer can take
    InputTooLarge { capacity: usize },
    /// Standard input split into more tokens than there are argv slots
    TooManyTokens { capacity: usize },
    /// The number of arguments does not match what the program expects
    ArgCount { expected: usize, found: usize },
    /// Growing the guard hit array failed
    Allocation { requested: usize },
    /// The typed payload disagrees with the reconstructed argv
    Validation,
}

impl Error {
    /// Process exit status used when this error is escalated to process death.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ArgCount { .. } => EXIT_ARG_COUNT,
            Error::InputTooLarge { .. } | Error::TooManyTokens { .. } => EXIT_CAPACITY,
            Error::Allocation { .. } => EXIT_ALLOCATION,
            Error::Validation | Error::Io(_) | Error::Lock { .. } => EXIT_VALIDATION_FAILED,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Lock { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Lock { path, reason } => {
                write!(f, "failed to lock {}: {}", path.display(), reason)
            }
            Error::InputTooLarge { capacity } => {
                write!(f, "Error: input exceeds the argv buffer of {} bytes.", capacity)
            }
            Error::TooManyTokens { capacity } => {
                write!(f, "Error: input holds more than {} arguments.", capacity)
            }
            Error::ArgCount { expected, found } => write!(
                f,
                "Error: Expected {} arguments, but got {}.",
                expected, found
            ),
            Error::Allocation { requested } => write!(
                f,
                "Error: Failed to allocate memory for coverage tracking ({} guards).",
                requested
            ),
            Error::Validation => write!(f, "Input validation failed!"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
