//! Turning harness failures into process exits. Each failure prints a single line to stderr.

use std::io::{self, Write};
use std::process;

use log::debug;

use crate::argv::Argv;
use crate::error::{Error, Result};
use crate::validate::{validate, Payload};

/// The typed payload disagreed with argv (also used for errors without a more specific status).
pub const EXIT_VALIDATION_FAILED: i32 = 1;
/// argv held a different number of arguments than expected.
pub const EXIT_ARG_COUNT: i32 = 2;
/// stdin did not fit the argv buffer.
pub const EXIT_CAPACITY: i32 = 3;
/// The guard hit array could not be allocated.
pub const EXIT_ALLOCATION: i32 = 4;

/// Prints `err` and terminates the process with [`Error::exit_code`].
pub fn fatal(err: Error) -> ! {
    debug!("terminating: {:?}", err);
    let _ = writeln!(io::stderr(), "{}", err);
    process::exit(err.exit_code())
}

/// Unwraps `result` or terminates the process through [`fatal`].
pub fn or_exit<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|err| fatal(err))
}

/// Checks that `argv` holds exactly `expected` arguments, program name not counted.
pub fn validate_arg_count(argv: &Argv, expected: usize) -> Result<()> {
    let found = argv.argc() - 1;
    if found != expected {
        return Err(Error::ArgCount { expected, found });
    }
    Ok(())
}

/// [`validate`] that terminates the process when the payload disagrees with `argv`.
pub fn validate_or_exit(payload: Option<Payload<'_>>, argv: &Argv) {
    if !validate(payload, argv) {
        fatal(Error::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_arg_count() {
        let argv = Argv::read_from(&b"1 2 3"[..]).unwrap();
        assert!(validate_arg_count(&argv, 3).is_ok());

        let err = validate_arg_count(&argv, 97).unwrap_err();
        assert_eq!(err.to_string(), "Error: Expected 97 arguments, but got 3.");
        assert_eq!(err.exit_code(), EXIT_ARG_COUNT);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            Error::Validation.exit_code(),
            Error::ArgCount {
                expected: 1,
                found: 0,
            }
            .exit_code(),
            Error::TooManyTokens { capacity: 1 }.exit_code(),
            Error::Allocation { requested: 1 }.exit_code(),
        ];

        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
