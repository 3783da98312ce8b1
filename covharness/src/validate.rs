//! Cross-checks the typed input a program built for itself against the argv it was built from.
//!
//! This is a consistency oracle and not a parser. Integers are rendered without separators and
//! the argument boundaries are taken from the argv side only, so `[1, 23]` and `[12, 3]` are
//! indistinguishable. That keeps the verdicts identical to the C harness the fuzzing campaigns
//! were calibrated against.

use itertools::Itertools;
use log::trace;

use crate::argv::{is_space, Argv};

/// Data a program reconstructed from its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// One integer per argument.
    Ints(&'a [i32]),
    /// Only the first argument, as an integer.
    Int(i32),
    /// The arguments' bytes back to back.
    Bytes(&'a [u8]),
}

/// Returns true if `payload` encodes the same data as the arguments of `argv`.
///
/// A missing payload never validates.
pub fn validate(payload: Option<Payload<'_>>, argv: &Argv) -> bool {
    let Some(payload) = payload else {
        trace!("no payload to validate");
        return false;
    };

    match payload {
        Payload::Int(number) => argv
            .get(1)
            .map_or(false, |first| first == number.to_string().as_bytes()),
        Payload::Ints(numbers) => walk(numbers.iter().join("").as_bytes(), argv),
        Payload::Bytes(bytes) => walk(bytes, argv),
    }
}

/// Consumes every argument from `stream` in order. The end of `stream` and a NUL byte both behave
/// like the terminator of a C string.
fn walk(stream: &[u8], argv: &Argv) -> bool {
    let at = |pos: usize| stream.get(pos).copied().unwrap_or(0);

    let mut cursor = 0;
    let mut matched = 1;

    for arg in argv.args() {
        let arg = match arg.iter().position(|&byte| !is_space(byte)) {
            Some(start) => &arg[start..],
            None => &[][..],
        };
        while at(cursor) != 0 && is_space(at(cursor)) {
            cursor += 1;
        }
        if arg.is_empty() {
            continue;
        }

        for &byte in arg.iter().take_while(|&&byte| !is_space(byte)) {
            if at(cursor) != byte {
                trace!("mismatch at offset {} of argument {}", cursor, matched);
                return false;
            }
            cursor += 1;
        }
        matched += 1;
    }

    matched == argv.argc()
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use proptest::prelude::*;

    use super::*;

    fn argv(input: &str) -> Argv {
        Argv::read_from(input.as_bytes()).unwrap()
    }

    #[test_log::test]
    fn test_integer_sequence() {
        let argv = argv("5 -3 10");
        assert!(validate(Some(Payload::Ints(&[5, -3, 10])), &argv));
        assert!(!validate(Some(Payload::Ints(&[5, -3, 11])), &argv));
        assert!(!validate(Some(Payload::Ints(&[5, -3])), &argv));
    }

    #[test_log::test]
    fn test_integer_sequence_is_separator_blind() {
        assert!(validate(Some(Payload::Ints(&[12, 3])), &argv("1 23")));
    }

    #[test_log::test]
    fn test_extreme_integers() {
        let argv = argv("-2147483648 2147483647 0");
        assert!(validate(
            Some(Payload::Ints(&[i32::MIN, i32::MAX, 0])),
            &argv
        ));
    }

    #[test_log::test]
    fn test_single_integer_only_checks_first_argument() {
        let argv = argv("42 whatever");
        assert!(validate(Some(Payload::Int(42)), &argv));
        assert!(!validate(Some(Payload::Int(4)), &argv));
        assert!(!validate(Some(Payload::Int(42)), &self::argv("")));
    }

    #[test_log::test]
    fn test_raw_bytes() {
        let argv = argv("h e l l o");
        assert!(validate(Some(Payload::Bytes(b"hello")), &argv));
        assert!(validate(Some(Payload::Bytes(b" h e\tl l o")), &argv));
        assert!(!validate(Some(Payload::Bytes(b"help")), &argv));
        assert!(!validate(Some(Payload::Bytes(b"hel\0lo")), &argv));
    }

    #[test_log::test]
    fn test_missing_payload() {
        assert!(!validate(None, &argv("1 2 3")));
    }

    #[test_log::test]
    fn test_no_arguments() {
        let argv = argv("");
        assert!(validate(Some(Payload::Ints(&[])), &argv));
        assert!(validate(Some(Payload::Bytes(b"")), &argv));
    }

    proptest! {
        #[test]
        fn rendered_integers_validate(numbers in proptest::collection::vec(any::<i32>(), 0..64)) {
            let argv = argv(&numbers.iter().join(" "));
            prop_assert!(validate(Some(Payload::Ints(&numbers)), &argv));
        }

        #[test]
        fn flipped_digit_fails(
            numbers in proptest::collection::vec(any::<i32>(), 1..64),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut input = numbers.iter().join(" ").into_bytes();
            let digits: Vec<usize> = input
                .iter()
                .positions(|byte| byte.is_ascii_digit())
                .collect();
            let pos = digits[pick.index(digits.len())];
            input[pos] = if input[pos] == b'9' { b'0' } else { input[pos] + 1 };

            let argv = Argv::read_from(&input[..]).unwrap();
            prop_assert!(!validate(Some(Payload::Ints(&numbers)), &argv));
        }

        #[test]
        fn missing_payload_never_validates(input in "[0-9 -]{1,64}") {
            let argv = argv(&input);
            prop_assume!(!argv.is_empty());
            prop_assert!(!validate(None, &argv));
        }
    }
}
