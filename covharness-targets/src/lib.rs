//! Toy programs the harness is exercised with. Each binary reads its arguments from stdin,
//! validates them, runs its algorithm and records the accepted input.

use log::LevelFilter;

pub mod algorithms;

/// Routes `log` output to stderr, quiet unless `RUST_LOG` asks for more.
pub fn init_logging() {
    if let Ok(config) = covharness::log::config_default(LevelFilter::Warn) {
        // a second logger can only come from an embedding test, keep that one
        let _ = log4rs::init_config(config);
    }
}

/// Converts an argument the way C's `atoi` does: leading whitespace, an optional sign, then
/// digits up to the first non-digit. Overflow wraps around.
pub fn atoi(arg: &[u8]) -> i32 {
    let arg = match arg.iter().position(|&byte| !covharness::argv::is_space(byte)) {
        Some(start) => &arg[start..],
        None => return 0,
    };

    let (negative, digits) = match arg.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, arg),
    };

    let value = digits
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .fold(0i32, |acc, digit| {
            acc.wrapping_mul(10).wrapping_add(i32::from(digit - b'0'))
        });

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
