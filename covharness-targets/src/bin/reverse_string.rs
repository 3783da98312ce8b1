use std::io::{self, Write};
use std::process::ExitCode;

use covharness::exit::{or_exit, validate_arg_count, validate_or_exit};
use covharness::{Argv, HarnessConfig, Payload};
use covharness_targets::algorithms::reverse;
use covharness_targets::init_logging;
use log::debug;

const EXPECTED_ARGS: usize = 306;
const ROUNDS: usize = 10_000;
/// An argument held more than one byte. Follows the harness statuses in `covharness::exit`.
const EXIT_NOT_A_CHARACTER: u8 = 5;

pub fn main() -> ExitCode {
    init_logging();
    let config = HarnessConfig::from_env();

    let mut argv = or_exit(Argv::from_stdin());
    argv.set_program_name("reverse_string");
    or_exit(validate_arg_count(&argv, EXPECTED_ARGS));

    let mut chars = Vec::with_capacity(EXPECTED_ARGS);
    for (index, arg) in argv.args().enumerate() {
        match arg {
            [byte] => chars.push(*byte),
            _ => {
                let _ = writeln!(
                    io::stderr(),
                    "Error: Argument {} is not a single character.",
                    index + 1
                );
                return ExitCode::from(EXIT_NOT_A_CHARACTER);
            }
        }
    }
    validate_or_exit(Some(Payload::Bytes(&chars)), &argv);

    debug!("reversing {} characters {} times", chars.len(), ROUNDS);
    for _ in 0..ROUNDS {
        reverse(&mut chars);
    }

    let mut stdout = io::stdout().lock();
    for byte in &chars {
        let _ = stdout.write_all(&[*byte, b' ']);
    }
    let _ = writeln!(stdout);

    config.input_log().record_argv(&argv);
    ExitCode::SUCCESS
}
