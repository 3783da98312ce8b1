use std::io::{self, Write};
use std::process::ExitCode;

use covharness::exit::{or_exit, validate_arg_count, validate_or_exit};
use covharness::{Argv, HarnessConfig, Payload};
use covharness_targets::algorithms::bubble_sort;
use covharness_targets::{atoi, init_logging};
use log::debug;

const EXPECTED_ARGS: usize = 97;
const ROUNDS: usize = 10_000;

pub fn main() -> ExitCode {
    init_logging();
    let config = HarnessConfig::from_env();

    let mut argv = or_exit(Argv::from_stdin());
    argv.set_program_name("bubble_sort");
    or_exit(validate_arg_count(&argv, EXPECTED_ARGS));

    let mut numbers: Vec<i32> = argv.args().map(atoi).collect();
    validate_or_exit(Some(Payload::Ints(&numbers)), &argv);

    debug!("sorting {} numbers {} times", numbers.len(), ROUNDS);
    for _ in 0..ROUNDS {
        bubble_sort(&mut numbers);
    }

    let mut stdout = io::stdout().lock();
    for number in &numbers {
        let _ = write!(stdout, "{} ", number);
    }
    let _ = writeln!(stdout);

    config.input_log().record_argv(&argv);
    ExitCode::SUCCESS
}
