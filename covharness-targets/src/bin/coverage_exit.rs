//! Registers four guards by hand, hits the third and then ends the process the requested way.
//! Every way has to leave `25.00` in the coverage results file.

use std::process::{self, ExitCode};

use clap::{arg, Command};
use covharness::sancov::{__sanitizer_cov_trace_pc_guard, __sanitizer_cov_trace_pc_guard_init};
use covharness_targets::init_logging;

pub fn main() -> ExitCode {
    init_logging();

    let matches = Command::new("coverage_exit")
        .about("Hits one of four guards, then returns, exits or panics")
        .arg(arg!(<mode> "How the process ends").value_parser(["return", "exit", "panic"]))
        .get_matches();

    // the runtime hands out guard ranges that live as long as the process
    let guards: &'static mut [u32] = Box::leak(vec![0u32; 4].into_boxed_slice());
    let range = guards.as_mut_ptr_range();
    unsafe {
        __sanitizer_cov_trace_pc_guard_init(range.start, range.end);
        __sanitizer_cov_trace_pc_guard(range.start.add(2));
    }

    match matches.get_one::<String>("mode").map(String::as_str) {
        Some("exit") => process::exit(0),
        Some("panic") => panic!("target crashed"),
        _ => ExitCode::SUCCESS,
    }
}
