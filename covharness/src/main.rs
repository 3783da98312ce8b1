use std::process::ExitCode;

pub fn main() -> ExitCode {
    covharness::cli::main()
}
