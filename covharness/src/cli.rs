use std::io::{self, Write};
use std::process::ExitCode;

use clap::{arg, crate_name, crate_version, Arg, ArgMatches, Command};
use log::{error, info, LevelFilter};

use crate::argv::Argv;
use crate::config::HarnessConfig;
use crate::error::{Error, Result};
use crate::validate::{validate, Payload};

fn create_app() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Inspects the inputs and coverage reports of covharness fuzz targets")
        .subcommand_required(true)
        .subcommands(vec![
            Command::new("tokenize")
                .about("Splits stdin into arguments like a target does and prints argc and one argument per line"),
            Command::new("check")
                .about("Validates the arguments on stdin against a payload. Exits like a target on mismatch")
                .arg(arg!(<kind> "Kind of payload").value_parser(["ints", "int", "bytes"]))
                .arg(
                    Arg::new("values")
                        .help("The payload, integers for ints and int, text for bytes")
                        .num_args(0..)
                        .allow_hyphen_values(true)
                        .trailing_var_arg(true),
                ),
            Command::new("coverage").about("Prints the last persisted coverage percentage"),
            Command::new("records").about("Prints the number of records in the input log"),
        ])
}

pub fn main() -> ExitCode {
    match crate::log::config_default(LevelFilter::Info).map(log4rs::init_config) {
        Ok(Ok(_handle)) => {}
        Ok(Err(err)) => {
            eprintln!("Failed to init logging: {:?}", err);
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("Failed to configure logging: {:?}", err);
            return ExitCode::FAILURE;
        }
    }

    let matches = create_app().get_matches();
    let config = HarnessConfig::from_env();

    let result = match matches.subcommand() {
        Some(("tokenize", _)) => tokenize(),
        Some(("check", matches)) => check(matches),
        Some(("coverage", _)) => coverage(&config),
        Some(("records", _)) => records(&config),
        _ => unreachable!("a subcommand is required"),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn tokenize() -> Result<ExitCode> {
    let argv = Argv::from_stdin()?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", argv.argc())?;
    for arg in argv.args() {
        stdout.write_all(arg)?;
        stdout.write_all(b"\n")?;
    }

    Ok(ExitCode::SUCCESS)
}

fn check(matches: &ArgMatches) -> Result<ExitCode> {
    let kind = matches
        .get_one::<String>("kind")
        .map(String::as_str)
        .unwrap_or("ints");
    let values: Vec<&str> = matches
        .get_many::<String>("values")
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default();

    let argv = Argv::from_stdin()?;

    let valid = match kind {
        "bytes" => {
            let text = values.join(" ");
            validate(Some(Payload::Bytes(text.as_bytes())), &argv)
        }
        _ => {
            let Some(numbers) = parse_ints(&values) else {
                error!("payload values must be 32-bit integers");
                return Ok(ExitCode::FAILURE);
            };
            match (kind, numbers.as_slice()) {
                ("int", [number]) => validate(Some(Payload::Int(*number)), &argv),
                ("int", _) => {
                    error!("int payload takes exactly one value");
                    return Ok(ExitCode::FAILURE);
                }
                _ => validate(Some(Payload::Ints(&numbers)), &argv),
            }
        }
    };

    if !valid {
        return Err(Error::Validation);
    }

    info!("payload matches {} arguments", argv.argc() - 1);
    Ok(ExitCode::SUCCESS)
}

fn parse_ints(values: &[&str]) -> Option<Vec<i32>> {
    values.iter().map(|value| value.parse().ok()).collect()
}

fn coverage(config: &HarnessConfig) -> Result<ExitCode> {
    let file = config.coverage_file();
    match file.read_percentage()? {
        Some(percentage) => println!("{:.2}", percentage),
        None => info!("{} holds no coverage report", file.path().display()),
    }
    Ok(ExitCode::SUCCESS)
}

fn records(config: &HarnessConfig) -> Result<ExitCode> {
    println!("{}", config.input_log().read_records()?.len());
    Ok(ExitCode::SUCCESS)
}
