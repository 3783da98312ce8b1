use std::env;
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{self, Config};

/// Logs to stderr only. `default` is used when `RUST_LOG` is unset or invalid.
pub fn config_default(default: LevelFilter) -> std::io::Result<Config> {
    Config::builder()
        .appender(appender_stderr("stderr"))
        .build(Root::builder().appender("stderr").build(log_level(default)))
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))
}

/// Logs to stderr and mirrors everything into the file at `path`.
pub fn config_to_file<P>(path: P, default: LevelFilter) -> std::io::Result<Config>
where
    P: AsRef<Path>,
{
    Config::builder()
        .appender(appender_stderr("stderr"))
        .appender(appender_tofile("tofile", path)?)
        .build(
            Root::builder()
                .appender("stderr")
                .appender("tofile")
                .build(log_level(default)),
        )
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))
}

fn appender_stderr<S>(name: S) -> Appender
where
    S: AsRef<str>,
{
    Appender::builder().build(
        name.as_ref(),
        Box::new(
            ConsoleAppender::builder()
                .target(log4rs::append::console::Target::Stderr)
                .encoder(Box::new(PatternEncoder::new(
                    "{h({d(%Y-%m-%dT%H:%M:%S%Z)}\t{m}{n})}",
                )))
                .build(),
        ),
    )
}

fn appender_tofile<S, P>(name: S, log_path: P) -> std::io::Result<Appender>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d}\t{l}\t{m}{n}")))
        .build(log_path)?;

    Ok(Appender::builder().build(name.as_ref(), Box::new(file)))
}

fn log_level(default: LevelFilter) -> LevelFilter {
    env::var("RUST_LOG")
        .ok()
        .and_then(|level| LevelFilter::from_str(&level).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_builds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_to_file(dir.path().join("covharness.log"), LevelFilter::Info).unwrap();
        assert_eq!(config.appenders().len(), 2);
    }

    #[test]
    fn default_config_builds() {
        let config = config_default(LevelFilter::Warn).unwrap();
        assert_eq!(config.appenders().len(), 1);
    }
}
