use std::env;
use std::path::{Path, PathBuf};

use crate::coverage::CoverageFile;
use crate::record::InputLog;

/// Maximum number of bytes the argv buffer holds, including room for terminators.
pub const MAX_CMDLINE_LEN: usize = 100_000;
/// Maximum number of argv slots, including the program name slot.
pub const MAX_CMDLINE_PAR: usize = 1000;

pub const DEFAULT_INPUT_LOG: &str = "./input.txt";
pub const DEFAULT_COVERAGE_FILE: &str = "/tmp/c2rust_cov.txt";

pub const ENV_INPUT_LOG: &str = "COVHARNESS_INPUT_LOG";
pub const ENV_COVERAGE_FILE: &str = "COVHARNESS_COVERAGE_FILE";

/// Locations of the two files shared between all fuzzer workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub input_log: PathBuf,
    pub coverage_file: PathBuf,
}

impl HarnessConfig {
    pub fn new(input_log: impl Into<PathBuf>, coverage_file: impl Into<PathBuf>) -> Self {
        HarnessConfig {
            input_log: input_log.into(),
            coverage_file: coverage_file.into(),
        }
    }

    pub fn from_env() -> Self {
        let input_log = env::var_os(ENV_INPUT_LOG)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_LOG));
        let coverage_file = env::var_os(ENV_COVERAGE_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COVERAGE_FILE));

        HarnessConfig::new(input_log, coverage_file)
    }

    /// Same as [`HarnessConfig::new`] with both files placed inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        HarnessConfig::new(dir.join("input.txt"), dir.join("c2rust_cov.txt"))
    }

    pub fn input_log(&self) -> InputLog {
        InputLog::new(&self.input_log)
    }

    pub fn coverage_file(&self) -> CoverageFile {
        CoverageFile::new(&self.coverage_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_places_both_files() {
        let config = HarnessConfig::in_dir(Path::new("/work"));
        assert_eq!(config.input_log, PathBuf::from("/work/input.txt"));
        assert_eq!(config.coverage_file, PathBuf::from("/work/c2rust_cov.txt"));
        assert_eq!(config.input_log().path(), Path::new("/work/input.txt"));
        assert_eq!(config.coverage_file().path(), Path::new("/work/c2rust_cov.txt"));
    }
}
