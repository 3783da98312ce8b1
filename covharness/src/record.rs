//! Best-effort audit log of accepted inputs, shared by all fuzzer workers.
//!
//! Every record is one line of space separated values. A record is written with a single call
//! while the file is `flock`ed, so concurrent workers interleave whole lines only.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{trace, warn};

use crate::argv::Argv;
use crate::error::Result;
use crate::flock::lock_exclusive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLog {
    path: PathBuf,
}

impl InputLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        InputLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Appends the arguments of `argv`. Failures are logged and otherwise ignored.
    pub fn record_argv(&self, argv: &Argv) {
        if let Err(err) = self.try_record_argv(argv) {
            warn!("failed to record input to {}: {}", self.path.display(), err);
        }
    }

    /// Appends `numbers` in decimal. Failures are logged and otherwise ignored.
    pub fn record_ints(&self, numbers: &[i32]) {
        if let Err(err) = self.try_record_ints(numbers) {
            warn!("failed to record input to {}: {}", self.path.display(), err);
        }
    }

    pub fn try_record_argv(&self, argv: &Argv) -> Result<()> {
        let mut line = argv.args().collect::<Vec<_>>().join(&b' ');
        line.push(b'\n');
        self.append(&line)
    }

    pub fn try_record_ints(&self, numbers: &[i32]) -> Result<()> {
        self.append(format!("{}\n", numbers.iter().join(" ")).as_bytes())
    }

    /// All records currently in the log, without their line terminators.
    pub fn read_records(&self) -> Result<Vec<Vec<u8>>> {
        let content = fs::read(&self.path)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let body = content.strip_suffix(b"\n").unwrap_or(&content[..]);
        Ok(body
            .split(|&byte| byte == b'\n')
            .map(<[u8]>::to_vec)
            .collect())
    }

    fn append(&self, record: &[u8]) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut file = lock_exclusive(file, &self.path)?;

        file.write_all(record)?;
        trace!("recorded {} bytes to {}", record.len(), self.path.display());

        // dropping the lock releases it before the file is closed
        Ok(())
    }
}
