//! Edge coverage bookkeeping for `-fsanitize-coverage=trace-pc-guard` builds.
//!
//! The instrumentation runtime hands out guard slots initialized to zero. [`GuardRegistry`] gives
//! each slot a 1-based id (0 stays "not registered"), remembers which ids were hit and, once the
//! process ends, persists the share of hit guards to a [`CoverageFile`] that every fuzzer worker
//! overwrites in turn.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::flock::lock_exclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Active,
    Finalized,
}

#[derive(Debug)]
pub struct GuardRegistry {
    state: State,
    hits: Vec<bool>,
}

impl Default for GuardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardRegistry {
    pub const fn new() -> Self {
        GuardRegistry {
            state: State::Uninitialized,
            hits: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of guards registered so far.
    pub fn total(&self) -> u32 {
        // ids are u32, `discover` never grows past that
        self.hits.len() as u32
    }

    pub fn is_hit(&self, id: u32) -> bool {
        id != 0 && self.hits.get(id as usize - 1).copied().unwrap_or(false)
    }

    /// Assigns ids to a range of guard slots.
    ///
    /// Returns `false` without touching anything if the range is empty, if its first slot already
    /// carries an id or if the registry was finalized. Ids continue after the last range that was
    /// registered, so disjoint ranges never share an id.
    pub fn discover(&mut self, guards: &mut [u32]) -> Result<bool> {
        if self.state == State::Finalized || guards.first().map_or(true, |&guard| guard != 0) {
            return Ok(false);
        }

        let first = self.hits.len();
        let end = first
            .checked_add(guards.len())
            .filter(|&end| end <= u32::MAX as usize)
            .ok_or(Error::Allocation {
                requested: guards.len(),
            })?;
        self.hits
            .try_reserve_exact(guards.len())
            .map_err(|_| Error::Allocation {
                requested: guards.len(),
            })?;
        self.hits.resize(end, false);

        for (guard, id) in guards.iter_mut().zip(first as u32 + 1..) {
            *guard = id;
        }

        self.state = State::Active;
        debug!(
            "registered guards {}..={} ({} in total)",
            first + 1,
            end,
            end
        );
        Ok(true)
    }

    /// [`GuardRegistry::discover`] over the raw `[start, stop)` range handed out by the runtime.
    ///
    /// # Safety
    ///
    /// `start..stop` must be a valid, writable range of `u32` slots not aliased elsewhere during
    /// the call.
    pub unsafe fn discover_range(&mut self, start: *mut u32, stop: *mut u32) -> Result<bool> {
        if start.is_null() || stop <= start {
            return Ok(false);
        }

        let len = stop.offset_from(start) as usize;
        self.discover(std::slice::from_raw_parts_mut(start, len))
    }

    /// Marks guard `id` as hit. Unknown ids and registries that are not active are ignored.
    #[inline]
    pub fn hit(&mut self, id: u32) {
        if self.state != State::Active || id == 0 {
            return;
        }

        if let Some(flag) = self.hits.get_mut(id as usize - 1) {
            *flag = true;
        }
    }

    /// [`GuardRegistry::hit`] through the guard slot itself. A null slot is ignored.
    ///
    /// # Safety
    ///
    /// `guard` must be null or point to a readable `u32`.
    #[inline]
    pub unsafe fn hit_guard(&mut self, guard: *const u32) {
        if let Some(&id) = guard.as_ref() {
            self.hit(id);
        }
    }

    /// `None` while no guard is registered.
    pub fn summary(&self) -> Option<CoverageSummary> {
        if self.hits.is_empty() {
            return None;
        }

        Some(CoverageSummary {
            hits: self.hits.iter().filter(|&&hit| hit).count() as u32,
            total: self.total(),
        })
    }

    /// Persists the summary to `results` and releases the hit array.
    ///
    /// Only the first call on an active registry does anything; afterwards the registry ignores
    /// further guards and hits.
    pub fn finalize(&mut self, results: &CoverageFile) -> Result<Option<CoverageSummary>> {
        if self.state != State::Active {
            return Ok(None);
        }

        let summary = self.summary();
        self.state = State::Finalized;
        self.hits = Vec::new();

        match summary {
            Some(summary) => {
                results.write(&summary)?;
                info!(
                    "coverage {}% ({}/{} guards) written to {}",
                    summary,
                    summary.hits,
                    summary.total,
                    results.path().display()
                );
                Ok(Some(summary))
            }
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageSummary {
    pub hits: u32,
    pub total: u32,
}

impl CoverageSummary {
    pub fn percentage(&self) -> f64 {
        100.0 * f64::from(self.hits) / f64::from(self.total)
    }
}

impl fmt::Display for CoverageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.percentage())
    }
}

/// The results file all workers report to. The last worker to finish wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageFile {
    path: PathBuf,
}

impl CoverageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CoverageFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn write(&self, summary: &CoverageSummary) -> Result<()> {
        // truncate only once the lock is held
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        let mut file = lock_exclusive(file, &self.path)?;

        file.set_len(0)?;
        file.write_all(format!("{}\n", summary).as_bytes())?;
        file.flush()?;

        file.unlock().map_err(|(_, reason)| Error::Lock {
            path: self.path.clone(),
            reason,
        })?;
        Ok(())
    }

    /// The last persisted percentage, `None` if the file is empty.
    pub fn read_percentage(&self) -> Result<Option<f64>> {
        let content = fs::read_to_string(&self.path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        content
            .parse::<f64>()
            .map(Some)
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }
}

/// Owns the registry of a process and finalizes it when dropped.
///
/// Create one at the start of `main` and thread [`CoverageGuard::registry`] into whatever drives
/// the guard callbacks.
#[derive(Debug)]
pub struct CoverageGuard {
    registry: GuardRegistry,
    results: CoverageFile,
}

impl CoverageGuard {
    pub fn new(results: CoverageFile) -> Self {
        CoverageGuard {
            registry: GuardRegistry::new(),
            results,
        }
    }

    pub fn registry(&mut self) -> &mut GuardRegistry {
        &mut self.registry
    }

    /// Finalizes now and reports the outcome instead of logging it on drop.
    pub fn finish(mut self) -> Result<Option<CoverageSummary>> {
        self.registry.finalize(&self.results)
    }
}

impl Drop for CoverageGuard {
    fn drop(&mut self) {
        if let Err(err) = self.registry.finalize(&self.results) {
            warn!("failed to persist coverage: {}", err);
        }
    }
}
