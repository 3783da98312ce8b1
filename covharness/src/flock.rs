use std::fs::File;
use std::path::Path;

use log::info;
use nix::fcntl::{Flock, FlockArg};

use crate::error::{Error, Result};

/// Takes an exclusive advisory lock on `file`, blocking until every other holder released it.
///
/// The lock is released when the returned [`Flock`] is dropped or unlocked.
pub(crate) fn lock_exclusive(file: File, path: &Path) -> Result<Flock<File>> {
    Flock::lock(file, FlockArg::LockExclusiveNonblock)
        .or_else(|(file, _)| {
            info!("waiting for lock on '{}'", path.display());
            Flock::lock(file, FlockArg::LockExclusive)
        })
        .map_err(|(_, reason)| Error::Lock {
            path: path.to_path_buf(),
            reason,
        })
}
