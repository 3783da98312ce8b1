//! Shared harness for small fuzz targets.
//!
//! A target materializes its command line from stdin with [`argv::Argv`], checks that the data it
//! built from those arguments agrees with them using [`validate::validate`], and records accepted
//! inputs in an [`record::InputLog`]. Independently, [`coverage::GuardRegistry`] and the
//! [`sancov`] callbacks count which instrumented edges ran and report a percentage on exit.

pub mod argv;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod error;
pub mod exit;
mod flock;
pub mod log;
pub mod record;
pub mod sancov;
pub mod validate;

pub use argv::Argv;
pub use config::HarnessConfig;
pub use error::{Error, Result};
pub use validate::{validate, Payload};
