//! The `trace-pc-guard` callbacks of SanitizerCoverage.
//!
//! The runtime calls these without any context pointer, so this is the one place that keeps a
//! process-wide [`GuardRegistry`]. The symbols are exported unmangled with the `sancov` feature.
//! The first successful init registers an `atexit` hook which finalizes the registry into the
//! configured [`CoverageFile`], so returning from `main` and `std::process::exit` both report.
//! It also chains a panic hook doing the same, because with `panic = "abort"` a panic never
//! reaches `atexit`. A panic is treated as the end of the run even if it is caught later.
//!
//! This crate itself must not be compiled with coverage instrumentation, otherwise the callbacks
//! would trace themselves.
//!
//! <https://clang.llvm.org/docs/SanitizerCoverage.html#tracing-pcs-with-guards>

use std::io::{self, Write};
use std::panic;
use std::sync::{Mutex, MutexGuard, Once, PoisonError, TryLockError};

use log::{debug, warn};
use once_cell::sync::OnceCell;

use crate::config::HarnessConfig;
use crate::coverage::{CoverageFile, CoverageSummary, GuardRegistry};
use crate::error::Result;
use crate::exit::fatal;

static REGISTRY: OnceCell<Mutex<GuardRegistry>> = OnceCell::new();
static COVERAGE_FILE: OnceCell<CoverageFile> = OnceCell::new();
static EXIT_HOOK: Once = Once::new();

/// Overrides where coverage is reported on exit. Has to happen before the process ends, and only
/// once; the rejected file is handed back otherwise.
pub fn set_coverage_file(file: CoverageFile) -> std::result::Result<(), CoverageFile> {
    COVERAGE_FILE.set(file)
}

/// The file coverage is reported to, [`HarnessConfig::from_env`] unless overridden.
pub fn coverage_file() -> &'static CoverageFile {
    COVERAGE_FILE.get_or_init(|| HarnessConfig::from_env().coverage_file())
}

/// Finalizes the process-wide registry right away. The exit hook does nothing afterwards.
pub fn finalize() -> Result<Option<CoverageSummary>> {
    match REGISTRY.get() {
        Some(registry) => lock(registry).finalize(coverage_file()),
        None => Ok(None),
    }
}

/// Runs `f` on the process-wide registry, `None` if no guard was ever registered.
pub fn with_registry<R>(f: impl FnOnce(&GuardRegistry) -> R) -> Option<R> {
    REGISTRY.get().map(|registry| f(&*lock(registry)))
}

fn lock(registry: &Mutex<GuardRegistry>) -> MutexGuard<'_, GuardRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn register_exit_hook() {
    EXIT_HOOK.call_once(|| {
        if unsafe { libc::atexit(finalize_at_exit) } != 0 {
            warn!("failed to register the coverage exit hook, coverage will not be reported");
        }

        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            previous(info);
            finalize_at_exit();
        }));
    });
}

extern "C" fn finalize_at_exit() {
    let Some(registry) = REGISTRY.get() else {
        return;
    };

    // exit() or a panic from inside a callback must not deadlock on our own lock
    let mut registry = match registry.try_lock() {
        Ok(registry) => registry,
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        Err(TryLockError::WouldBlock) => return,
    };

    if let Err(err) = registry.finalize(coverage_file()) {
        let _ = writeln!(io::stderr(), "Error: failed to persist coverage: {}", err);
    }
}

/// Called once per instrumented module with its `[start, stop)` range of guard slots.
///
/// # Safety
///
/// `start..stop` must be the writable guard range of a loaded module.
#[cfg_attr(feature = "sancov", no_mangle)]
pub unsafe extern "C" fn __sanitizer_cov_trace_pc_guard_init(start: *mut u32, stop: *mut u32) {
    let registry = REGISTRY.get_or_init(|| Mutex::new(GuardRegistry::new()));
    let discovered = lock(registry).discover_range(start, stop);

    match discovered {
        Ok(true) => {
            debug!("coverage tracking enabled for {} edges", lock(registry).total());
            register_exit_hook();
        }
        Ok(false) => {}
        Err(err) => fatal(err),
    }
}

/// Called on every instrumented edge.
///
/// # Safety
///
/// `guard` must be null or point to a guard slot previously passed to the init callback.
#[cfg_attr(feature = "sancov", no_mangle)]
pub unsafe extern "C" fn __sanitizer_cov_trace_pc_guard(guard: *mut u32) {
    let Some(registry) = REGISTRY.get() else {
        return;
    };

    if let Ok(mut registry) = registry.try_lock() {
        registry.hit_guard(guard);
    }
}
