use std::error::Error;
use std::sync::Arc;

use barrage_logging::barrage_debug;

use crate::{Target, TargetError};

/// A pull-based source of targets.
///
/// Implementations must be safe for concurrent use: every call to `next` takes
/// exactly one target, whatever the number of concurrent callers.
pub trait Targeter: Send + Sync {
    /// Writes the next target into `target`.
    ///
    /// Returns [`TargetError::NilTarget`] when no output slot is given and
    /// [`TargetError::NoTargets`] once a finite source is exhausted.
    fn next(&self, target: Option<&mut Target>) -> Result<(), TargetError>;

    /// Outcome of the request built from a previously returned target.
    ///
    /// The built-in targeters ignore it.
    fn result(&self, body: &[u8], status: u16, err: Option<&(dyn Error + 'static)>) {
        let _ = (body, status, err);
    }
}

/// Produces the [`Targeter`] used for one run.
pub trait TargeterProvider: Send + Sync {
    /// Stateless providers hand back themselves, so one provider can back
    /// several runs.
    fn new_targeter(self: Arc<Self>) -> Arc<dyn Targeter>;
}

/// Eagerly reads every target out of `provider`.
///
/// Stops at the first [`TargetError::NoTargets`]; any other error is returned
/// as is. A source yielding no target at all is reported as
/// [`TargetError::NoTargets`] rather than an empty list.
pub fn read_all_targets<P>(provider: Arc<P>) -> Result<Vec<Target>, TargetError>
where
    P: TargeterProvider + ?Sized,
{
    let targeter = P::new_targeter(provider);
    let mut targets = Vec::new();
    loop {
        let mut target = Target::default();
        match targeter.next(Some(&mut target)) {
            Ok(()) => targets.push(target),
            Err(TargetError::NoTargets) => break,
            Err(err) => return Err(err),
        }
    }

    if targets.is_empty() {
        return Err(TargetError::NoTargets);
    }
    barrage_debug!("read {} targets", targets.len());
    Ok(targets)
}
