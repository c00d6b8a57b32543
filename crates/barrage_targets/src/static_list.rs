use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{Target, TargetError, Targeter, TargeterProvider};

/// Round-robins over a fixed list of targets, forever.
///
/// The list is read-only after construction and the cursor is a single atomic
/// counter, so any number of callers can share it without locking.
#[derive(Debug)]
pub struct StaticTargeter {
    targets: Vec<Target>,
    cursor: AtomicU64,
}

impl StaticTargeter {
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets,
            cursor: AtomicU64::new(0),
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

impl FromIterator<Target> for StaticTargeter {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Targeter for StaticTargeter {
    fn next(&self, target: Option<&mut Target>) -> Result<(), TargetError> {
        let target = target.ok_or(TargetError::NilTarget)?;
        if self.targets.is_empty() {
            return Err(TargetError::NoTargets);
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.targets.len() as u64;
        *target = self.targets[i as usize].clone();
        Ok(())
    }
}

impl TargeterProvider for StaticTargeter {
    fn new_targeter(self: Arc<Self>) -> Arc<dyn Targeter> {
        self
    }
}
