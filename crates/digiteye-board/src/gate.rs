//! At-most-one outstanding prediction.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared trigger state. Clones observe the same flag, so a front end can
/// render the classify control as disabled while a request is in flight.
#[derive(Debug, Clone, Default)]
pub struct ClassifyGate {
    busy: Arc<AtomicBool>,
}

impl ClassifyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the trigger, or `None` if a prediction is already outstanding.
    pub fn try_acquire(&self) -> Option<ClassifyPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ClassifyPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of one request; releases the gate on drop.
#[derive(Debug)]
pub struct ClassifyPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for ClassifyPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
