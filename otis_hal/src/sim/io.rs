//! Digital output simulator.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use otis_common::devices::DigitalOutput;

#[derive(Debug, Default)]
struct DoutShared {
    value: AtomicBool,
    writes: AtomicU32,
}

/// Latching binary output that counts hardware writes.
#[derive(Default)]
pub struct SimDigitalOut {
    shared: Arc<DoutShared>,
}

impl SimDigitalOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observation handle, usable while the output itself is owned elsewhere.
    pub fn observer(&self) -> DoutObserver {
        DoutObserver {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl DigitalOutput for SimDigitalOut {
    fn set_value(&mut self, high: bool) {
        self.shared.value.store(high, Ordering::Release);
        self.shared.writes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shared view of a [`SimDigitalOut`].
#[derive(Clone)]
pub struct DoutObserver {
    shared: Arc<DoutShared>,
}

impl DoutObserver {
    /// Last value written to the output.
    pub fn value(&self) -> bool {
        self.shared.value.load(Ordering::Acquire)
    }

    /// Total number of hardware writes issued.
    pub fn writes(&self) -> u32 {
        self.shared.writes.load(Ordering::Relaxed)
    }
}
