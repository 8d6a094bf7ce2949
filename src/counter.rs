use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Raw pulse counter shared between the edge handler and the sampling loop.
///
/// The edge handler is the only writer. The counter wraps from `u32::MAX`
/// back to 0; readers diff successive values with `wrapping_sub` so the
/// per-second deltas stay correct across the wrap.
#[derive(Debug)]
pub struct EventCounter {
    count: AtomicU32,
    enabled: AtomicBool,
}

impl EventCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            enabled: AtomicBool::new(true),
        }
    }

    /// Starts from an arbitrary raw value. Mostly useful for exercising the wrap.
    pub const fn starting_at(count: u32) -> Self {
        Self {
            count: AtomicU32::new(count),
            enabled: AtomicBool::new(true),
        }
    }

    /// Record one detected edge. Safe to call from interrupt context:
    /// a single atomic add, no locking, no allocation.
    #[inline]
    pub fn on_event(&self) {
        if self.enabled.load(Ordering::Relaxed) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current raw value.
    #[inline]
    pub fn load(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Ignore all further edges. Called from the consumer side only.
    pub fn stop(&self) {
        self.enabled.store(false, Ordering::Release);
    }
}

impl Default for EventCounter {
    fn default() -> Self {
        Self::new()
    }
}
