use crate::TICK_MS;

/// Detects one-second boundaries against a monotonic millisecond clock.
///
/// The next boundary always moves in whole periods from the origin, so a late
/// poll never shifts later boundaries and no drift builds up.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickClock {
    origin_ms: u64,
    next_ms: u64,
    period_ms: u64,
}

impl TickClock {
    pub const fn new(origin_ms: u64) -> Self {
        Self::with_period(origin_ms, TICK_MS)
    }

    /// Panics if `period_ms` is zero.
    pub const fn with_period(origin_ms: u64, period_ms: u64) -> Self {
        assert!(period_ms > 0, "tick period must be non-zero");
        Self {
            origin_ms,
            next_ms: origin_ms + period_ms,
            period_ms,
        }
    }

    /// Number of boundaries crossed since the previous poll.
    pub fn poll(&mut self, now_ms: u64) -> u32 {
        if now_ms < self.next_ms {
            return 0;
        }
        let crossed = (now_ms - self.next_ms) / self.period_ms + 1;
        self.next_ms += crossed * self.period_ms;
        u32::try_from(crossed).unwrap_or(u32::MAX)
    }

    pub fn uptime_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.origin_ms)
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}
