use crate::counter::EventCounter;
use crate::dose::{DoseRate, DoseRateConverter};
use crate::report::Snapshot;
use crate::window::RollingWindow;
use crate::WINDOW_SECONDS;

/// Where the sampler is in filling its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No tick has happened yet.
    Idle,
    /// Fewer than a full window of seconds recorded; window sums undercount.
    Warming { seconds: u32 },
    SteadyState,
}

/// Outcome of closing one or more seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Pulses counted since the previous tick.
    pub delta: u32,
    /// Seconds closed by this call.
    pub elapsed: u32,
    /// Seconds zero-filled because the consumer fell behind.
    pub missed: u32,
}

/// Rolling pulse-rate statistics over an `N` second window.
///
/// Borrows the shared [`EventCounter`] that the edge handler increments and
/// owns everything else. Only the consumer loop touches the sampler itself.
pub struct PulseRateSampler<'a, const N: usize = WINDOW_SECONDS> {
    counter: &'a EventCounter,
    window: RollingWindow<N>,
    last_count: u32,
    ticks: u32,
    missed_ticks: u32,
    new_second: bool,
    converter: DoseRateConverter,
}

impl<'a, const N: usize> PulseRateSampler<'a, N> {
    pub fn new(counter: &'a EventCounter) -> Self {
        Self::with_converter(counter, DoseRateConverter::bg51())
    }

    pub fn with_converter(counter: &'a EventCounter, converter: DoseRateConverter) -> Self {
        Self {
            counter,
            window: RollingWindow::new(),
            last_count: counter.load(),
            ticks: 0,
            missed_ticks: 0,
            new_second: false,
            converter,
        }
    }

    /// Same as [`EventCounter::on_event`]; for callers that only hold the sampler.
    #[inline]
    pub fn on_event(&self) {
        self.counter.on_event();
    }

    /// Close the current second.
    pub fn on_tick(&mut self) -> Tick {
        self.advance(1)
    }

    /// Close `seconds` whole seconds at once.
    ///
    /// All pulses seen since the last tick land in the newest slot. The
    /// seconds before it are recorded as empty and counted as missed; they
    /// are never corrected afterwards.
    pub fn advance(&mut self, seconds: u32) -> Tick {
        if seconds == 0 {
            return Tick::default();
        }

        // Single atomic load; the edge handler is never held off longer than that.
        let now = self.counter.load();
        let delta = now.wrapping_sub(self.last_count);
        self.last_count = now;

        let missed = seconds - 1;
        // Gaps longer than the window only need to clear it once.
        let gap = (missed as usize).min(N);
        for _ in 0..gap {
            self.window.push(0);
        }
        self.window.push(delta);

        self.ticks = self.ticks.saturating_add(seconds);
        self.missed_ticks = self.missed_ticks.saturating_add(missed);
        self.new_second = true;

        Tick {
            delta,
            elapsed: seconds,
            missed,
        }
    }

    /// Raw counter value, wrapping at `u32::MAX`.
    pub fn total_events(&self) -> u32 {
        self.counter.load()
    }

    /// Pulses recorded in the trailing window. Zero before the first tick.
    pub fn pulses_in_window(&self) -> u64 {
        self.window.sum()
    }

    /// Pulses per minute. Only a true rate once [`Self::is_warm`] holds.
    pub fn rate_per_minute(&self) -> u64 {
        self.pulses_in_window()
    }

    pub fn dose_rate(&self) -> DoseRate {
        self.converter
            .dose_rate(self.pulses_in_window(), self.window_seconds())
    }

    /// Seconds of history currently backing the window sum.
    pub fn window_seconds(&self) -> u32 {
        self.ticks.min(N as u32)
    }

    pub fn phase(&self) -> Phase {
        match self.ticks {
            0 => Phase::Idle,
            seconds if (seconds as usize) < N => Phase::Warming { seconds },
            _ => Phase::SteadyState,
        }
    }

    pub fn is_warm(&self) -> bool {
        self.phase() == Phase::SteadyState
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn missed_ticks(&self) -> u32 {
        self.missed_ticks
    }

    /// Returns true once after every tick.
    pub fn take_new_second(&mut self) -> bool {
        core::mem::replace(&mut self.new_second, false)
    }

    pub fn window(&self) -> &RollingWindow<N> {
        &self.window
    }

    /// Stop counting edges. The window keeps its history and ticks still work.
    pub fn stop(&mut self) {
        self.counter.stop();
    }

    pub fn snapshot(&self, uptime_ms: u64) -> Snapshot {
        Snapshot {
            uptime_ms,
            total: self.total_events(),
            pulses_in_window: self.pulses_in_window(),
            window_seconds: self.window_seconds(),
            phase: self.phase(),
            dose: self.dose_rate(),
            missed_ticks: self.missed_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(counter: &EventCounter, n: u32) {
        for _ in 0..n {
            counter.on_event();
        }
    }

    #[test]
    fn idle_reads_are_zero() {
        let counter = EventCounter::new();
        let sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        assert_eq!(sampler.phase(), Phase::Idle);
        assert_eq!(sampler.pulses_in_window(), 0);
        assert_eq!(sampler.dose_rate(), DoseRate::ZERO);
        assert_eq!(sampler.window_seconds(), 0);
    }

    #[test]
    fn warm_up_boundary() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        for _ in 0..59 {
            sampler.on_tick();
        }
        assert_eq!(sampler.phase(), Phase::Warming { seconds: 59 });
        assert!(!sampler.is_warm());
        sampler.on_tick();
        assert_eq!(sampler.phase(), Phase::SteadyState);
        assert!(sampler.is_warm());
    }

    #[test]
    fn quiet_two_minutes() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        for _ in 0..120 {
            let tick = sampler.on_tick();
            assert_eq!(tick.delta, 0);
            assert_eq!(tick.missed, 0);
        }
        assert_eq!(sampler.pulses_in_window(), 0);
        assert_eq!(sampler.dose_rate(), DoseRate::ZERO);
        assert_eq!(sampler.missed_ticks(), 0);
    }

    #[test]
    fn one_pulse_per_second() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        for _ in 0..60 {
            counter.on_event();
            assert_eq!(sampler.on_tick().delta, 1);
        }
        assert_eq!(sampler.pulses_in_window(), 60);
        assert_eq!(sampler.rate_per_minute(), 60);

        // Steady input keeps the full window at the same value.
        for _ in 0..30 {
            counter.on_event();
            sampler.on_tick();
        }
        assert_eq!(sampler.pulses_in_window(), 60);
    }

    #[test]
    fn burst_lands_in_one_slot() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        pulse(&counter, 1000);
        let tick = sampler.on_tick();
        assert_eq!(tick.delta, 1000);
        assert_eq!(sampler.window().latest(), Some(1000));
        assert_eq!(sampler.pulses_in_window(), 1000);
        assert_eq!(sampler.total_events(), 1000);
    }

    #[test]
    fn counter_wrap_gives_small_delta() {
        let counter = EventCounter::starting_at(u32::MAX - 2);
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        pulse(&counter, 5);
        assert_eq!(sampler.total_events(), 2);
        assert_eq!(sampler.on_tick().delta, 5);
        assert_eq!(sampler.pulses_in_window(), 5);
    }

    #[test]
    fn queries_are_idempotent() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        pulse(&counter, 3);
        sampler.on_tick();
        assert_eq!(sampler.total_events(), sampler.total_events());
        assert_eq!(sampler.pulses_in_window(), sampler.pulses_in_window());
        assert_eq!(sampler.dose_rate(), sampler.dose_rate());
    }

    #[test]
    fn missed_seconds_are_zero_filled() {
        let counter = EventCounter::new();
        let mut sampler = PulseRateSampler::<'_, 5>::new(&counter);
        pulse(&counter, 2);
        sampler.on_tick();
        pulse(&counter, 7);
        let tick = sampler.advance(3);
        assert_eq!(
            tick,
            Tick {
                delta: 7,
                elapsed: 3,
                missed: 2
            }
        );
        assert_eq!(sampler.ticks(), 4);
        assert_eq!(sampler.missed_ticks(), 2);
        assert_eq!(sampler.pulses_in_window(), 9);

        let mut history = [u32::MAX; 4];
        for (slot, value) in history.iter_mut().zip(sampler.window().iter()) {
            *slot = value;
        }
        assert_eq!(history, [2, 0, 0, 7]);
    }

    #[test]
    fn gap_longer_than_window_keeps_only_latest_delta() {
        let counter = EventCounter::new();
        let mut sampler = PulseRateSampler::<'_, 4>::new(&counter);
        pulse(&counter, 9);
        sampler.on_tick();
        pulse(&counter, 4);
        let tick = sampler.advance(100);
        assert_eq!(tick.missed, 99);
        assert_eq!(sampler.pulses_in_window(), 4);
        assert_eq!(sampler.phase(), Phase::SteadyState);
    }

    #[test]
    fn advance_zero_changes_nothing() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        pulse(&counter, 4);
        assert_eq!(sampler.advance(0), Tick::default());
        assert_eq!(sampler.phase(), Phase::Idle);
        assert!(!sampler.take_new_second());
        // The pulses are still pending for the next real tick.
        assert_eq!(sampler.on_tick().delta, 4);
    }

    #[test]
    fn new_second_flag_is_consumed_once() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        sampler.on_tick();
        assert!(sampler.take_new_second());
        assert!(!sampler.take_new_second());
    }

    #[test]
    fn stop_ignores_later_edges() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        sampler.on_event();
        sampler.stop();
        sampler.on_event();
        assert_eq!(sampler.on_tick().delta, 1);
        assert_eq!(sampler.total_events(), 1);
    }

    #[test]
    fn dose_uses_elapsed_window() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler =
            PulseRateSampler::with_converter(&counter, DoseRateConverter::new(10.0));
        pulse(&counter, 5);
        for _ in 0..30 {
            sampler.on_tick();
        }
        // 5 pulses in 30 s is 10 cpm, i.e. 1 µSv/h at 10 cpm per µSv/h.
        let dose = sampler.dose_rate().micro_sieverts_per_hour();
        assert!((dose - 1.0).abs() < 1e-6);
    }

    #[test]
    fn snapshot_mirrors_queries() {
        let counter = EventCounter::new();
        let mut sampler: PulseRateSampler = PulseRateSampler::new(&counter);
        pulse(&counter, 12);
        sampler.on_tick();
        let snapshot = sampler.snapshot(1_500);
        assert_eq!(snapshot.uptime_ms, 1_500);
        assert_eq!(snapshot.total, 12);
        assert_eq!(snapshot.pulses_in_window, 12);
        assert_eq!(snapshot.window_seconds, 1);
        assert_eq!(snapshot.phase, Phase::Warming { seconds: 1 });
        assert_eq!(snapshot.dose, sampler.dose_rate());
    }
}
