use core::fmt::{self, Write};

use heapless::String;

use crate::dose::DoseRate;
use crate::sampler::Phase;

/// Capacity of one OLED text line.
pub const LINE_CAPACITY: usize = 24;

pub type Line = String<LINE_CAPACITY>;

/// Time since start, printed as minutes and seconds with one decimal: `2m 5.3s`.
///
/// Seconds are rounded to the nearest tenth without carrying into the minutes,
/// so 59.96 s prints as `0m 60.0s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Elapsed(pub u64);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.0 / 60_000;
        let tenths = (self.0 % 60_000 + 50) / 100;
        let mut text: String<32> = String::new();
        write!(text, "{}m {}.{}s", minutes, tenths / 10, tenths % 10)?;
        // pad() so callers can right-align it in the console line
        f.pad(&text)
    }
}

/// Plain numeric state handed to reporting sinks once per second.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub uptime_ms: u64,
    pub total: u32,
    pub pulses_in_window: u64,
    pub window_seconds: u32,
    pub phase: Phase,
    pub dose: DoseRate,
    pub missed_ticks: u32,
}

impl Snapshot {
    pub fn elapsed(&self) -> Elapsed {
        Elapsed(self.uptime_ms)
    }

    pub fn is_warm(&self) -> bool {
        self.phase == Phase::SteadyState
    }

    /// Three short lines for the OLED: uptime, pulses per minute, mSv/h.
    /// A value too long for a line is left truncated at the last whole write.
    pub fn display_lines(&self) -> [Line; 3] {
        let mut uptime = Line::new();
        let mut rate = Line::new();
        let mut dose = Line::new();
        let _ = write!(uptime, "{}", self.elapsed());
        let _ = write!(rate, "{}", self.pulses_in_window);
        let _ = write!(dose, "{:.6}", self.dose.milli_sieverts_per_hour());
        [uptime, rate, dose]
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>15}: Tot.pulses: {:8} puls/min: {} mSv/h: {:.6}",
            self.elapsed(),
            self.total,
            self.pulses_in_window,
            self.dose.milli_sieverts_per_hour()
        )?;
        if !self.is_warm() {
            f.write_str(" (warming)")?;
        }
        Ok(())
    }
}
