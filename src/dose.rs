use crate::BG51_CPM_PER_USV_H;

/// Equivalent dose rate, stored in µSv/h.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DoseRate(f32);

impl DoseRate {
    pub const ZERO: Self = Self(0.0);

    pub fn from_micro_sieverts_per_hour(value: f32) -> Self {
        Self(value)
    }

    pub fn micro_sieverts_per_hour(self) -> f32 {
        self.0
    }

    pub fn milli_sieverts_per_hour(self) -> f32 {
        self.0 / 1000.0
    }
}

/// Converts a pulse count observed over some number of seconds into a dose
/// rate using a fixed detector calibration (counts per minute per µSv/h).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DoseRateConverter {
    cpm_per_usv_h: f32,
}

impl DoseRateConverter {
    pub const fn new(cpm_per_usv_h: f32) -> Self {
        Self { cpm_per_usv_h }
    }

    /// Teviso BG51 calibration.
    pub const fn bg51() -> Self {
        Self::new(BG51_CPM_PER_USV_H)
    }

    pub fn cpm_per_usv_h(&self) -> f32 {
        self.cpm_per_usv_h
    }

    /// Counts per minute, scaled up from a shorter observation.
    pub fn counts_per_minute(count: u64, seconds: u32) -> f32 {
        if seconds == 0 {
            return 0.0;
        }
        count as f32 * 60.0 / seconds as f32
    }

    pub fn dose_rate(&self, count: u64, seconds: u32) -> DoseRate {
        DoseRate(Self::counts_per_minute(count, seconds) / self.cpm_per_usv_h)
    }
}

impl Default for DoseRateConverter {
    fn default() -> Self {
        Self::bg51()
    }
}
