#![cfg_attr(not(test), no_std)]

pub mod buzzer;
pub mod clock;
pub mod counter;
pub mod dose;
pub mod report;
pub mod sampler;
pub mod ssd1308;
pub mod window;
pub mod writer;

pub use counter::EventCounter;
pub use dose::{DoseRate, DoseRateConverter};
pub use sampler::{Phase, PulseRateSampler, Tick};

pub const WINDOW_SECONDS: usize = 60; // One slot per second of the trailing minute
pub const TICK_MS: u64 = 1000; // Length of one window slot (milliseconds)
pub const BG51_CPM_PER_USV_H: f32 = 5.0; // BG51 sensitivity for Cs-137 (counts per minute per µSv/h)
pub const CONSOLE_EVERY_SECONDS: u32 = 2; // Log on even seconds, redraw the OLED on odd ones
pub const CLICK_US: u32 = 200; // Buzzer pulse length per detected burst (microseconds)
pub const OLED_I2C_ADDRESS: u8 = 0x3C; // Grove OLED 0.96" (SSD1308)
pub const OLED_DATA_BYTE: u8 = 0x40; // I2C control byte prefix for GRAM data
