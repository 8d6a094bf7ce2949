use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::CLICK_US;

/// Piezo buzzer driven by a plain GPIO: one short pulse per click.
pub struct Clicker<P> {
    pin: P,
    length_us: u32,
}

impl<P: OutputPin> Clicker<P> {
    pub fn new(pin: P) -> Self {
        Self::with_length(pin, CLICK_US)
    }

    pub fn with_length(pin: P, length_us: u32) -> Self {
        Self { pin, length_us }
    }

    /// Pin errors are dropped: a missed click is not worth stopping the count for.
    pub async fn click<D: DelayNs>(&mut self, delay: &mut D) {
        let _ = self.pin.set_high();
        delay.delay_us(self.length_us).await;
        let _ = self.pin.set_low();
    }
}
