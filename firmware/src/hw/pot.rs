//! Frequency potentiometer on ADC1.
//!
//! The wiper is read with 10-bit resolution so samples land in the same
//! `0..=1023` range the mapper expects, one blocking conversion per poll.

use embassy_stm32::adc::{Adc, AnyAdcChannel, Resolution, SampleTime};
use embassy_stm32::peripherals::ADC1;
use flicker_core::mapper::AdcSample;

/// Blocking reader for the potentiometer wiper.
pub struct Potentiometer<'d> {
    adc: Adc<'d, ADC1>,
    channel: AnyAdcChannel<ADC1>,
    discard_next: bool,
}

impl<'d> Potentiometer<'d> {
    /// Configures the converter for 10-bit reads of `channel`.
    pub fn new(mut adc: Adc<'d, ADC1>, channel: AnyAdcChannel<ADC1>) -> Self {
        adc.set_resolution(Resolution::BITS10);
        adc.set_sample_time(SampleTime::CYCLES79_5);
        Self {
            adc,
            channel,
            discard_next: true,
        }
    }

    /// Takes one conversion. The first read after power-up is thrown away
    /// while the sampling capacitor settles.
    pub fn sample(&mut self) -> AdcSample {
        if self.discard_next {
            let _ = self.adc.blocking_read(&mut self.channel);
            self.discard_next = false;
        }
        AdcSample::new(self.adc.blocking_read(&mut self.channel))
    }
}
