//! PWM driver for the light string.
//!
//! The string is switched by a logic-level N-MOSFET whose gate is driven
//! by TIM2 channel 1. Duty cycle sets the perceived brightness.
//!
//! # Hardware Design
//!
//! - Q1 (N-MOSFET): low-side switch for the LED string
//! - PA0 (TIM2_CH1): gate drive through 100Ω, 100kΩ pull-down
//!
//! With the channel disabled the pin returns to its pull-down, so the
//! string is fully off while dormant.

use embassy_stm32::{peripherals::TIM2, timer::simple_pwm::SimplePwm};
use fairy_lights::Light;

/// Controller for the single PWM-driven LED string.
pub struct StringController {
    /// TIM2 in PWM mode, channel 1 drives the MOSFET gate
    pwm: SimplePwm<'static, TIM2>,
    /// Timer counts per PWM period
    max_duty: u16,
    /// Last 8-bit duty written
    duty: u8,
}

impl StringController {
    /// Creates a new StringController with the output enabled at duty 0.
    ///
    /// # Arguments
    ///
    /// * `pwm` - TIM2 configured with channel 1 on the gate pin
    pub fn new(mut pwm: SimplePwm<'static, TIM2>) -> Self {
        let max_duty = pwm.max_duty_cycle();
        pwm.ch1().set_duty_cycle(0);
        pwm.ch1().enable();
        Self {
            pwm,
            max_duty,
            duty: 0,
        }
    }

    /// Scales an 8-bit duty to timer counts.
    fn counts(&self, duty: u8) -> u16 {
        (u32::from(duty) * u32::from(self.max_duty) / u32::from(u8::MAX)) as u16
    }
}

impl Light for StringController {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        let counts = self.counts(duty);
        self.pwm.ch1().set_duty_cycle(counts);
    }

    fn enable(&mut self) {
        let counts = self.counts(self.duty);
        let mut ch1 = self.pwm.ch1();
        ch1.set_duty_cycle(counts);
        ch1.enable();
    }

    fn disable(&mut self) {
        let mut ch1 = self.pwm.ch1();
        ch1.set_duty_cycle(0);
        ch1.disable();
    }
}
