//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and peripheral initialization
//! for the fairy light string controller.
//!
//! # Pin Assignments
//!
//! ## Light String
//! - **PA0**: TIM2_CH1 - PWM gate drive for the string MOSFET
//!
//! ## User Input
//! - **PA1**: BUTTON_N - Active-low push-button to GND, internal pull-up,
//!   EXTI line 1
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use core::convert::Infallible;

use cortex_m::peripheral::SCB;
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{OutputType, Pull},
    time::Hertz,
    timer::{
        low_level::CountingMode,
        simple_pwm::{PwmPin, SimplePwm},
    },
    wdg::IndependentWatchdog,
};
use embedded_hal::digital::v2::InputPin;
use fairy_lights::Button;

use crate::power::{PowerController, RESTART_TIMEOUT_US};
use crate::string_controller::StringController;

/// PWM carrier frequency for the light string.
const PWM_FREQ_HZ: u32 = 500;

/// Push-button on an EXTI-capable pin.
///
/// The level is sampled once per control tick; the falling edge is only
/// awaited (and so only armed) while the string is dormant.
pub struct ButtonInput {
    exti: ExtiInput<'static>,
}

impl ButtonInput {
    pub fn new(exti: ExtiInput<'static>) -> Self {
        Self { exti }
    }
}

impl InputPin for ButtonInput {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.exti.is_high())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self.exti.is_low())
    }
}

impl Button for ButtonInput {
    async fn wait_for_press(&mut self) {
        self.exti.wait_for_falling_edge().await;
    }
}

/// Top-level peripheral container for the light string controller.
///
/// Owns all hardware controllers and provides initialization
/// from STM32 peripheral singleton.
pub struct Peripherals {
    /// Sleep depth and restart control
    pub pwr_ctrl: PowerController,
    /// PWM-driven LED string
    pub str_ctrl: StringController,
    /// Mode button
    pub button: ButtonInput,
}

impl Peripherals {
    /// Initializes all peripherals from STM32 peripheral singleton.
    ///
    /// # Initial States
    ///
    /// - PA0 (TIM2_CH1): PWM enabled at duty 0
    /// - PA1 (BUTTON_N): input with pull-up
    /// - IWDG: configured, not started
    ///
    /// # Arguments
    ///
    /// * `p` - STM32 peripheral singleton from embassy_stm32::init()
    /// * `scb` - Cortex-M system control block, for sleep depth control
    pub fn new(p: embassy_stm32::Peripherals, scb: SCB) -> Self {
        let pwm = SimplePwm::new(
            p.TIM2,
            Some(PwmPin::new(p.PA0, OutputType::PushPull)),
            None,
            None,
            None,
            Hertz::hz(PWM_FREQ_HZ),
            CountingMode::EdgeAlignedUp,
        );

        Self {
            pwr_ctrl: PowerController::new(
                scb,
                IndependentWatchdog::new(p.IWDG, RESTART_TIMEOUT_US),
            ),
            str_ctrl: StringController::new(pwm),
            button: ButtonInput::new(ExtiInput::new(p.PA1, p.EXTI1, Pull::Up)),
        }
    }
}
