//! Hardware seams and the control loop.
//!
//! The firmware implements [`Light`], [`Button`] and [`PowerControl`] for
//! its peripherals and hands them to a [`Runtime`] together with the shared
//! [`TickState`]. [`Runtime::run`] never returns.

use core::convert::Infallible;

use embassy_futures::select::{Either, select};
use embedded_hal::digital::v2::InputPin;

use crate::{
    controller::{Action, Controller},
    debounce::Debouncer,
    ticks::{TickState, WakeReason},
};

/// PWM output driving the light string.
pub trait Light {
    /// Sets the 8-bit duty cycle.
    fn set_duty(&mut self, duty: u8);

    /// Reconnects the PWM output to the pin.
    fn enable(&mut self);

    /// Disconnects the PWM output and holds the pin low.
    fn disable(&mut self);
}

/// Push-button input. High means released (pulled up).
#[allow(async_fn_in_trait)]
pub trait Button: InputPin<Error = Infallible> {
    /// Resolves on the next press edge; used as the wake source while
    /// dormant.
    async fn wait_for_press(&mut self);
}

/// How deep the CPU may sleep between wakes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepDepth {
    /// The tick source keeps running
    Idle,
    /// Only the button edge can wake the device
    Deep,
}

/// Power-state control.
pub trait PowerControl {
    fn set_sleep_depth(&mut self, depth: SleepDepth);

    /// Forces a full hardware restart.
    fn restart(&mut self) -> !;
}

/// Control loop binding the mode state machine to the hardware.
pub struct Runtime<'a, L, B, P> {
    controller: Controller,
    light: L,
    button: B,
    power: P,
    ticks: &'a TickState,
}

impl<'a, L, B, P> Runtime<'a, L, B, P>
where
    L: Light,
    B: Button,
    P: PowerControl,
{
    pub fn new(controller: Controller, light: L, button: B, power: P, ticks: &'a TickState) -> Self {
        Self {
            controller,
            light,
            button,
            power,
            ticks,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn button(&self) -> &B {
        &self.button
    }

    /// Boots and runs the control loop forever.
    pub async fn run(mut self) -> ! {
        self.start().await;
        loop {
            self.step().await;
        }
    }

    /// Waits for the power-up press to be released, then starts the day.
    pub async fn start(&mut self) {
        self.power.set_sleep_depth(SleepDepth::Idle);
        self.light.enable();
        self.wait_for_release().await;
        self.ticks.reset();
    }

    /// One control-loop iteration: tick the state machine, then sleep until
    /// the next wake.
    pub async fn step(&mut self) {
        let released = self.read_button();
        let sleep_counter = self.ticks.sleep_counter();
        match self.controller.tick(released, sleep_counter, &mut self.light) {
            Action::Continue => {
                self.ticks.wait_for_wake().await;
            }
            Action::EnterWait => self.dormant().await,
            Action::PowerOff => self.power_off().await,
        }
    }

    /// Blocks until the button is confirmed released, sampling once per
    /// control tick. Never times out while the button is held.
    async fn wait_for_release(&mut self) {
        let mut debouncer = Debouncer::held();
        loop {
            debouncer.sample(self.read_button());
            if !debouncer.is_pressed() {
                return;
            }
            self.ticks.wait_for_wake().await;
        }
    }

    async fn dormant(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("entering wait at {}", self.ticks.sleep_counter());

        self.light.disable();
        self.ticks.begin_waiting();
        self.power.set_sleep_depth(SleepDepth::Idle);

        let reason = loop {
            match select(self.ticks.wait_for_wake(), self.button.wait_for_press()).await {
                Either::First(WakeReason::Tick) => continue,
                Either::First(reason) => break reason,
                Either::Second(()) => break WakeReason::Button,
            }
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("leaving wait: {}", reason);

        self.ticks.finish_waiting();
        self.controller.resume(reason);
        self.light.enable();
    }

    async fn power_off(&mut self) -> ! {
        #[cfg(feature = "defmt")]
        defmt::debug!("powering off");

        self.wait_for_release().await;
        self.light.disable();
        self.ticks.suspend();
        self.power.set_sleep_depth(SleepDepth::Deep);
        self.button.wait_for_press().await;
        self.power.restart()
    }

    fn read_button(&self) -> bool {
        match self.button.is_high() {
            Ok(released) => released,
            Err(never) => match never {},
        }
    }
}
