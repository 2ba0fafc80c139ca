//! Mode state machine.
//!
//! Called once per control tick. Samples the button, applies the idle
//! timeout and drives the light for the active mode.
//!
//! ```text
//! Breathe -> Freeze -> Flicker -> Flash -> Off      (button press)
//!    ^                                      |
//!    +--------------------------------------+       (duty-cycled revisions skip Off)
//!
//! any active mode --(sleep counter >= on-duration)--> Wait
//! Wait --(button or day elapsed)--> mode active before Wait
//! ```

use crate::{
    breath::breath_intensity,
    config::Config,
    debounce::{Debouncer, Edge},
    mode::Mode,
    random::Random16,
    runtime::Light,
    ticks::WakeReason,
};

/// What the control loop must do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Sleep until the next periodic wake
    Continue,
    /// Go dormant and wait for the button or the next day
    EnterWait,
    /// Power down; only a restart leaves this state
    PowerOff,
}

/// Per-tick controller for the light string.
#[derive(Clone, Debug)]
pub struct Controller {
    config: Config,
    mode: Mode,
    /// Mode restored when leaving `Wait`
    resume_mode: Mode,
    mode_timer: u16,
    intensity: u8,
    button: Debouncer,
    rng: Random16,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        let mode = config.modes.first();
        Self {
            config,
            mode,
            resume_mode: mode,
            mode_timer: 0,
            intensity: config.initial_intensity,
            button: Debouncer::released(),
            rng: Random16::new(config.seed),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn resume_mode(&self) -> Mode {
        self.resume_mode
    }

    pub fn mode_timer(&self) -> u16 {
        self.mode_timer
    }

    /// Most recently computed breathing intensity.
    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    /// Runs one control tick.
    ///
    /// # Arguments
    ///
    /// * `released` - Raw button level (true = not pressed)
    /// * `sleep_counter` - Ticks since the last interaction
    /// * `light` - PWM output to drive
    pub fn tick<L: Light>(&mut self, released: bool, sleep_counter: i32, light: &mut L) -> Action {
        if let Some(Edge::Press) = self.button.sample(released) {
            let next = self.config.modes.next(self.mode);
            self.set_mode(next);
        }

        if !self.mode.is_dormant() && sleep_counter >= self.config.schedule.on_duration {
            self.resume_mode = self.mode;
            self.set_mode(Mode::Wait);
        }

        let action = match self.mode {
            Mode::Breathe => {
                let phase = self.config.breath_rate.phase(self.mode_timer);
                self.intensity = breath_intensity(phase);
                light.set_duty(self.intensity);
                Action::Continue
            }
            Mode::Freeze => {
                light.set_duty(self.intensity);
                Action::Continue
            }
            Mode::Flicker => {
                if self.mode_timer & self.config.flicker_mask == 0 {
                    let duty = if self.rng.coin() {
                        self.intensity
                    } else {
                        self.config.dim_duty
                    };
                    light.set_duty(duty);
                }
                Action::Continue
            }
            Mode::Flash => {
                let flash_mask = 1u16.checked_shl(u32::from(self.config.flash_bit)).unwrap_or(0);
                let duty = if self.mode_timer & flash_mask != 0 {
                    self.config.dim_duty
                } else {
                    self.intensity
                };
                light.set_duty(duty);
                Action::Continue
            }
            Mode::Off => {
                light.set_duty(self.config.glow_duty);
                Action::PowerOff
            }
            Mode::Wait => {
                light.set_duty(self.config.glow_duty);
                Action::EnterWait
            }
        };

        self.mode_timer = self.mode_timer.wrapping_add(1);
        action
    }

    /// Leaves `Wait`, restoring the mode that was active before it.
    ///
    /// A button wake means the finger is still on the button, so the
    /// debouncer restarts held and the waking press does not advance the
    /// mode.
    pub fn resume(&mut self, reason: WakeReason) {
        self.button = match reason {
            WakeReason::Button => Debouncer::held(),
            WakeReason::Tick | WakeReason::Resume => Debouncer::released(),
        };
        self.set_mode(self.resume_mode);
    }

    fn set_mode(&mut self, mode: Mode) {
        #[cfg(feature = "defmt")]
        defmt::debug!("mode {} -> {}", self.mode, mode);

        self.mode = mode;
        self.mode_timer = 0;
    }
}
