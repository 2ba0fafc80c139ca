//! Power management and tick source for the fairy light string.
//!
//! # Sleep Depths
//!
//! The embassy thread executor sleeps with `WFE` whenever no task is
//! ready. Whether that is a light sleep or STOP mode is selected with the
//! Cortex-M `SLEEPDEEP` bit:
//!
//! - **Idle**: `SLEEPDEEP` clear. TIM21 (time driver) keeps running, so the
//!   tick task keeps counting towards the next day while the string is
//!   dormant.
//! - **Deep**: `SLEEPDEEP` set, `PDDS` left clear, so the core enters STOP.
//!   Only the button EXTI line can wake it.
//!
//! # Restart
//!
//! `Off` is left only through a full reset. The independent watchdog is
//! armed with a short timeout and never fed.

use cortex_m::peripheral::SCB;
use embassy_stm32::{pac, peripherals::IWDG, wdg::IndependentWatchdog};
use embassy_time::{Duration, Ticker};
use fairy_lights::{PowerControl, SleepDepth, TickState};

/// Watchdog timeout used to force a restart.
pub const RESTART_TIMEOUT_US: u32 = 15_000;

/// Shared state between the tick task and the control loop.
pub static TICKS: TickState = TickState::new(crate::SCHEDULE);

/// Controller for sleep depth selection and forced restarts.
pub struct PowerController {
    /// System control block, owns the `SLEEPDEEP` bit
    scb: SCB,
    /// Independent watchdog, created idle and only started to restart
    watchdog: IndependentWatchdog<'static, IWDG>,
}

impl PowerController {
    /// Creates a new PowerController.
    ///
    /// # Arguments
    ///
    /// * `scb` - Cortex-M system control block
    /// * `watchdog` - Independent watchdog, not yet unleashed
    pub fn new(scb: SCB, watchdog: IndependentWatchdog<'static, IWDG>) -> Self {
        Self { scb, watchdog }
    }
}

impl PowerControl for PowerController {
    fn set_sleep_depth(&mut self, depth: SleepDepth) {
        #[cfg(feature = "debug-mode")]
        defmt::info!("Sleep depth: {}", depth);

        match depth {
            SleepDepth::Idle => self.scb.clear_sleepdeep(),
            SleepDepth::Deep => self.scb.set_sleepdeep(),
        }
    }

    fn restart(&mut self) -> ! {
        #[cfg(feature = "debug-mode")]
        defmt::info!("Restart requested, arming watchdog");

        self.scb.clear_sleepdeep();
        self.watchdog.unleash();
        loop {
            cortex_m::asm::nop();
        }
    }
}

/// Enables the PWR peripheral clock so STOP mode can be entered.
///
/// The PAC must be used here; embassy-stm32 has no PWR driver for L0.
pub fn setup_power() {
    pac::RCC.apb1enr().modify(|w| w.set_pwren(true));
}

/// Periodic tick source.
///
/// Runs at `TICK_HZ` and feeds every tick to [`TICKS`], which decides when
/// the control loop is woken.
///
/// # Example
///
/// ```no_run
/// spawner.spawn(tick_task()).unwrap();
/// ```
#[embassy_executor::task]
pub async fn tick_task() {
    let mut ticker = Ticker::every(Duration::from_hz(crate::TICK_HZ as u64));
    loop {
        ticker.next().await;
        TICKS.on_tick();
    }
}
