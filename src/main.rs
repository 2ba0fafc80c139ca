//! Firmware for a battery-powered, single-button fairy light string.
//!
//! # Overview
//!
//! This firmware drives one PWM-dimmed LED string and cycles through its
//! effects on each button press:
//! - Breathe: slow pulse following a calibrated curve
//! - Freeze: hold the current brightness
//! - Flicker: random on/dim candle effect
//! - Flash: square-wave blink
//! - Off: power down until the next press restarts the device
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6U6 (Cortex-M0+, ultra-low-power)
//! - **Light**: LED string switched by an N-MOSFET on TIM2_CH1
//! - **Input**: one push-button to GND on an EXTI line
//!
//! # Duty Cycle
//!
//! The string stays lit for `ON_DURATION_SECS` after boot, then goes
//! dormant. It comes back on by itself one `DAY_PERIOD_SECS` after the
//! previous start, so it lights up at the same time every day, or straight
//! away on a button press.
//!
//! # Low Power Operation
//!
//! - MSI oscillator at 2.097 MHz, enough for an 8-bit PWM at 500 Hz
//! - Embassy executor sleeps with WFE between ticks
//! - STOP mode in `Off`, woken only by the button EXTI line
//!
//! # Module Organization
//!
//! - [`power`] - Sleep depth, watchdog restart and the tick task
//! - [`string_controller`] - PWM driver for the light string
//! - [`hardware`] - Pin mappings and peripheral initialization

#![no_std]
#![no_main]

mod hardware;
mod power;
mod string_controller;

use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    rcc::{LsConfig, mux::ClockMux},
};
use embassy_time::Timer;
use fairy_lights::{Controller, Runtime, Schedule};
use {defmt_rtt as _, panic_probe as _};

use hardware::Peripherals;
use power::{TICKS, setup_power, tick_task};

/// Tick source frequency in Hz.
///
/// Every duration in the core is counted in these ticks.
pub const TICK_HZ: u32 = 1024;

/// Control-loop wake rate in Hz.
///
/// Sets the button sampling period and the speed of every effect.
pub const CONTROL_HZ: u32 = 64;

/// Time the string stays lit after power-up or a wake.
#[cfg(not(feature = "quick-cycle"))]
const ON_DURATION_SECS: u32 = 9 * 60 * 60;
#[cfg(feature = "quick-cycle")]
const ON_DURATION_SECS: u32 = 10;

/// Length of one day cycle.
#[cfg(not(feature = "quick-cycle"))]
const DAY_PERIOD_SECS: u32 = 24 * 60 * 60;
#[cfg(feature = "quick-cycle")]
const DAY_PERIOD_SECS: u32 = 20;

pub const SCHEDULE: Schedule = Schedule::new(TICK_HZ, CONTROL_HZ, ON_DURATION_SECS, DAY_PERIOD_SECS);

/// Creates a low-power clock configuration for STM32L031.
///
/// # Clock Settings
///
/// - **MSI**: 2.097 MHz
/// - **System clock**: MSI (no PLL)
/// - **LSE/LSI**: off, TIM21 provides the time base
/// - **Voltage scale**: Range 1
///
/// MSI is also the STOP wake-up clock, so the configuration survives a
/// deep sleep unchanged.
///
/// # Returns
///
/// Configured RCC settings for embassy-stm32 initialization
fn create_low_power_config() -> embassy_stm32::rcc::Config {
    embassy_stm32::rcc::Config {
        msi: Some(embassy_stm32::rcc::MSIRange::RANGE2M),
        hsi: false,
        hse: None,
        pll: None,
        sys: embassy_stm32::rcc::Sysclk::MSI,
        ahb_pre: embassy_stm32::rcc::AHBPrescaler::DIV1,
        apb1_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        apb2_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        ls: LsConfig::off(),
        voltage_scale: embassy_stm32::rcc::VoltageScale::RANGE1,
        mux: ClockMux::default(),
    }
}

/// Main entry point for the fairy light firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks (2.097 MHz MSI)
/// 2. Take the core peripherals and initialize STM32 peripherals
/// 3. Enable the PWR clock for STOP mode
/// 4. Initialize PWM, button and power controller
/// 5. Spawn the tick task
/// 6. Hand over to the control loop, which never returns
///
/// # Spawned Tasks
///
/// - **tick_task**: Periodic tick source feeding [`TICKS`]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_low_power_config();

    let core_peripherals = cortex_m::Peripherals::take().unwrap();
    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Fairy lights firmware starting...");

    // Wait 3 seconds after boot to allow debugger connection
    // before the first STOP entry. Negligible battery impact.
    #[cfg(feature = "debug-mode")]
    defmt::info!("Waiting 3 seconds for debugger connection...");

    Timer::after_secs(3).await;

    setup_power();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Initializing peripherals...");

    let peripherals = Peripherals::new(p, core_peripherals.SCB);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Spawning tick task...");

    spawner.spawn(tick_task()).unwrap();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Entering control loop...");

    let controller = Controller::new(fairy_lights::Config::new(SCHEDULE));
    Runtime::new(
        controller,
        peripherals.str_ctrl,
        peripherals.button,
        peripherals.pwr_ctrl,
        &TICKS,
    )
    .run()
    .await
}
