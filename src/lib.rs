//! Control core for a battery-powered, single-button fairy light string.
//!
//! # Overview
//!
//! The light string is driven by one PWM output and controlled by one
//! push-button. Each press advances to the next lighting effect; after a
//! configured on-duration the string goes dormant and comes back either on
//! the next press or once a full day period has elapsed.
//!
//! Everything in this crate is hardware-agnostic so it runs (and is tested)
//! on the host. The firmware binary supplies the hardware through the
//! [`Light`], [`Button`] and [`PowerControl`] traits and a periodic tick
//! source calling [`TickState::on_tick`].
//!
//! # Module Organization
//!
//! - [`breath`] - Breathing intensity curve (table + integer interpolation)
//! - [`random`] - 16-bit pseudo-random source used by the flicker effect
//! - [`debounce`] - Shift-register button debouncing
//! - [`mode`] - Display modes and per-revision mode cycles
//! - [`config`] - Timing schedule and effect constants
//! - [`ticks`] - Interrupt/main-loop shared state and wake handshake
//! - [`controller`] - Per-tick mode state machine
//! - [`runtime`] - Hardware seams and the control loop

#![cfg_attr(not(test), no_std)]

pub mod breath;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod mode;
pub mod random;
pub mod runtime;
pub mod ticks;

pub use breath::breath_intensity;
pub use config::{BreathRate, Config, Schedule};
pub use controller::{Action, Controller};
pub use debounce::{Debouncer, Edge};
pub use mode::{Mode, ModeCycle};
pub use random::Random16;
pub use runtime::{Button, Light, PowerControl, Runtime, SleepDepth};
pub use ticks::{TickState, WakeReason};
