//! Timing schedule and effect constants.
//!
//! All durations are expressed in ticks of the periodic tick source, so the
//! same core runs unchanged on any tick frequency the firmware picks.

use crate::mode::ModeCycle;

/// Converts whole seconds to ticks at `tick_hz`.
pub const fn secs_to_ticks(tick_hz: u32, secs: u32) -> i32 {
    let ticks = tick_hz as u64 * secs as u64;
    assert!(ticks <= i32::MAX as u64, "duration overflows the sleep counter");
    ticks as i32
}

/// Idle timeout and day cycle, plus the control-loop wake sub-rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Ticks the string stays lit after the last interaction
    pub on_duration: i32,
    /// Ticks in one day cycle; dormancy ends after this much time
    pub day_period: i32,
    /// Tick source ticks per control-loop wake
    pub wake_divider: u16,
}

impl Schedule {
    /// Builds a schedule from the real tick frequency.
    ///
    /// The control loop is woken every `tick_hz / control_hz` ticks.
    pub const fn new(tick_hz: u32, control_hz: u32, on_secs: u32, day_secs: u32) -> Self {
        assert!(control_hz > 0, "control rate must be non-zero");
        assert!(control_hz <= tick_hz, "control rate exceeds tick rate");
        let divider = tick_hz / control_hz;
        assert!(divider <= u16::MAX as u32, "wake divider too large");
        Self::from_ticks(
            secs_to_ticks(tick_hz, on_secs),
            secs_to_ticks(tick_hz, day_secs),
            divider as u16,
        )
    }

    pub const fn from_ticks(on_duration: i32, day_period: i32, wake_divider: u16) -> Self {
        assert!(on_duration > 0, "on-duration must be positive");
        assert!(on_duration < day_period, "on-duration must be shorter than a day");
        assert!(wake_divider > 0, "wake divider must be non-zero");
        Self {
            on_duration,
            day_period,
            wake_divider,
        }
    }
}

/// Maps the mode timer to a breathing phase: `(timer * multiplier) >> shift`,
/// rounded, in 16-bit wrapping arithmetic.
///
/// Lowering the ratio slows the apparent breathing rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreathRate {
    pub multiplier: u16,
    pub shift: u8,
}

impl BreathRate {
    /// Three eighths of a phase unit per tick.
    pub const DEFAULT: Self = Self {
        multiplier: 3,
        shift: 3,
    };

    pub fn phase(&self, mode_timer: u16) -> u8 {
        let scaled = mode_timer.wrapping_mul(self.multiplier);
        let rounded = if self.shift == 0 {
            scaled
        } else {
            let half = 1u16.checked_shl(u32::from(self.shift - 1)).unwrap_or(0);
            scaled
                .wrapping_add(half)
                .checked_shr(u32::from(self.shift))
                .unwrap_or(0)
        };
        // Phase wraps every 256 units
        rounded as u8
    }
}

impl Default for BreathRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything the mode state machine needs to know.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub schedule: Schedule,
    pub modes: ModeCycle,
    pub breath_rate: BreathRate,
    /// Flicker draws a new state when `mode_timer & flicker_mask == 0`
    pub flicker_mask: u16,
    /// Mode timer bit that toggles the flash effect
    pub flash_bit: u8,
    /// Duty used for the dark half of flicker and flash
    pub dim_duty: u8,
    /// Duty shown while the string is going dormant
    pub glow_duty: u8,
    /// Intensity before the first breathing sample
    pub initial_intensity: u8,
    /// Seed of the flicker random source
    pub seed: u16,
}

impl Config {
    pub const fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            modes: ModeCycle::FULL,
            breath_rate: BreathRate::DEFAULT,
            flicker_mask: 0x3,
            flash_bit: 3,
            dim_duty: 0x02,
            glow_duty: 0x01,
            initial_intensity: 0xFF,
            seed: 0xBEEF,
        }
    }

    pub const fn with_modes(mut self, modes: ModeCycle) -> Self {
        self.modes = modes;
        self
    }
}
