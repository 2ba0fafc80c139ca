//! Display modes and the order a button press cycles through them.

/// Lighting effect currently shown on the string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Slow pulse following the breathing curve
    Breathe,
    /// Hold the last breathing intensity
    Freeze,
    /// Random on/dim flicker
    Flicker,
    /// Square-wave blink
    Flash,
    /// Terminal power-down, left only through a restart
    Off,
    /// Dormant until a button press or the next day period
    Wait,
}

impl Mode {
    /// True for the states that switch the light string off.
    pub fn is_dormant(self) -> bool {
        matches!(self, Mode::Off | Mode::Wait)
    }
}

/// Ordered set of modes reachable by pressing the button.
///
/// Each hardware revision exposes its own subset. `Wait` is never part of a
/// cycle: it is entered only by the idle timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeCycle {
    modes: &'static [Mode],
}

impl ModeCycle {
    /// Every effect, ending in the terminal `Off` state.
    pub const FULL: Self = Self::new(&[
        Mode::Breathe,
        Mode::Freeze,
        Mode::Flicker,
        Mode::Flash,
        Mode::Off,
    ]);

    /// Effects only; dormancy is reached through the idle timeout.
    pub const DUTY_CYCLED: Self =
        Self::new(&[Mode::Breathe, Mode::Freeze, Mode::Flicker, Mode::Flash]);

    /// Builds a cycle, rejecting empty lists and `Wait` at compile time.
    pub const fn new(modes: &'static [Mode]) -> Self {
        assert!(!modes.is_empty(), "mode cycle must not be empty");
        let mut i = 0;
        while i < modes.len() {
            assert!(
                !matches!(modes[i], Mode::Wait),
                "Wait cannot be part of a mode cycle"
            );
            i += 1;
        }
        Self { modes }
    }

    /// Mode shown after power-up.
    pub const fn first(&self) -> Mode {
        self.modes[0]
    }

    pub const fn len(&self) -> usize {
        self.modes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn contains(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    /// Mode following `mode`, wrapping after the last entry.
    ///
    /// A mode outside the cycle advances to the first entry.
    pub fn next(&self, mode: Mode) -> Mode {
        match self.modes.iter().position(|&m| m == mode) {
            Some(idx) => self.modes[(idx + 1) % self.modes.len()],
            None => self.first(),
        }
    }
}

impl Default for ModeCycle {
    fn default() -> Self {
        Self::FULL
    }
}
