//! Shift-register button debouncing.
//!
//! Each sample shifts the raw pin level into an 8-bit history (bit 0 is the
//! newest sample, `1` = released since the button pulls up). Older bits are
//! forced to "don't care" before comparing against a fixed pattern, so an
//! edge is only confirmed by a run of consistent samples:
//!
//! ```text
//! press:   released, pressed, pressed, pressed          (history | 0xF0 == 0xF8)
//! release: pressed, released x6                         (history | 0x80 == 0xBF)
//! ```
//!
//! On top of the patterns the [`Debouncer`] keeps a confirmed level: a
//! press is only reported while confirmed released and a release only while
//! confirmed pressed, so a single glitched sample can never flip it.

const PRESS_DONT_CARE: u8 = 0xF0;
const PRESS_PATTERN: u8 = 0xF8;
const RELEASE_DONT_CARE: u8 = 0x80;
const RELEASE_PATTERN: u8 = 0xBF;

/// Confirmed button transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Press,
    Release,
}

/// Shifts one raw sample into `history` and classifies the result.
///
/// Returns the updated history and the edge it confirms, if any.
pub fn sample_and_classify(released: bool, history: u8) -> (u8, Option<Edge>) {
    let history = (history << 1) | u8::from(released);
    let edge = if history | PRESS_DONT_CARE == PRESS_PATTERN {
        Some(Edge::Press)
    } else if history | RELEASE_DONT_CARE == RELEASE_PATTERN {
        Some(Edge::Release)
    } else {
        None
    };
    (history, edge)
}

/// Debounced view of the button, fed once per control tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Debouncer {
    history: u8,
    /// Confirmed level
    pressed: bool,
}

impl Debouncer {
    /// Starts confirmed released, with a history of released samples.
    pub const fn released() -> Self {
        Self {
            history: 0xFF,
            pressed: false,
        }
    }

    /// Starts confirmed pressed, with a history of pressed samples.
    ///
    /// Used when the button is known to be down, so that the finger still
    /// on it cannot be counted as a new press.
    pub const fn held() -> Self {
        Self {
            history: 0x00,
            pressed: true,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn sample(&mut self, released: bool) -> Option<Edge> {
        let (history, edge) = sample_and_classify(released, self.history);
        self.history = history;
        match (edge, self.pressed) {
            (Some(Edge::Press), false) => {
                self.pressed = true;
                Some(Edge::Press)
            }
            (Some(Edge::Release), true) => {
                self.pressed = false;
                Some(Edge::Release)
            }
            _ => None,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::released()
    }
}
