//! 16-bit linear congruential generator.
//!
//! Not a security primitive: it only keeps the flicker effect from lining up
//! with the mode timer.

const MULTIPLIER: u16 = 2053;
const INCREMENT: u16 = 13849;

/// Seeded 16-bit pseudo-random source.
#[derive(Clone, Debug)]
pub struct Random16 {
    state: u16,
}

impl Random16 {
    pub const fn new(seed: u16) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns the new value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u16 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// Draws one value and biases it into a coin flip.
    ///
    /// Returns `true` when the draw lands in the upper half once offset by
    /// `0x7FFF`.
    pub fn coin(&mut self) -> bool {
        self.next().wrapping_add(0x7FFF) & 0x8000 != 0
    }
}
