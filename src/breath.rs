//! Breathing intensity curve.
//!
//! A 33-point calibrated table covers one full breath (bright, fading to
//! almost dark, back to bright) at 8-unit phase steps. Values between table
//! points are linearly interpolated with shifts and adds only.

/// Calibrated brightness samples, one per 8 phase units plus a guard entry.
pub const BREATH_TABLE: [u8; 33] = [
    255, 243, 200, 164, 135, 110, 90, 74, 60, 50, 41, 34, 28, 23, 18, 15, 12, 9, 7, 6, 6, 8, 11,
    16, 24, 36, 52, 72, 99, 131, 172, 221, 255,
];

/// Phase units between two table entries, as a power of two.
const STEP_SHIFT: u8 = 3;

/// Fixed-point scale of the gradient, as a power of two.
const GRAD_SHIFT: u8 = 2;

/// Maps an 8-bit breathing phase to an 8-bit PWM intensity.
///
/// The gradient between the two bracketing entries is first rounded down
/// to `GRAD_SHIFT` fractional bits, multiplied by the remainder of the
/// phase inside the step and rounded back. The result is added to, or
/// subtracted from, the lower entry depending on the local slope.
///
/// ```
/// use fairy_lights::breath_intensity;
///
/// assert_eq!(breath_intensity(0), 255);
/// assert_eq!(breath_intensity(4), 249);
/// ```
pub fn breath_intensity(phase: u8) -> u8 {
    let idx_low = usize::from(phase >> STEP_SHIFT);
    let idx_high = (idx_low + 1).min(BREATH_TABLE.len() - 1);
    let val_low = BREATH_TABLE[idx_low];
    let val_high = BREATH_TABLE[idx_high];

    let rising = val_high >= val_low;
    let grad = u16::from(val_high.abs_diff(val_low));
    let grad = round_shift(grad, STEP_SHIFT - GRAD_SHIFT);
    let remainder = u16::from(phase & ((1 << STEP_SHIFT) - 1));
    // Truncation to 8 bits is part of the calibrated arithmetic
    let offset = round_shift(grad * remainder, GRAD_SHIFT) as u8;

    if rising {
        val_low.wrapping_add(offset)
    } else {
        val_low.wrapping_sub(offset)
    }
}

/// Shift right by `shift` bits, rounding half up.
const fn round_shift(value: u16, shift: u8) -> u16 {
    if shift == 0 {
        value
    } else {
        (value + (1 << (shift - 1))) >> shift
    }
}
