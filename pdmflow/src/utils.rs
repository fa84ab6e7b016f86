//! Utilities.

use itertools::Itertools;

use crate::signal::MAX_WIDTH;

/// Returns the all-ones mask of the given width.
///
/// ### Example
/// ```
/// assert_eq!(pdmflow::bit_mask(3), 0b111);
/// assert_eq!(pdmflow::bit_mask(64), u64::MAX);
/// ```
pub const fn bit_mask(width: usize) -> u64 {
    if width >= MAX_WIDTH {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Reverses the order of the low `width` bits of `value`.
///
/// Bit `i` of the result equals bit `width - 1 - i` of `value`. Bits above `width` are ignored.
///
/// # Panics
///
/// Panics if `width` is larger than [`MAX_WIDTH`].
///
/// ### Example
/// ```
/// assert_eq!(pdmflow::bitreverse(0b001, 3), 0b100);
/// assert_eq!(pdmflow::bitreverse(0b110, 3), 0b011);
/// ```
pub const fn bitreverse(value: u64, width: usize) -> u64 {
    assert!(width <= MAX_WIDTH, "bitreverse: width exceeds MAX_WIDTH");
    if width == 0 {
        return 0;
    }
    (value & bit_mask(width)).reverse_bits() >> (MAX_WIDTH - width)
}

/// Indents every line in the string.
pub fn indent(str: String, indent: usize) -> String { str.lines().map(|l| format!("{}{}", " ".repeat(indent), l)).join("\n") }
