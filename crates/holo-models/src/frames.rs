//! Frame-count alignment for the temporal encoder.
//!
//! The diffusion engine's temporal VAE consumes frames in chunks of four
//! plus one leading frame, so every frame count (and every shot cut index)
//! handed to it must have the form `4t + 1`.
//!
//! Rounding of `(n - 1) / 4` is round-half-to-even: inputs where the
//! quotient ends in exactly `.5` (that is, `n ≡ 3 (mod 4)`) resolve towards
//! the even `t`. For example `3 → 1`, `7 → 9`, `11 → 9`.

/// Temporal chunk size of the downstream encoder.
pub const TEMPORAL_CHUNK: i64 = 4;

/// Largest `u32` of the form `4t + 1`. Aligned counts saturate here.
pub const MAX_ALIGNED_FRAMES: u32 = u32::MAX - 2;

/// Align an arbitrary (possibly negative) frame index to the nearest `4t + 1`.
///
/// # Examples
/// ```
/// use holo_models::frames::align_frame_index;
/// assert_eq!(align_frame_index(100), 101);
/// assert_eq!(align_frame_index(81), 81);
/// assert_eq!(align_frame_index(0), 1);
/// ```
pub fn align_frame_index(n: i64) -> i64 {
    let t = round_half_even_div(n.saturating_sub(1), TEMPORAL_CHUNK);
    t.saturating_mul(TEMPORAL_CHUNK).saturating_add(1)
}

/// Align a non-negative frame count to the nearest `4t + 1`.
///
/// Counts of `0` and `1` both align to `1`.
///
/// # Examples
/// ```
/// use holo_models::frames::align_frame_count;
/// assert_eq!(align_frame_count(97), 97);
/// assert_eq!(align_frame_count(100), 101);
/// ```
pub fn align_frame_count(n: u32) -> u32 {
    let aligned = align_frame_index(i64::from(n)).max(1);
    u32::try_from(aligned).unwrap_or(MAX_ALIGNED_FRAMES)
}

/// Whether a value already satisfies the `4t + 1` constraint.
pub fn is_aligned(n: i64) -> bool {
    n.rem_euclid(TEMPORAL_CHUNK) == 1
}

/// Integer division rounded to the nearest integer, ties to even.
fn round_half_even_div(numerator: i64, divisor: i64) -> i64 {
    let quotient = numerator.div_euclid(divisor);
    let remainder = numerator.rem_euclid(divisor);

    match (2 * remainder).cmp(&divisor) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => {
            if quotient % 2 == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    }
}
