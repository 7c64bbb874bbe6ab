use fixed::types::{I32F32, I64F64};

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Every simulated quantity (rates, buffer levels, draws) uses this type so
/// that buffer arithmetic is exact and identical on every platform.
pub type Fixed64 = I32F32;

/// Q64.64 accumulator for totals summed over many ticks, where a single
/// tick's Q32.32 total can be near the top of its range.
pub type Fixed128 = I64F64;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and reporting.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Add one tick's total to a run total. Lossless widening, saturating at
/// `Fixed128::MAX`.
#[inline]
pub fn accumulate(total: Fixed128, v: Fixed64) -> Fixed128 {
    total.saturating_add(Fixed128::from_num(v))
}

#[inline]
pub fn fixed128_to_f64(v: Fixed128) -> f64 {
    v.to_num::<f64>()
}

/// Checked conversion from f64. Returns `None` for NaN, infinities and
/// values outside the Q32.32 range.
#[inline]
pub fn try_f64_to_fixed64(v: f64) -> Option<Fixed64> {
    if !v.is_finite() {
        return None;
    }
    Fixed64::checked_from_num(v)
}
