//! Fixed-point score quantization
//!
//! The quantized score is embedded in a signed payload, so the rounding rule is
//! fixed: round half up, then clamp to `[0, SCORE_SCALE]`.

pub const SCORE_SCALE: u16 = 10_000;

pub fn quantize(normalized_score: f64) -> u16 {
    if normalized_score.is_nan() {
        return 0;
    }
    round_half_up(normalized_score * SCORE_SCALE as f64).clamp(0.0, SCORE_SCALE as f64) as u16
}

/// `x.5` always goes up, unlike banker's rounding. Only defined for
/// non-negative inputs, where half away from zero is half up.
pub fn round_half_up(value: f64) -> f64 {
    value.round()
}

/// Inverse mapping, for display and verification
pub fn dequantize(quantized_score: u16) -> f64 {
    quantized_score as f64 / SCORE_SCALE as f64
}
