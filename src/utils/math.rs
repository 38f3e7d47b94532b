//! Small math helpers layered on top of `glam`.

/// Harmonic mean `2ab/(a+b)` of two non-negative parameters.
///
/// Used to combine paired material properties symmetrically; returns 0
/// whenever either input is 0, so a rigid/soft pairing is dominated by
/// the soft side.
pub fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    2.0 * a * b / (a + b)
}

/// Returns true when `value` is indistinguishable from zero at tolerance
/// `eps`. Rheology branch selection calls this with a loose epsilon
/// ([`crate::config::RHEOLOGY_EPS`]); state comparison uses tighter ones.
pub fn approx_zero(value: f64, eps: f64) -> bool {
    value.abs() <= eps
}

/// Tolerance-based scalar equality, symmetric in its arguments.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
