/// Relative comparison tolerant to values that took a floating round trip
/// through transform composition. Exactly equal values always compare equal,
/// so two zeros do too.
#[must_use]
pub fn fuzzy_eq(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() * 1e12 <= a.abs().min(b.abs())
}
