// `usize` values converted here are grid or member counts, far below 2^52
#[allow(clippy::cast_precision_loss)]
pub(crate) fn f64_from_usize(x: usize) -> f64 {
    x as f64
}
