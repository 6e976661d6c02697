//! Population statistics over route counts.

/// Arithmetic mean, or `None` for an empty slice.
pub fn population_mean(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: u128 = values.iter().map(|&v| u128::from(v)).sum();
    Some(sum as f64 / values.len() as f64)
}

/// Population standard deviation (divides by `N`), or `None` for an empty
/// slice.
///
/// Uses two passes over the data so that integer inputs with an exact mean
/// produce an exact result.
pub fn population_std_dev(values: &[u64]) -> Option<f64> {
    let mean = population_mean(values)?;
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    Some((sum_sq / values.len() as f64).sqrt())
}
