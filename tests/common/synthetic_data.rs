/// Samples `f` over `[x_min, x_max)` at a fixed step, dropping non-finite
/// values.
pub fn sample_function(
    f: impl Fn(f64) -> f64,
    x_min: f64,
    x_max: f64,
    step: f64,
) -> Vec<(f64, f64)> {
    assert!(step > 0.0, "step must be positive");
    let count = ((x_max - x_min) / step) as usize;
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let x = x_min + i as f64 * step;
        let y = f(x);
        if y.is_finite() {
            points.push((x, y));
        }
    }
    points
}

/// Adds a deterministic zig-zag perturbation of the given amplitude, cycling
/// through -1, -1/3, 1/3, 1 so the noise is zero-mean over every 4 samples.
pub fn perturb(points: &[(f64, f64)], amplitude: f64) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| (x, y + (((i % 4) as f64) * (2.0 / 3.0) - 1.0) * amplitude))
        .collect()
}
