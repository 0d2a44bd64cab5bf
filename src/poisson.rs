//! Poisson helpers shared by the outcome engine.
//!
//! Everything works off the `p(k) = p(k-1) * lambda / k` recurrence, carried in
//! log space so large intensities do not underflow `exp(-lambda)` to zero.

/// Largest per-side goal count a scoreline grid may span. Fixed cutoffs above
/// it are rejected, as are intensities whose derived grid would pass it.
pub const MAX_GRID_GOALS: u32 = 1_000;

/// Upper bound on the support worth walking: `lambda + 10 * sqrt(lambda) + 20`.
/// The mass past it is far below `f64::EPSILON` for every `lambda`.
pub fn support_bound(lambda: f64) -> u32 {
    let lambda = lambda.max(0.0);
    (lambda + 10.0 * lambda.sqrt() + 20.0).ceil().min(u32::MAX as f64) as u32
}

/// Yields `P(X = 0), P(X = 1), ...` without end.
fn pmf_iter(lambda: f64) -> impl Iterator<Item = f64> {
    let lambda = lambda.max(0.0);
    let ln_lambda = lambda.ln();
    let mut ln_p = -lambda;
    let mut k = 0u32;
    std::iter::from_fn(move || {
        if k > 0 {
            // grouped so that lambda == k leaves ln_p untouched
            ln_p += ln_lambda - (k as f64).ln();
        }
        k += 1;
        Some(ln_p.exp())
    })
}

/// `P(X = k)` for `X ~ Poisson(lambda)`.
pub fn pmf(k: u32, lambda: f64) -> f64 {
    if k > support_bound(lambda) {
        return 0.0;
    }
    pmf_iter(lambda).nth(k as usize).unwrap_or(0.0)
}

/// `P(X = k)` for `k in 0..=max_k`. Unlike a display grid, the tail mass beyond
/// `max_k` is left out rather than folded into the last bucket.
pub fn pmf_table(lambda: f64, max_k: u32) -> Vec<f64> {
    pmf_iter(lambda).take(max_k as usize + 1).collect()
}

/// `P(X <= k)`. Streams the recurrence and reports 1.0 once `k` is past
/// [`support_bound`].
pub fn cdf(k: u32, lambda: f64) -> f64 {
    if k >= support_bound(lambda) {
        return 1.0;
    }
    pmf_iter(lambda)
        .take(k as usize + 1)
        .sum::<f64>()
        .min(1.0)
}

/// `P(X > threshold)` for a real-valued threshold, i.e. `1 - CDF(floor(threshold))`.
/// Negative thresholds are certain to be exceeded.
pub fn prob_exceeds(threshold: f64, lambda: f64) -> f64 {
    if threshold < 0.0 {
        return 1.0;
    }
    if threshold >= support_bound(lambda) as f64 {
        return 0.0;
    }
    let k = threshold.floor() as u32;
    (1.0 - cdf(k, lambda)).clamp(0.0, 1.0)
}

/// Smallest `k` with `CDF(k, lambda) > 1 - tolerance`. Tolerances below what an
/// `f64` sum can resolve stop at [`support_bound`].
pub fn tail_cutoff(lambda: f64, tolerance: f64) -> u32 {
    let target = 1.0 - tolerance;
    let bound = support_bound(lambda);
    let mut acc = 0.0;
    for (k, p) in pmf_iter(lambda).enumerate() {
        acc += p;
        let k = k as u32;
        if acc > target || k >= bound {
            return k;
        }
    }
    bound
}
