use crate::traits::RandomSource;

/// Default bracket width used when no step estimate is given
fn default_step(x0: f64, lower: f64, upper: f64) -> f64 {
    if lower.is_finite() && upper.is_finite() {
        (upper - lower) / 4.0
    } else {
        (x0.abs() / 4.0).max(0.1)
    }
}

/// Univariate slice sampler with stepping-out and shrinkage (Neal, 2003).
///
/// Runs `n_iters` slice sampling updates of the Markov chain starting at
/// `x0` targeting the (possibly unnormalized) density `exp(ln_f(x))`
/// restricted to the open interval `bounds = (lower, upper)`, and returns the
/// final state.
///
/// # Arguments
/// - ln_f: log density. May return `-∞` for points outside its support.
/// - x0: starting point in `[lower, upper]`
/// - rng: source of uniform draws
/// - bounds: (lower, upper). Either may be infinite.
/// - step: initial bracket width. If `step <= 0` a width is estimated from
///   the bounds, or from `x0` if the bounds are not both finite.
/// - n_iters: number of slice sampling updates
/// - max_evals: budget of `ln_f` evaluations spent stepping out
///
/// # Panics
/// If `lower >= upper` or `x0` is not in `[lower, upper]`.
///
/// # Example
///
/// Draw from a standard normal truncated to (0, ∞)
///
/// ```
/// use pyp::misc::slice_sample;
///
/// let mut rng = rand::thread_rng();
/// let ln_f = |x: f64| -0.5 * x * x;
///
/// let x = slice_sample(ln_f, 1.0, &mut rng, (0.0, f64::INFINITY), 0.0, 10, 100);
/// assert!(x > 0.0);
/// ```
pub fn slice_sample<F, R>(
    ln_f: F,
    x0: f64,
    rng: &mut R,
    bounds: (f64, f64),
    step: f64,
    n_iters: usize,
    max_evals: usize,
) -> f64
where
    F: Fn(f64) -> f64,
    R: RandomSource + ?Sized,
{
    let (lower, upper) = bounds;
    assert!(
        lower < upper,
        "slice bounds must be increasing, got ({}, {})",
        lower,
        upper
    );
    assert!(
        (lower..=upper).contains(&x0),
        "x0 ({}) outside of slice bounds ({}, {})",
        x0,
        lower,
        upper
    );

    let w = if step > 0.0 {
        step
    } else {
        default_step(x0, lower, upper)
    };

    let score = |x: f64, n_evals: &mut usize| -> f64 {
        *n_evals += 1;
        if x <= lower || x >= upper {
            f64::NEG_INFINITY
        } else {
            ln_f(x)
        }
    };

    let mut n_evals: usize = 0;
    let mut x = x0;
    let mut ln_fx = score(x, &mut n_evals);

    for _ in 0..n_iters {
        // uniform_unit is in [0, 1), so 1 - u is in (0, 1]
        let ln_y = ln_fx + (1.0 - rng.uniform_unit()).ln();

        let mut left = x - w * rng.uniform_unit();
        let mut right = left + w;
        left = left.max(lower);
        right = right.min(upper);

        while left > lower
            && n_evals < max_evals
            && score(left, &mut n_evals) > ln_y
        {
            left = (left - w).max(lower);
        }

        while right < upper
            && n_evals < max_evals
            && score(right, &mut n_evals) > ln_y
        {
            right = (right + w).min(upper);
        }

        loop {
            let x_new = (right - left).mul_add(rng.uniform_unit(), left);
            let ln_f_new = score(x_new, &mut n_evals);
            if ln_f_new > f64::NEG_INFINITY && ln_f_new >= ln_y {
                x = x_new;
                ln_fx = ln_f_new;
                break;
            }

            if x_new < x {
                left = x_new;
            } else {
                right = x_new;
            }

            // the bracket has collapsed onto the current point
            if right - left <= f64::EPSILON * (1.0 + x.abs()) {
                break;
            }
        }
    }

    x
}
