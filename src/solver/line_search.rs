use crate::{error::SolveError, system::ResidualFn};

/// Armijo sufficient-decrease constant.
const SUFFICIENT_DECREASE: f64 = 1e-4;

/// Relative scale below which step lengths cannot be resolved in floating
/// point against the iterate's own magnitude.
const CONVERGENCE_TOL_ON_X: f64 = 1e-16;

/// How a line search ended.
#[derive(Debug)]
pub(crate) enum LineSearchOutcome {
    /// A step length satisfying the sufficient-decrease condition was found
    /// and `x` holds the new iterate.
    Accepted {
        /// The accepted step length multiplier.
        lambda: f64,
        /// The merit value at the accepted iterate.
        merit: f64,
    },
    /// No admissible step length gave a sufficient decrease; `x` was restored
    /// to the old iterate. Not an error: the outer loop re-evaluates from
    /// there and may still converge later.
    ConvergedOnXOnly,
}

/// Backtracking line search with quadratic/cubic interpolation.
///
/// Finds a step length `lambda` in `(0, 1]` along `direction` from `x_old`
/// such that the merit function `0.5 * ||r||^2` decreases by at least the
/// Armijo fraction of what its linear model predicts. `direction` is capped
/// at `step_cap` in Euclidean norm before anything else, so no single step
/// can be unphysically large.
pub(crate) fn line_search(
    residual: &dyn ResidualFn,
    params: &[f64],
    x_old: &[f64],
    merit_old: f64,
    gradient: &[f64],
    direction: &mut [f64],
    x: &mut [f64],
    step_cap: f64,
) -> Result<LineSearchOutcome, SolveError> {
    let n = x_old.len();
    let mut residuals = vec![0.0; n];

    let norm = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
    if norm > step_cap {
        let scale = step_cap / norm;
        for d in direction.iter_mut() {
            *d *= scale;
        }
    }

    let slope: f64 = gradient
        .iter()
        .zip(direction.iter())
        .map(|(g, d)| g * d)
        .sum();
    if slope >= 0.0 {
        return Err(SolveError::RoundoffProblem { slope });
    }

    // The smallest lambda worth trying, relative to the iterate's own scale.
    let mut scale_test = 0.0;
    for (d, x0) in direction.iter().zip(x_old.iter()) {
        let temp = d.abs() / libm::fmax(x0.abs(), 1.0);
        if temp > scale_test {
            scale_test = temp;
        }
    }
    let lambda_min = CONVERGENCE_TOL_ON_X / scale_test;

    let mut lambda: f64 = 1.0;
    let mut first_backtrack = true;
    let mut lambda_prev = 0.0;
    let mut merit_prev = 0.0;

    loop {
        for ((xi, x0), d) in x.iter_mut().zip(x_old.iter()).zip(direction.iter()) {
            *xi = x0 + lambda * d;
        }
        residual.residual(params, x, &mut residuals);
        let merit = 0.5 * residuals.iter().map(|r| r * r).sum::<f64>();

        if lambda < lambda_min {
            // Stagnated: the step has shrunk below what floating point can
            // resolve against x itself. Hand back the old iterate unchanged.
            x.copy_from_slice(x_old);
            return Ok(LineSearchOutcome::ConvergedOnXOnly);
        }
        if merit <= merit_old + SUFFICIENT_DECREASE * lambda * slope {
            return Ok(LineSearchOutcome::Accepted { lambda, merit });
        }

        let proposed = if first_backtrack {
            // Minimizer of the quadratic through (0, merit_old), slope at 0,
            // and (lambda, merit).
            -slope / (2.0 * (merit - merit_old - slope))
        } else {
            // Fit a cubic through the last two trials and the known slope,
            // and jump to its stationary point.
            let r1 = merit - merit_old - lambda * slope;
            let r2 = merit_prev - merit_old - lambda_prev * slope;
            let a = (r1 / (lambda * lambda) - r2 / (lambda_prev * lambda_prev))
                / (lambda - lambda_prev);
            let b = (-lambda_prev * r1 / (lambda * lambda)
                + lambda * r2 / (lambda_prev * lambda_prev))
                / (lambda - lambda_prev);
            #[allow(clippy::float_cmp)]
            let mut proposed = if a == 0.0 {
                // The cubic degenerated to a quadratic.
                -slope / (2.0 * b)
            } else {
                let discriminant = b * b - 3.0 * a * slope;
                if discriminant < 0.0 {
                    0.5 * lambda
                } else if b <= 0.0 {
                    (-b + discriminant.sqrt()) / (3.0 * a)
                } else {
                    -slope / (b + discriminant.sqrt())
                }
            };
            // Never jump to more than half the previous step.
            if proposed > 0.5 * lambda {
                proposed = 0.5 * lambda;
            }
            proposed
        };

        first_backtrack = false;
        lambda_prev = lambda;
        merit_prev = merit;
        // And never shrink below a tenth of it, to avoid stagnating.
        lambda = libm::fmax(proposed, 0.1 * lambda);
    }
}
