use faer::{ColRef, Mat, prelude::Solve};

use crate::{
    error::SolveError,
    system::{JacobianFn, ResidualFn},
    warnings::{Warning, WarningContent},
};

mod line_search;

use line_search::LineSearchOutcome;

/// Per-call solver settings.
///
/// A `Config` is owned by the caller and read only for the duration of one
/// solve, so concurrent solves with different settings cannot interfere.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Maximum number of Newton steps before giving up with
    /// [`SolveError::DidNotConverge`].
    pub max_iterations: usize,
    /// The solve succeeds once the largest absolute residual drops below
    /// this.
    pub convergence_tolerance: f64,
    /// Perturbation applied to each unknown when assembling the
    /// finite-difference Jacobian.
    pub fd_step: f64,
    /// Damp each Newton step with a backtracking line search on the merit
    /// function `0.5 * ||r||^2`, making the iteration globally convergent.
    pub step_length_control: bool,
    /// Emit per-iteration residuals, unknowns and Jacobians through [`log`].
    pub log_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            convergence_tolerance: 1e-8,
            fd_step: 1e-8,
            step_length_control: false,
            log_progress: false,
        }
    }
}

impl Config {
    /// Set the Newton iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
    /// Set the tolerance on the largest absolute residual.
    pub fn with_convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }
    /// Set the finite-difference perturbation.
    pub fn with_fd_step(mut self, fd_step: f64) -> Self {
        self.fd_step = fd_step;
        self
    }
    /// Enable or disable the step-length-controlled (line-searched) update.
    pub fn with_step_length_control(mut self, enabled: bool) -> Self {
        self.step_length_control = enabled;
        self
    }
    /// Enable or disable per-iteration progress logging.
    pub fn with_log_progress(mut self, enabled: bool) -> Self {
        self.log_progress = enabled;
        self
    }
}

/// What a successful solve reports back.
#[derive(Debug)]
pub struct SuccessfulSolve {
    /// Newton steps actually taken. Zero means the initial guess already
    /// satisfied the tolerance and the unknowns were returned untouched.
    pub iterations: usize,
    /// Non-fatal events observed along the way, in iteration order.
    pub warnings: Vec<Warning>,
}

/// Solve `r(params, x) = 0` for `x`, assembling the Jacobian by forward
/// finite differences.
///
/// `unknowns` is the initial guess and is updated in place; on success it
/// satisfies `max_i |r_i| < config.convergence_tolerance`. Each Newton step
/// costs N extra residual evaluations for the finite-difference columns.
pub fn solve(
    residual: &dyn ResidualFn,
    params: &[f64],
    unknowns: &mut [f64],
    config: Config,
) -> Result<SuccessfulSolve, SolveError> {
    newton_iterate(residual, None, params, unknowns, config)
}

/// Like [`solve`], but with an analytic Jacobian instead of finite
/// differences.
pub fn solve_with_jacobian(
    residual: &dyn ResidualFn,
    jacobian: &dyn JacobianFn,
    params: &[f64],
    unknowns: &mut [f64],
    config: Config,
) -> Result<SuccessfulSolve, SolveError> {
    newton_iterate(residual, Some(jacobian), params, unknowns, config)
}

fn newton_iterate(
    residual: &dyn ResidualFn,
    jacobian_fn: Option<&dyn JacobianFn>,
    params: &[f64],
    unknowns: &mut [f64],
    config: Config,
) -> Result<SuccessfulSolve, SolveError> {
    let n = unknowns.len();

    let mut residuals = vec![0.0; n];
    let mut fd_scratch = vec![0.0; n];
    let mut gradient = vec![0.0; n];
    let mut direction = vec![0.0; n];
    let mut x_old = vec![0.0; n];
    let mut jacobian = Mat::<f64>::zeros(n, n);
    let mut warnings = Vec::new();

    let mut half_residual_squared = 0.0;
    let mut step_cap = 0.0;
    let mut iterations = 0;

    for _ in 0..config.max_iterations {
        residual.residual(params, unknowns, &mut residuals);

        // The merit value and step cap are only needed by the line search.
        if config.step_length_control {
            half_residual_squared = 0.5 * residuals.iter().map(|r| r * r).sum::<f64>();
            let x_norm = unknowns.iter().map(|x| x * x).sum::<f64>().sqrt();
            step_cap = 100.0 * libm::fmax(x_norm, n as f64);
        }

        let max_res = residuals
            .iter()
            .map(|r| r.abs())
            .reduce(libm::fmax)
            .ok_or(SolveError::EmptySystemNotAllowed)?;

        if config.log_progress {
            log::debug!("Newton iteration {iterations}: max residual {max_res:.3e}");
            log::debug!("i residual[i] unknown[i]");
            for (i, (r, u)) in residuals.iter().zip(unknowns.iter()).enumerate() {
                log::debug!("{i} {r} {u}");
            }
        }

        // Converged? Checked before the counter increments, so an initial
        // guess that already satisfies the tolerance reports zero iterations
        // and does no Jacobian or linear-solve work at all.
        if max_res < config.convergence_tolerance {
            return Ok(SuccessfulSolve {
                iterations,
                warnings,
            });
        }

        iterations += 1;

        match jacobian_fn {
            None => fd_jacobian(
                residual,
                params,
                unknowns,
                &residuals,
                &mut fd_scratch,
                config.fd_step,
                &mut jacobian,
            ),
            Some(jac) => {
                jacobian.fill(0.0);
                jac.jacobian(params, unknowns, &mut jacobian);
            }
        }

        if config.log_progress {
            log::debug!("Jacobian:");
            for row in 0..n {
                let entries: Vec<f64> = (0..n).map(|col| jacobian[(row, col)]).collect();
                log::debug!("{entries:?}");
            }
        }

        // Merit-function gradient J^T r, used to check the Newton direction
        // is a descent direction.
        if config.step_length_control {
            for (i, g) in gradient.iter_mut().enumerate() {
                let mut sum = 0.0;
                for (j, r) in residuals.iter().enumerate() {
                    sum += jacobian[(j, i)] * r;
                }
                *g = sum;
            }
        }

        // Solve J d = r for the Newton direction. Dense full-pivot LU never
        // reports failure itself; a singular system shows up as a non-finite
        // direction.
        let lu = jacobian.full_piv_lu();
        let step = lu.solve(ColRef::from_slice(&residuals));
        for (d, s) in direction.iter_mut().zip(step.iter()) {
            *d = *s;
        }
        if direction.iter().any(|d| !d.is_finite()) {
            return Err(SolveError::SingularJacobian);
        }

        if config.step_length_control {
            // Negate so the direction points downhill for the merit function,
            // then let the line search pick the step length.
            for d in direction.iter_mut() {
                *d = -*d;
            }
            x_old.copy_from_slice(unknowns);
            let outcome = line_search::line_search(
                residual,
                params,
                &x_old,
                half_residual_squared,
                &gradient,
                &mut direction,
                unknowns,
                step_cap,
            )?;
            match outcome {
                LineSearchOutcome::Accepted { lambda, merit } => {
                    if config.log_progress {
                        log::debug!(
                            "Line search accepted step length {lambda:.3e}, merit {merit:.3e}"
                        );
                    }
                }
                LineSearchOutcome::ConvergedOnXOnly => {
                    log::warn!(
                        "Line search converged on x only at Newton iteration {iterations}; keeping the previous iterate"
                    );
                    warnings.push(Warning {
                        iteration: iterations,
                        content: WarningContent::LineSearchConvergedOnXOnly,
                    });
                }
            }
        } else {
            // Plain full Newton step, no safeguarding.
            for (x, d) in unknowns.iter_mut().zip(direction.iter()) {
                *x -= d;
            }
        }
    }

    Err(SolveError::DidNotConverge {
        iterations: config.max_iterations,
    })
}

/// Column-by-column forward-difference Jacobian.
///
/// Each unknown is perturbed by `fd_step`, the residuals are re-evaluated,
/// and the unknown is restored, so column `i` holds
/// `(r(x + fd_step e_i) - r(x)) / fd_step`.
pub(crate) fn fd_jacobian(
    residual: &dyn ResidualFn,
    params: &[f64],
    unknowns: &mut [f64],
    base_residuals: &[f64],
    scratch: &mut [f64],
    fd_step: f64,
    jacobian: &mut Mat<f64>,
) {
    let n = unknowns.len();
    for i in 0..n {
        let backup = unknowns[i];
        unknowns[i] += fd_step;
        residual.residual(params, unknowns, scratch);
        for j in 0..n {
            jacobian[(j, i)] = (scratch[j] - base_residuals[j]) / fd_step;
        }
        unknowns[i] = backup;
    }
}
