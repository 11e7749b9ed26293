use faer::Mat;

/// The residual of a nonlinear system, `r(params, x)`.
///
/// `params` is opaque to the solver and forwarded unchanged to every
/// evaluation; `unknowns` and `out` always have the same length. The function
/// must be deterministic, and smooth enough for finite differencing to be
/// meaningful if no analytic Jacobian is supplied.
pub trait ResidualFn {
    /// Fill `out` with the residuals at `unknowns`.
    fn residual(&self, params: &[f64], unknowns: &[f64], out: &mut [f64]);
}

/// Plain functions and closures with the right shape are residual providers.
impl<F> ResidualFn for F
where
    F: Fn(&[f64], &[f64], &mut [f64]),
{
    fn residual(&self, params: &[f64], unknowns: &[f64], out: &mut [f64]) {
        self(params, unknowns, out)
    }
}

/// An analytic Jacobian for a [`ResidualFn`].
///
/// Supplying one skips the finite-difference assembly and its N extra
/// residual evaluations per Newton step. The entries must be consistent with
/// the residual function to working precision, otherwise the line search may
/// reject the computed direction as a roundoff problem.
pub trait JacobianFn {
    /// Fill the dense matrix `out` so that `out[(i, j)]` is the partial
    /// derivative of residual `i` with respect to unknown `j`.
    fn jacobian(&self, params: &[f64], unknowns: &[f64], out: &mut Mat<f64>);
}

/// Plain functions and closures with the right shape are Jacobian providers.
impl<F> JacobianFn for F
where
    F: Fn(&[f64], &[f64], &mut Mat<f64>),
{
    fn jacobian(&self, params: &[f64], unknowns: &[f64], out: &mut Mat<f64>) {
        self(params, unknowns, out)
    }
}
