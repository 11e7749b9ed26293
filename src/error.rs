/// Errors that abort a solve.
///
/// Every variant is fatal: the solve stops immediately and the unknowns are
/// left at whatever iterate they had reached. There is no retry logic inside
/// the solver; callers may retry with a different [`Config`](crate::Config)
/// or a better initial guess.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SolveError {
    /// The iteration budget ran out before the largest absolute residual
    /// dropped below tolerance. Consider raising the iterations, enabling
    /// step-length control, or improving the initial guess.
    #[error("Newton solver did not converge in {iterations} iterations")]
    DidNotConverge {
        /// The iteration budget that was exhausted.
        iterations: usize,
    },
    /// The line search was handed a direction that is not a descent direction
    /// for the merit function. This should not happen when the Jacobian is
    /// consistent with the residual function to working precision, so it
    /// signals an upstream bug rather than a property of the problem.
    #[error("Roundoff problem in line search: slope = {slope}")]
    RoundoffProblem {
        /// The offending directional derivative; it should have been negative.
        slope: f64,
    },
    /// The Jacobian could not be inverted to produce a Newton direction.
    #[error("Jacobian is singular, cannot solve for the Newton direction")]
    SingularJacobian,
    /// You passed a zero-length unknowns vector.
    #[error("Cannot solve an empty system")]
    EmptySystemNotAllowed,
}
