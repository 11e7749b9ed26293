//! A globally convergent Newton solver for black-box nonlinear systems.
//!
//! Given a residual function `r(params, x)` with as many components as there
//! are unknowns, [`solve`] drives `x` to a root of `r` with damped Newton
//! iterations. The Jacobian is either assembled by forward finite differences
//! (the residual function is treated as a black box) or supplied analytically
//! via [`solve_with_jacobian`]. Enabling
//! [step-length control](Config::with_step_length_control) guards each Newton
//! step with a backtracking line search on the merit function
//! `0.5 * ||r||^2`, which makes the iteration globally convergent even from
//! poor initial guesses.
//!
//! ```
//! use global_newton::{Config, solve};
//!
//! // Find the positive root of x^2 - 2, treating the residual as a black box.
//! let residual = |_params: &[f64], x: &[f64], out: &mut [f64]| {
//!     out[0] = x[0] * x[0] - 2.0;
//! };
//! let mut x = vec![1.0];
//! let outcome = solve(&residual, &[], &mut x, Config::default()).unwrap();
//! assert!((x[0] - 2.0_f64.sqrt()).abs() < 1e-7);
//! assert!(outcome.iterations <= 8);
//! ```

pub use crate::error::SolveError;
pub use crate::solver::{Config, SuccessfulSolve, solve, solve_with_jacobian};
pub use crate::system::{JacobianFn, ResidualFn};
pub use crate::warnings::{Warning, WarningContent};

/// Fatal solver errors.
mod error;
/// The Newton driver and its line search.
mod solver;
/// Residual and Jacobian provider traits.
mod system;
/// Non-fatal events reported alongside a successful solve.
mod warnings;
