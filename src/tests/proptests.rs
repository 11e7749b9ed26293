use faer::Mat;
use proptest::prelude::*;

use crate::{Config, solve_with_jacobian, solver::fd_jacobian};

proptest! {
    // Diagonally dominant 2x2 systems are far from singular, so a single
    // Newton step with the exact Jacobian lands on the root no matter where
    // the iteration starts.
    #[test]
    fn well_conditioned_linear_systems_converge_in_one_step(
        a01 in -1.0..1.0_f64,
        a10 in -1.0..1.0_f64,
        b0 in -5.0..5.0_f64,
        b1 in -5.0..5.0_f64,
        x0 in -10.0..10.0_f64,
        x1 in -10.0..10.0_f64,
    ) {
        let a = [[4.0, a01], [a10, 3.0]];
        let residual = move |_params: &[f64], x: &[f64], out: &mut [f64]| {
            out[0] = a[0][0] * x[0] + a[0][1] * x[1] - b0;
            out[1] = a[1][0] * x[0] + a[1][1] * x[1] - b1;
        };
        let jacobian = move |_params: &[f64], _x: &[f64], out: &mut Mat<f64>| {
            out[(0, 0)] = a[0][0];
            out[(0, 1)] = a[0][1];
            out[(1, 0)] = a[1][0];
            out[(1, 1)] = a[1][1];
        };

        let mut x = vec![x0, x1];
        let outcome =
            solve_with_jacobian(&residual, &jacobian, &[], &mut x, Config::default()).unwrap();
        prop_assert!(outcome.iterations <= 1);

        let mut r = vec![0.0; 2];
        residual(&[], &x, &mut r);
        prop_assert!(r[0].abs() < 1e-8);
        prop_assert!(r[1].abs() < 1e-8);
    }

    // Forward differences track the analytic Jacobian to O(fd_step) on a
    // smooth residual, wherever it is evaluated.
    #[test]
    fn fd_jacobian_tracks_the_analytic_jacobian(
        x in -1.5..1.5_f64,
        y in -1.5..1.5_f64,
    ) {
        let residual = |_params: &[f64], u: &[f64], out: &mut [f64]| {
            out[0] = u[0].sin() * u[1];
            out[1] = u[0] * u[0] + u[1].exp();
        };
        let mut unknowns = vec![x, y];
        let mut base = vec![0.0; 2];
        residual(&[], &unknowns, &mut base);

        let mut scratch = vec![0.0; 2];
        let mut jac = Mat::<f64>::zeros(2, 2);
        fd_jacobian(&residual, &[], &mut unknowns, &base, &mut scratch, 1e-8, &mut jac);

        prop_assert!((jac[(0, 0)] - x.cos() * y).abs() < 1e-4);
        prop_assert!((jac[(0, 1)] - x.sin()).abs() < 1e-4);
        prop_assert!((jac[(1, 0)] - 2.0 * x).abs() < 1e-4);
        prop_assert!((jac[(1, 1)] - y.exp()).abs() < 1e-4);
    }
}
