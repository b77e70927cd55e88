//! Newton's method on a small nonlinear flow problem, with residuals
//! and Jacobian rows assembled from evaluations.
//!
//! Cells `0..n` on a line exchange fluid through faces with a
//! pressure-dependent mobility `λ(p) = 1 + 0.1·p²`. The left boundary
//! injects a fixed rate and the right boundary holds `p = 1`.
//!
//! Run with: `cargo run --example jacobian_assembly`

use densead::{AdMath, DenseAd, DynamicEvaluation, Evaluation, Packer, Unpacker};

type Eval = DynamicEvaluation<f64>;

const INJECTION: f64 = 2.0;
const BOUNDARY_PRESSURE: f64 = 1.0;

fn mobility(p: &Eval) -> Eval {
    p.powi(2) * 0.1 + 1.0
}

/// Residual of every cell; evaluation `i` carries row `i` of the
/// Jacobian.
fn residuals(pressures: &[f64]) -> Vec<Eval> {
    let n = pressures.len();
    let p: Vec<Eval> = pressures
        .iter()
        .enumerate()
        .map(|(i, &v)| Eval::variable(n, v, i))
        .collect();

    let mut r: Vec<Eval> = (0..n).map(|_| Eval::constant(n, 0.0)).collect();
    r[0] -= INJECTION;

    for face in 0..n - 1 {
        let (up, down) = (&p[face], &p[face + 1]);
        let lambda = (mobility(up) + mobility(down)) * 0.5;
        let flux = lambda * (up - down);
        r[face] += &flux;
        r[face + 1] -= &flux;
    }

    let last = &p[n - 1];
    r[n - 1] += mobility(last) * (last - BOUNDARY_PRESSURE);
    r
}

/// Solves `a x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x
}

fn main() {
    println!("=== Jacobian assembly with dynamic evaluations ===\n");

    let n = 5;
    let mut pressures = vec![BOUNDARY_PRESSURE; n];

    for iteration in 0..20 {
        let r = residuals(&pressures);
        let norm = r.iter().map(|e| e.value().abs()).fold(0.0, f64::max);
        println!("  iteration {iteration:2}: max |r| = {norm:.3e}");
        if norm < 1e-12 {
            break;
        }

        let jacobian: Vec<Vec<f64>> = r.iter().map(|e| e.derivatives().to_vec()).collect();
        let rhs: Vec<f64> = r.iter().map(|e| -e.value()).collect();
        let delta = solve(jacobian, rhs);
        for (p, dp) in pressures.iter_mut().zip(delta) {
            *p += dp;
        }
    }
    println!("\n  pressures = {pressures:.6?}\n");

    // The same local computation with a compile-time sized evaluation.
    println!("=== Face flux with a static evaluation ===\n");
    let up = Evaluation::<f64, 2>::variable(pressures[0], 0);
    let down = Evaluation::<f64, 2>::variable(pressures[1], 1);
    let lambda = ((up * up * 0.1 + 1.0) + (down * down * 0.1 + 1.0)) * 0.5;
    let flux = lambda * (up - down);
    println!("  flux            = {flux}");
    println!("  ∂flux/∂p_up     = {:.6}", flux.derivative(0));
    println!("  ∂flux/∂p_down   = {:.6}\n", flux.derivative(1));

    // Checkpoint the residuals of the converged state and restore them.
    println!("=== Checkpoint round trip ===\n");
    let mut r = residuals(&pressures);
    let mut packer = Packer::with_capacity(n * (n + 1));
    for e in r.iter_mut() {
        packer.pack(e);
    }
    let buffer = packer.into_inner();

    let mut restored: Vec<Eval> = (0..n).map(|_| Eval::blank(n)).collect();
    let mut unpacker = Unpacker::new(&buffer);
    let restore = restored
        .iter_mut()
        .try_for_each(|e| unpacker.unpack(e).map(|_| ()))
        .and_then(|()| unpacker.finish());
    match restore {
        Ok(()) => println!("  restored {} elements", buffer.len()),
        Err(err) => println!("  checkpoint failed: {err}"),
    }
    println!("  identical: {}", restored == r);
}
