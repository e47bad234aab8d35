//! Vector primitives built from [`Arithmetic`] operations: `linear`, `softmax`, `rmsnorm`.
//!
//! Each function is generic over the backend, so the differentiable and plain forward passes
//! share one definition.

use crate::autograd::Arithmetic;

/// RMSNorm epsilon. There are no learned scale or bias parameters.
pub const RMSNORM_EPS: f64 = 1e-5;

/// Matrix-vector product `w @ x` for `w` of shape `[out_dim, in_dim]`. No bias.
pub fn linear<A: Arithmetic>(ops: &mut A, x: &[A::Value], w: &[Vec<A::Value>]) -> Vec<A::Value> {
    w.iter()
        .map(|row| {
            let mut sum = ops.constant(0.0);
            for (&wi, &xi) in row.iter().zip(x) {
                let prod = ops.mul(wi, xi);
                sum = ops.add(sum, prod);
            }
            sum
        })
        .collect()
}

/// Logits to probabilities. The max is subtracted (as a constant) for numerical stability.
pub fn softmax<A: Arithmetic>(ops: &mut A, logits: &[A::Value]) -> Vec<A::Value> {
    let max_val = logits
        .iter()
        .map(|&v| ops.data(v))
        .fold(f64::NEG_INFINITY, f64::max);
    let max_v = ops.constant(max_val);

    let exps: Vec<A::Value> = logits
        .iter()
        .map(|&l| {
            let shifted = ops.sub(l, max_v);
            ops.exp(shifted)
        })
        .collect();
    let mut total = ops.constant(0.0);
    for &e in &exps {
        total = ops.add(total, e);
    }
    exps.into_iter().map(|e| ops.div(e, total)).collect()
}

/// Scales `x` by `(mean(x_i^2) + eps)^(-1/2)`.
pub fn rmsnorm<A: Arithmetic>(ops: &mut A, x: &[A::Value]) -> Vec<A::Value> {
    let mut ms = ops.constant(0.0);
    for &xi in x {
        let sq = ops.mul(xi, xi);
        ms = ops.add(ms, sq);
    }
    let n = ops.constant(x.len() as f64);
    ms = ops.div(ms, n);

    let eps = ops.constant(RMSNORM_EPS);
    let shifted = ops.add(ms, eps);
    let scale = ops.pow(shifted, -0.5);
    x.iter().map(|&xi| ops.mul(xi, scale)).collect()
}
