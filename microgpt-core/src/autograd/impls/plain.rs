//! Plain backend: the same operations on bare `f64`, with no graph and no gradients.

use crate::autograd::Arithmetic;

/// Gradient-free backend used at inference time.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

impl Arithmetic for Plain {
    type Value = f64;

    fn constant(&mut self, x: f64) -> f64 {
        x
    }

    fn data(&self, v: f64) -> f64 {
        v
    }

    fn add(&mut self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn mul(&mut self, a: f64, b: f64) -> f64 {
        a * b
    }

    fn pow(&mut self, a: f64, exp: f64) -> f64 {
        a.powf(exp)
    }

    fn log(&mut self, a: f64) -> f64 {
        a.ln()
    }

    fn exp(&mut self, a: f64) -> f64 {
        a.exp()
    }

    fn relu(&mut self, a: f64) -> f64 {
        a.max(0.0)
    }
}
