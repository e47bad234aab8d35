//! Autograd: a numeric-backend abstraction with a differentiable and a plain implementation.
//!
//! The transformer is written once against [`Arithmetic`]. Instantiated over [`Graph`] every
//! operation records a node in a per-pass arena, and [`Graph::backward`] propagates gradients
//! from a loss node to every leaf in reverse topological order. Instantiated over [`Plain`] the
//! same code runs on bare `f64`s with no bookkeeping, which is what inference uses.
//!
//! Derived operations ([`Arithmetic::neg`], [`Arithmetic::sub`], [`Arithmetic::div`]) are
//! default methods built from the primitives, so both backends evaluate them with exactly the
//! same sequence of floating-point operations.

pub mod impls;

pub use impls::graph::{Graph, NodeId};
pub use impls::plain::Plain;

/// A numeric backend: a value type plus the primitive operations the model needs.
///
/// Values are small `Copy` handles (`f64` for [`Plain`], [`NodeId`] for [`Graph`]); the backend
/// itself owns whatever storage they refer to, hence `&mut self` on every constructor.
///
/// Division by zero and `log` of non-positive numbers are not guarded: they yield `inf`/`NaN`
/// exactly as the underlying `f64` operations do.
pub trait Arithmetic {
    /// Handle to one scalar in this backend.
    type Value: Copy;

    /// Wraps a constant (no gradient flows into it).
    fn constant(&mut self, x: f64) -> Self::Value;

    /// Returns the forward value of `v`.
    fn data(&self, v: Self::Value) -> f64;

    /// `a + b`.
    fn add(&mut self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// `a * b`.
    fn mul(&mut self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// `a^exp` for a constant exponent.
    fn pow(&mut self, a: Self::Value, exp: f64) -> Self::Value;

    /// Natural logarithm.
    fn log(&mut self, a: Self::Value) -> Self::Value;

    /// Exponential.
    fn exp(&mut self, a: Self::Value) -> Self::Value;

    /// `max(0, a)`.
    fn relu(&mut self, a: Self::Value) -> Self::Value;

    /// `-a`, computed as `a * -1`.
    fn neg(&mut self, a: Self::Value) -> Self::Value {
        let minus_one = self.constant(-1.0);
        self.mul(a, minus_one)
    }

    /// `a - b`, computed as `a + (-b)`.
    fn sub(&mut self, a: Self::Value, b: Self::Value) -> Self::Value {
        let neg_b = self.neg(b);
        self.add(a, neg_b)
    }

    /// `a / b`, computed as `a * b^-1`.
    fn div(&mut self, a: Self::Value, b: Self::Value) -> Self::Value {
        let inv_b = self.pow(b, -1.0);
        self.mul(a, inv_b)
    }
}
