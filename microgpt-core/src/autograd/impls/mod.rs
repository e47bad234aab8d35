//! Implementations of [`Arithmetic`](super::Arithmetic).
//!
//! One file per backend: [`graph`] records a differentiable arena, [`plain`] evaluates bare floats.

pub mod graph;
pub mod plain;
