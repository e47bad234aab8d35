//! # microgpt-core
//!
//! Character-level GPT built on a scalar reverse-mode autograd engine: config-driven,
//! trait-based, with one transformer definition shared by training and inference.
//!
//! - [`autograd`]: the [`Arithmetic`](autograd::Arithmetic) backend trait, the arena
//!   [`Graph`](autograd::Graph) and the plain-float backend.
//! - [`nn`]: `linear`, `softmax`, `rmsnorm`.
//! - [`model`]: parameters, hyperparameters, KV cache and the forward pass.
//! - [`optim`]: Adam.
//! - [`train`]: the training loop, best-snapshot tracking and the full training pipeline.
//! - [`checkpoint`]: JSON persistence.
//! - [`generate`]: temperature sampling.
//! - [`config`], [`data`], [`tokenizer`]: environment config, corpus loading, vocabulary.

pub mod autograd;
pub mod checkpoint;
pub mod config;
pub mod data;
pub mod generate;
pub mod model;
pub mod nn;
pub mod optim;
pub mod tokenizer;
pub mod train;
