//! Model parameters and the transformer forward pass.
//!
//! [`StateDict`] is generic over the scalar it stores: `StateDict<f64>` is the persistent,
//! optimizer-owned copy; `StateDict<NodeId>` is the same layout registered as leaves of one
//! training [`Graph`](crate::autograd::Graph). `wte` is stored once and used both as the input
//! embedding table and as the output projection.

mod error;
mod forward;

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::tokenizer::{CharTokenizer, Tokenizer};

pub use error::ModelError;
pub use forward::{forward, KvCache};

/// MLP hidden width as a multiple of `n_embd`.
pub const MLP_RATIO: usize = 4;

/// Per-layer matrix names, in flattening order.
pub const LAYER_MATRIX_NAMES: [&str; 6] = [
    "attn_wq", "attn_wk", "attn_wv", "attn_wo", "mlp_fc1", "mlp_fc2",
];

/// Row-major `[out_dim][in_dim]` matrix.
pub type Matrix<V> = Vec<Vec<V>>;

/// Shape of the network. Persisted verbatim in checkpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperparams {
    pub n_embd: usize,
    pub n_layer: usize,
    pub n_head: usize,
    pub block_size: usize,
    pub head_dim: usize,
}

impl Hyperparams {
    #[must_use]
    pub fn new(n_embd: usize, n_layer: usize, n_head: usize, block_size: usize) -> Self {
        Hyperparams {
            n_embd,
            n_layer,
            n_head,
            block_size,
            head_dim: if n_head == 0 { 0 } else { n_embd / n_head },
        }
    }

    /// Width of the MLP hidden layer.
    #[must_use]
    pub fn mlp_dim(&self) -> usize {
        MLP_RATIO * self.n_embd
    }

    /// # Errors
    ///
    /// [`ModelError::Hyperparams`] when a size is zero or `n_embd != n_head * head_dim`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_embd == 0 || self.n_layer == 0 || self.n_head == 0 || self.block_size == 0 {
            return Err(ModelError::Hyperparams(format!(
                "all sizes must be positive: {self:?}"
            )));
        }
        if self.n_head * self.head_dim != self.n_embd {
            return Err(ModelError::Hyperparams(format!(
                "n_embd ({}) != n_head ({}) * head_dim ({})",
                self.n_embd, self.n_head, self.head_dim
            )));
        }
        Ok(())
    }
}

impl From<&Config> for Hyperparams {
    fn from(c: &Config) -> Self {
        Hyperparams::new(c.n_embd, c.n_layer, c.n_head, c.block_size)
    }
}

/// Weights of one transformer block.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerWeights<V> {
    pub attn_wq: Matrix<V>,
    pub attn_wk: Matrix<V>,
    pub attn_wv: Matrix<V>,
    pub attn_wo: Matrix<V>,
    pub mlp_fc1: Matrix<V>,
    pub mlp_fc2: Matrix<V>,
}

impl<V> LayerWeights<V> {
    fn matrices(&self) -> [&Matrix<V>; 6] {
        [
            &self.attn_wq,
            &self.attn_wk,
            &self.attn_wv,
            &self.attn_wo,
            &self.mlp_fc1,
            &self.mlp_fc2,
        ]
    }

    fn matrices_mut(&mut self) -> [&mut Matrix<V>; 6] {
        [
            &mut self.attn_wq,
            &mut self.attn_wk,
            &mut self.attn_wv,
            &mut self.attn_wo,
            &mut self.mlp_fc1,
            &mut self.mlp_fc2,
        ]
    }
}

/// All named parameter matrices of the model.
#[derive(Clone, Debug, PartialEq)]
pub struct StateDict<V> {
    /// Token embedding, also the (tied) output projection. `[vocab_size][n_embd]`.
    pub wte: Matrix<V>,
    /// Positional embedding. `[block_size][n_embd]`.
    pub wpe: Matrix<V>,
    pub layers: Vec<LayerWeights<V>>,
}

impl<V> StateDict<V> {
    /// Builds every matrix in flattening order, asking `make(name, rows, cols)` for each.
    fn try_build<E>(
        hp: &Hyperparams,
        vocab_size: usize,
        mut make: impl FnMut(&str, usize, usize) -> Result<Matrix<V>, E>,
    ) -> Result<Self, E> {
        let (d, f) = (hp.n_embd, hp.mlp_dim());
        let wte = make("wte", vocab_size, d)?;
        let wpe = make("wpe", hp.block_size, d)?;
        let mut layers = Vec::with_capacity(hp.n_layer);
        for i in 0..hp.n_layer {
            let mut m = |suffix: &str, rows, cols| make(&format!("layer{i}.{suffix}"), rows, cols);
            layers.push(LayerWeights {
                attn_wq: m("attn_wq", d, d)?,
                attn_wk: m("attn_wk", d, d)?,
                attn_wv: m("attn_wv", d, d)?,
                attn_wo: m("attn_wo", d, d)?,
                mlp_fc1: m("mlp_fc1", f, d)?,
                mlp_fc2: m("mlp_fc2", d, f)?,
            });
        }
        Ok(StateDict { wte, wpe, layers })
    }

    /// Reassembles a state dict from named matrices, checking every name and shape.
    ///
    /// Unknown names are ignored with a warning.
    ///
    /// # Errors
    ///
    /// [`ModelError::MissingMatrix`] or [`ModelError::Shape`].
    pub fn from_named(
        hp: &Hyperparams,
        vocab_size: usize,
        mut named: BTreeMap<String, Matrix<V>>,
    ) -> Result<Self, ModelError> {
        let state = Self::try_build(hp, vocab_size, |name, rows, cols| {
            let Some(m) = named.remove(name) else {
                return Err(ModelError::MissingMatrix(name.to_string()));
            };
            let bad_row = m.iter().find(|row| row.len() != cols).map(Vec::len);
            if m.len() != rows || bad_row.is_some() {
                return Err(ModelError::Shape {
                    name: name.to_string(),
                    expected: (rows, cols),
                    found: (m.len(), bad_row),
                });
            }
            Ok(m)
        })?;
        for name in named.keys() {
            log::warn!("ignoring unknown matrix {name:?} in state dict");
        }
        Ok(state)
    }

    /// `(name, matrix)` pairs in flattening order, named as in checkpoints.
    #[must_use]
    pub fn named_matrices(&self) -> Vec<(String, &Matrix<V>)> {
        let mut out = vec![("wte".to_string(), &self.wte), ("wpe".to_string(), &self.wpe)];
        for (i, layer) in self.layers.iter().enumerate() {
            for (suffix, m) in LAYER_MATRIX_NAMES.iter().zip(layer.matrices()) {
                out.push((format!("layer{i}.{suffix}"), m));
            }
        }
        out
    }

    /// Every scalar, flattened in a fixed order (matrix order, then row-major).
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        [&self.wte, &self.wpe]
            .into_iter()
            .chain(self.layers.iter().flat_map(|l| l.matrices()))
            .flat_map(|m| m.iter().flatten())
    }

    /// Mutable counterpart of [`StateDict::values`], same order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        [&mut self.wte, &mut self.wpe]
            .into_iter()
            .chain(self.layers.iter_mut().flat_map(|l| l.matrices_mut()))
            .flat_map(|m| m.iter_mut().flatten())
    }

    /// Total number of scalar parameters.
    #[must_use]
    pub fn num_params(&self) -> usize {
        self.values().count()
    }

    /// Same layout, every scalar mapped through `f` (in [`StateDict::values`] order).
    pub fn map<U>(&self, f: &mut impl FnMut(&V) -> U) -> StateDict<U> {
        let mut map_matrix = |m: &Matrix<V>| -> Matrix<U> {
            m.iter().map(|row| row.iter().map(&mut *f).collect()).collect()
        };
        let wte = map_matrix(&self.wte);
        let wpe = map_matrix(&self.wpe);
        let layers = self
            .layers
            .iter()
            .map(|l| LayerWeights {
                attn_wq: map_matrix(&l.attn_wq),
                attn_wk: map_matrix(&l.attn_wk),
                attn_wv: map_matrix(&l.attn_wv),
                attn_wo: map_matrix(&l.attn_wo),
                mlp_fc1: map_matrix(&l.mlp_fc1),
                mlp_fc2: map_matrix(&l.mlp_fc2),
            })
            .collect();
        StateDict { wte, wpe, layers }
    }
}

impl StateDict<f64> {
    /// Gaussian init `N(0, init_std)`; `attn_wo` and `mlp_fc2` start at zero.
    ///
    /// # Errors
    ///
    /// [`ModelError::InitStd`] when `init_std` is negative or not finite.
    pub fn init<R: Rng + ?Sized>(
        hp: &Hyperparams,
        vocab_size: usize,
        init_std: f64,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        if !(init_std.is_finite() && init_std >= 0.0) {
            return Err(ModelError::InitStd(init_std));
        }
        let normal = Normal::new(0.0, init_std).map_err(|_| ModelError::InitStd(init_std))?;
        Self::try_build(hp, vocab_size, |name, rows, cols| {
            let zero = name.ends_with("attn_wo") || name.ends_with("mlp_fc2");
            Ok((0..rows)
                .map(|_| {
                    (0..cols)
                        .map(|_| if zero { 0.0 } else { normal.sample(rng) })
                        .collect()
                })
                .collect())
        })
    }

    /// Named matrices as owned floats, ready for serialization.
    #[must_use]
    pub fn to_named(&self) -> BTreeMap<String, Matrix<f64>> {
        self.named_matrices()
            .into_iter()
            .map(|(name, m)| (name, m.clone()))
            .collect()
    }
}

/// A trained model: shape, vocabulary and plain-float weights.
#[derive(Clone, Debug)]
pub struct Model {
    pub hyperparams: Hyperparams,
    pub tokenizer: CharTokenizer,
    pub state: StateDict<f64>,
}

impl Model {
    /// Fresh randomly initialised model for `tokenizer`'s vocabulary.
    ///
    /// # Errors
    ///
    /// [`ModelError`] for inconsistent hyperparameters or an invalid `init_std`.
    pub fn init<R: Rng + ?Sized>(
        hyperparams: Hyperparams,
        tokenizer: CharTokenizer,
        init_std: f64,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        hyperparams.validate()?;
        let state = StateDict::init(&hyperparams, tokenizer.vocab_size(), init_std, rng)?;
        Ok(Model {
            hyperparams,
            tokenizer,
            state,
        })
    }

    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.vocab_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hp() -> Hyperparams {
        Hyperparams::new(8, 2, 2, 6)
    }

    #[test]
    fn hyperparams_derive_head_dim_and_validate() {
        let h = hp();
        assert_eq!(h.head_dim, 4);
        assert_eq!(h.mlp_dim(), 32);
        assert!(h.validate().is_ok());
        let bad = Hyperparams {
            head_dim: 3,
            ..h
        };
        assert!(matches!(bad.validate(), Err(ModelError::Hyperparams(_))));
        assert!(Hyperparams::new(8, 0, 2, 6).validate().is_err());
    }

    #[test]
    fn init_shapes_and_param_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = StateDict::init(&hp(), 10, 0.02, &mut rng).unwrap();
        assert_eq!(state.wte.len(), 10);
        assert_eq!(state.wpe.len(), 6);
        assert_eq!(state.layers.len(), 2);
        assert_eq!(state.layers[0].mlp_fc1.len(), 32);
        assert_eq!(state.layers[0].mlp_fc2[0].len(), 32);
        let expected = 10 * 8 + 6 * 8 + 2 * (4 * 8 * 8 + 32 * 8 + 8 * 32);
        assert_eq!(state.num_params(), expected);
    }

    #[test]
    fn init_zeroes_output_projections() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = StateDict::init(&hp(), 5, 0.5, &mut rng).unwrap();
        for layer in &state.layers {
            assert!(layer.attn_wo.iter().flatten().all(|&w| w == 0.0));
            assert!(layer.mlp_fc2.iter().flatten().all(|&w| w == 0.0));
            assert!(layer.attn_wq.iter().flatten().any(|&w| w != 0.0));
        }
    }

    #[test]
    fn init_rejects_negative_std() {
        let mut rng = StdRng::seed_from_u64(7);
        let res = StateDict::init(&hp(), 5, -1.0, &mut rng);
        assert_eq!(res.unwrap_err(), ModelError::InitStd(-1.0));
        for bad in [-1e-9, f64::INFINITY, f64::NAN] {
            assert!(matches!(
                StateDict::init(&hp(), 5, bad, &mut rng),
                Err(ModelError::InitStd(_))
            ));
        }
        let tokenizer = CharTokenizer::from_docs(&["ab"]);
        assert!(matches!(
            Model::init(hp(), tokenizer, -0.02, &mut rng),
            Err(ModelError::InitStd(_))
        ));
    }

    #[test]
    fn init_accepts_zero_std() {
        let state = StateDict::init(&hp(), 5, 0.0, &mut StdRng::seed_from_u64(7)).unwrap();
        assert!(state.values().all(|&w| w == 0.0));
    }

    #[test]
    fn init_is_deterministic_per_seed() {
        let a = StateDict::init(&hp(), 5, 0.02, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = StateDict::init(&hp(), 5, 0.02, &mut StdRng::seed_from_u64(3)).unwrap();
        let c = StateDict::init(&hp(), 5, 0.02, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn named_matrices_use_checkpoint_names() {
        let state = StateDict::init(&hp(), 5, 0.02, &mut StdRng::seed_from_u64(1)).unwrap();
        let names: Vec<String> = state.named_matrices().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), 2 + 2 * 6);
        assert_eq!(names[0], "wte");
        assert_eq!(names[1], "wpe");
        assert_eq!(names[2], "layer0.attn_wq");
        assert_eq!(names[13], "layer1.mlp_fc2");
    }

    #[test]
    fn values_and_values_mut_share_order() {
        let mut state = StateDict::init(&hp(), 5, 0.1, &mut StdRng::seed_from_u64(1)).unwrap();
        let before: Vec<f64> = state.values().copied().collect();
        for (i, v) in state.values_mut().enumerate() {
            *v = i as f64;
        }
        let after: Vec<f64> = state.values().copied().collect();
        assert_eq!(before.len(), after.len());
        assert!(after.iter().enumerate().all(|(i, &v)| v == i as f64));
        assert_eq!(state.wte[0][1], 1.0);
    }

    #[test]
    fn map_preserves_layout_and_order() {
        let state = StateDict::init(&hp(), 5, 0.1, &mut StdRng::seed_from_u64(1)).unwrap();
        let mut counter = 0usize;
        let indexed = state.map(&mut |_| {
            counter += 1;
            counter - 1
        });
        let order: Vec<usize> = indexed.values().copied().collect();
        assert!(order.iter().enumerate().all(|(i, &v)| i == v));
        assert_eq!(indexed.layers[1].mlp_fc1.len(), 32);
    }

    #[test]
    fn from_named_round_trips_and_reports_problems() {
        let h = hp();
        let state = StateDict::init(&h, 5, 0.1, &mut StdRng::seed_from_u64(1)).unwrap();
        let rebuilt = StateDict::from_named(&h, 5, state.to_named()).unwrap();
        assert_eq!(rebuilt, state);

        let mut missing = state.to_named();
        missing.remove("layer1.attn_wv");
        assert_eq!(
            StateDict::from_named(&h, 5, missing).unwrap_err(),
            ModelError::MissingMatrix("layer1.attn_wv".to_string())
        );

        let mut ragged = state.to_named();
        if let Some(m) = ragged.get_mut("wpe") {
            m[2].pop();
        }
        assert!(matches!(
            StateDict::from_named(&h, 5, ragged),
            Err(ModelError::Shape { name, found: (6, Some(7)), .. }) if name == "wpe"
        ));

        let mut extra = state.to_named();
        extra.insert("lm_head".to_string(), vec![vec![0.0]]);
        assert!(StateDict::from_named(&h, 5, extra).is_ok());
    }
}
