//! Single-position transformer forward pass, generic over the numeric backend.

use crate::autograd::Arithmetic;
use crate::nn::{linear, rmsnorm, softmax};

use super::{Hyperparams, StateDict};

/// Keys and values of every position processed so far, one list per layer.
///
/// Owned by a single sequence (a training document or a generated sample) and dropped with it.
#[derive(Clone, Debug)]
pub struct KvCache<V> {
    keys: Vec<Vec<Vec<V>>>,
    values: Vec<Vec<Vec<V>>>,
}

impl<V> KvCache<V> {
    #[must_use]
    pub fn new(n_layer: usize) -> Self {
        KvCache {
            keys: (0..n_layer).map(|_| Vec::new()).collect(),
            values: (0..n_layer).map(|_| Vec::new()).collect(),
        }
    }

    /// Number of positions cached (taken from the first layer).
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs one position through the network and returns the next-token logits.
///
/// Appends this position's key and value to every layer of `cache`; attention covers all
/// cached positions, the current one included. Positions past `block_size` wrap around the
/// positional table.
pub fn forward<A: Arithmetic>(
    ops: &mut A,
    hp: &Hyperparams,
    state: &StateDict<A::Value>,
    token_id: usize,
    pos_id: usize,
    cache: &mut KvCache<A::Value>,
) -> Vec<A::Value> {
    let tok_emb = &state.wte[token_id];
    let pos_emb = &state.wpe[pos_id % hp.block_size];
    let mut x: Vec<A::Value> = tok_emb
        .iter()
        .zip(pos_emb)
        .map(|(&t, &p)| ops.add(t, p))
        .collect();

    let hd = hp.head_dim;
    for (li, layer) in state.layers.iter().enumerate() {
        // attention
        let x_residual = x.clone();
        let xn = rmsnorm(ops, &x);
        let q = linear(ops, &xn, &layer.attn_wq);
        let k = linear(ops, &xn, &layer.attn_wk);
        let v = linear(ops, &xn, &layer.attn_wv);
        cache.keys[li].push(k);
        cache.values[li].push(v);
        let keys = &cache.keys[li];
        let values = &cache.values[li];

        let mut x_attn = Vec::with_capacity(hp.n_embd);
        for h in 0..hp.n_head {
            let hs = h * hd;
            let q_h = &q[hs..hs + hd];
            let scale = ops.constant((hd as f64).sqrt());
            let attn_logits: Vec<A::Value> = keys
                .iter()
                .map(|k_t| {
                    let mut dot = ops.constant(0.0);
                    for (&qj, &kj) in q_h.iter().zip(&k_t[hs..hs + hd]) {
                        let prod = ops.mul(qj, kj);
                        dot = ops.add(dot, prod);
                    }
                    ops.div(dot, scale)
                })
                .collect();
            let attn_weights = softmax(ops, &attn_logits);
            for j in 0..hd {
                let mut acc = ops.constant(0.0);
                for (&w, v_t) in attn_weights.iter().zip(values) {
                    let prod = ops.mul(w, v_t[hs + j]);
                    acc = ops.add(acc, prod);
                }
                x_attn.push(acc);
            }
        }
        let proj = linear(ops, &x_attn, &layer.attn_wo);
        x = proj
            .iter()
            .zip(&x_residual)
            .map(|(&a, &r)| ops.add(a, r))
            .collect();

        // mlp
        let x_residual = x.clone();
        let xn = rmsnorm(ops, &x);
        let hidden: Vec<A::Value> = linear(ops, &xn, &layer.mlp_fc1)
            .into_iter()
            .map(|h| {
                let r = ops.relu(h);
                ops.pow(r, 2.0)
            })
            .collect();
        let out = linear(ops, &hidden, &layer.mlp_fc2);
        x = out
            .iter()
            .zip(&x_residual)
            .map(|(&a, &r)| ops.add(a, r))
            .collect();
    }

    linear(ops, &x, &state.wte)
}
