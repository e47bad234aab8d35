//! Autoregressive sampling with the plain-float forward pass.
//!
//! Each sample starts from `<BOS>` at position 0 with an empty cache and runs for at most
//! `block_size` positions. Sampling `<EOS>` or `<BOS>` ends the sample; neither is emitted.

mod error;

use rand::Rng;
use rand_distr::{weighted::WeightedIndex, Distribution};

use crate::autograd::Plain;
use crate::model::{forward, KvCache, Model};
use crate::nn::softmax;
use crate::tokenizer::Tokenizer;

pub use error::GenerateError;

/// Draws samples from a loaded model at a fixed temperature.
#[derive(Clone, Copy, Debug)]
pub struct Generator<'m> {
    model: &'m Model,
    temperature: f64,
}

impl<'m> Generator<'m> {
    /// # Errors
    ///
    /// [`GenerateError::InvalidTemperature`] unless `temperature` is finite and positive.
    pub fn new(model: &'m Model, temperature: f64) -> Result<Self, GenerateError> {
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(GenerateError::InvalidTemperature(temperature));
        }
        Ok(Generator { model, temperature })
    }

    /// Generates one string.
    ///
    /// # Errors
    ///
    /// [`GenerateError::Sampling`] when the distribution cannot be sampled;
    /// [`GenerateError::Tokenizer`] when decoding fails.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, GenerateError> {
        let hp = &self.model.hyperparams;
        let tokenizer = &self.model.tokenizer;
        let (bos, eos) = (tokenizer.bos_id(), tokenizer.eos_id());

        let mut cache = KvCache::new(hp.n_layer);
        let mut token_id = bos;
        let mut generated = Vec::new();
        for pos_id in 0..hp.block_size {
            let logits = forward(&mut Plain, hp, &self.model.state, token_id, pos_id, &mut cache);
            let scaled: Vec<f64> = logits.iter().map(|l| l / self.temperature).collect();
            let probs = softmax(&mut Plain, &scaled);
            let dist = WeightedIndex::new(&probs)
                .map_err(|e| GenerateError::Sampling(e.to_string()))?;
            token_id = dist.sample(rng);
            if token_id == eos || token_id == bos {
                break;
            }
            generated.push(token_id);
        }
        Ok(tokenizer.decode(&generated)?)
    }

    /// Generates `n` independent strings from one RNG stream, in order.
    ///
    /// # Errors
    ///
    /// The first error from [`Generator::sample`].
    pub fn samples<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, GenerateError> {
        (0..n).map(|_| self.sample(&mut *rng)).collect()
    }
}
