//! One document per step: graph forward, per-position backward, Adam update.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::autograd::{Arithmetic, Graph};
use crate::config::Config;
use crate::data::DataError;
use crate::model::{forward, Hyperparams, KvCache, Model, StateDict};
use crate::nn::softmax;
use crate::optim::{linear_decay, Adam};
use crate::tokenizer::{CharTokenizer, Tokenizer};

use super::history::LossHistory;
use super::TrainError;

/// Parameters captured when the running-average loss improved.
#[derive(Clone, Debug)]
pub struct BestSnapshot {
    /// Zero-based step after whose update the snapshot was taken.
    pub step: usize,
    pub avg_loss: f64,
    pub state: StateDict<f64>,
}

/// Result of a finished training loop.
#[derive(Clone, Debug)]
pub struct TrainOutcome {
    /// Final-step parameters.
    pub model: Model,
    pub best: Option<BestSnapshot>,
    /// Document loss of every step, in order.
    pub losses: Vec<f64>,
}

/// Length-normalised cross-entropy of `tokens` and its gradient w.r.t. every parameter.
///
/// Builds a fresh graph whose leaves mirror `state`, runs one forward pass per consecutive
/// token pair and backpropagates each position's `-log p(next) / n` right away. Returns the
/// summed loss and the gradients in [`StateDict::values`] order.
///
/// Every backward call re-propagates what earlier positions left on the nodes shared through
/// the key/value cache, so earlier positions weigh more than in the plain loss gradient.
#[must_use]
pub fn document_loss(
    hp: &Hyperparams,
    state: &StateDict<f64>,
    tokens: &[usize],
) -> (f64, Vec<f64>) {
    let mut g = Graph::new();
    let params = state.map(&mut |&w| g.leaf(w));
    let mut cache = KvCache::new(hp.n_layer);

    let n = tokens.len().saturating_sub(1);
    let mut loss = 0.0;
    for (pos_id, pair) in tokens.windows(2).enumerate() {
        let logits = forward(&mut g, hp, &params, pair[0], pos_id, &mut cache);
        let probs = softmax(&mut g, &logits);
        let log_p = g.log(probs[pair[1]]);
        let nll = g.neg(log_p);
        let scale = g.constant(1.0 / n as f64);
        let loss_t = g.mul(scale, nll);
        g.backward(loss_t);
        loss += g.data(loss_t);
    }

    let grads = params.values().map(|&id| g.grad(id)).collect();
    (loss, grads)
}

/// Owns the model, optimizer state and loss history for one run.
#[derive(Debug)]
pub struct Trainer {
    docs: Vec<String>,
    model: Model,
    adam: Adam,
    history: LossHistory,
    best: Option<BestSnapshot>,
    learning_rate: f64,
    num_steps: usize,
    next_step: usize,
}

impl Trainer {
    /// Shuffles `docs`, builds the vocabulary from them and initialises the weights, all from
    /// `rng`, in that order.
    ///
    /// # Errors
    ///
    /// [`TrainError::Data`] when `docs` is empty, [`TrainError::Model`] for an inconsistent
    /// model shape.
    pub fn new<R: Rng + ?Sized>(
        config: &Config,
        mut docs: Vec<String>,
        rng: &mut R,
    ) -> Result<Self, TrainError> {
        if docs.is_empty() {
            return Err(DataError::EmptyFile.into());
        }
        docs.shuffle(rng);
        let tokenizer = CharTokenizer::from_docs(&docs);
        let model = Model::init(Hyperparams::from(config), tokenizer, config.init_std, rng)?;
        let adam = Adam::new(
            model.state.num_params(),
            config.beta1,
            config.beta2,
            config.epsilon,
        );
        Ok(Trainer {
            docs,
            model,
            adam,
            history: LossHistory::new(
                config.avg_window,
                config.loss_log_every,
                config.best_check_every,
            ),
            best: None,
            learning_rate: config.learning_rate,
            num_steps: config.num_steps,
            next_step: 0,
        })
    }

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Documents in training order (after the shuffle).
    #[must_use]
    pub fn docs(&self) -> &[String] {
        &self.docs
    }

    /// Number of steps taken so far.
    #[must_use]
    pub fn steps_done(&self) -> usize {
        self.next_step
    }

    /// Trains on the next document and returns its loss.
    ///
    /// # Errors
    ///
    /// [`TrainError::Tokenizer`] if the document has a character outside the vocabulary.
    pub fn step(&mut self) -> Result<f64, TrainError> {
        let step = self.next_step;
        let hp = self.model.hyperparams;
        let doc = &self.docs[step % self.docs.len()];
        let mut tokens = self.model.tokenizer.encode_document(doc)?;
        tokens.truncate(hp.block_size);

        let (loss, grads) = document_loss(&hp, &self.model.state, &tokens);
        let lr = linear_decay(self.learning_rate, step, self.num_steps);
        self.adam.step(self.model.state.values_mut(), &grads, lr, step);
        log::debug!("step {} | doc {doc:?} | loss {loss:.4} | lr {lr:.6}", step + 1);

        let report = self.history.record(step, loss);
        let marker = if report.improved { " *best*" } else { "" };
        if let Some((window, avg)) = report.logged {
            log::info!(
                "step {:5} / {} | loss {loss:.4} | avg(last {window}) {avg:.4}{marker}",
                step + 1,
                self.num_steps
            );
        }
        if report.improved {
            self.best = Some(BestSnapshot {
                step,
                avg_loss: self.history.best_avg().unwrap_or(loss),
                state: self.model.state.clone(),
            });
        }
        self.next_step += 1;
        Ok(loss)
    }

    /// Runs the remaining steps up to `num_steps`.
    ///
    /// # Errors
    ///
    /// The first error from [`Trainer::step`].
    pub fn train(mut self) -> Result<TrainOutcome, TrainError> {
        while self.next_step < self.num_steps {
            self.step()?;
        }
        Ok(TrainOutcome {
            model: self.model,
            best: self.best,
            losses: self.history.into_losses(),
        })
    }
}
