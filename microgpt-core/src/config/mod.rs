//! Configuration for training and inference.
//!
//! Load from environment via [`from_env`] / [`generate_from_env`] and check with
//! [`Config::validate`] / [`GenerateConfig::validate`] before use.
//! Default values and env key names live in the `constants` submodule.

mod builder;
mod constants;
mod error;

use std::path::PathBuf;

use constants::{
    DEFAULT_AVG_WINDOW, DEFAULT_BEST_CHECK_EVERY, DEFAULT_BETA1, DEFAULT_BETA2,
    DEFAULT_BLOCK_SIZE, DEFAULT_EPSILON, DEFAULT_INIT_STD, DEFAULT_INPUT_PATH,
    DEFAULT_LEARNING_RATE, DEFAULT_LOSS_LOG_EVERY, DEFAULT_NUM_SAMPLES, DEFAULT_NUM_STEPS,
    DEFAULT_N_EMBD, DEFAULT_N_HEAD, DEFAULT_N_LAYER, DEFAULT_SEED, DEFAULT_TEMPERATURE,
};

pub use builder::{env_key, env_parsed, env_string, from_env, generate_from_env};
pub use error::ConfigError;

/// Training configuration: model shape, optimizer, schedule, paths and preview sampling.
#[derive(Clone, Debug)]
pub struct Config {
    /// Seed for the single training RNG stream (shuffle, init, preview sampling).
    pub seed: u64,
    /// Corpus file, one document per line.
    pub input_path: PathBuf,
    /// Where to write the final checkpoint; the best snapshot goes to `<stem>_best<ext>`.
    pub save_path: Option<PathBuf>,

    /// Embedding dimension (must be divisible by `n_head`).
    pub n_embd: usize,
    /// Number of attention heads.
    pub n_head: usize,
    /// Number of transformer layers.
    pub n_layer: usize,
    /// Maximum sequence length in tokens.
    pub block_size: usize,
    /// Std of the Gaussian init (output projections `attn_wo`, `mlp_fc2` start at zero).
    pub init_std: f64,

    /// Peak Adam learning rate; decays linearly to zero over `num_steps`.
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,

    /// Number of optimizer steps (one document each).
    pub num_steps: usize,
    /// Log (and consider a best snapshot) every this many steps, plus step 0.
    pub loss_log_every: usize,
    /// Number of recent step losses in the running average.
    pub avg_window: usize,
    /// Once the window is full, compare the running average this often.
    pub best_check_every: usize,

    /// Preview sampling temperature (> 0).
    pub temperature: f64,
    /// Number of preview samples after training.
    pub num_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            save_path: None,
            n_embd: DEFAULT_N_EMBD,
            n_head: DEFAULT_N_HEAD,
            n_layer: DEFAULT_N_LAYER,
            block_size: DEFAULT_BLOCK_SIZE,
            init_std: DEFAULT_INIT_STD,
            learning_rate: DEFAULT_LEARNING_RATE,
            beta1: DEFAULT_BETA1,
            beta2: DEFAULT_BETA2,
            epsilon: DEFAULT_EPSILON,
            num_steps: DEFAULT_NUM_STEPS,
            loss_log_every: DEFAULT_LOSS_LOG_EVERY,
            avg_window: DEFAULT_AVG_WINDOW,
            best_check_every: DEFAULT_BEST_CHECK_EVERY,
            temperature: DEFAULT_TEMPERATURE,
            num_samples: DEFAULT_NUM_SAMPLES,
        }
    }
}

impl Config {
    /// Checks dimensions, schedule and sampling settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] naming the first rule that fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |m: String| Err(ConfigError::Validation(m));
        if self.n_head == 0 {
            return fail("n_head must be greater than 0".to_string());
        }
        if !self.n_embd.is_multiple_of(self.n_head) || self.n_embd == 0 {
            return fail(format!(
                "n_embd ({}) must be a positive multiple of n_head ({})",
                self.n_embd, self.n_head
            ));
        }
        if self.n_layer == 0 {
            return fail("n_layer must be greater than 0".to_string());
        }
        if self.block_size == 0 {
            return fail("block_size must be greater than 0".to_string());
        }
        if self.num_steps == 0 {
            return fail("num_steps must be greater than 0".to_string());
        }
        if self.loss_log_every == 0 || self.avg_window == 0 || self.best_check_every == 0 {
            return fail(
                "loss_log_every, avg_window and best_check_every must be greater than 0"
                    .to_string(),
            );
        }
        if !(self.init_std >= 0.0 && self.init_std.is_finite()) {
            return fail(format!("init_std ({}) must be finite and >= 0", self.init_std));
        }
        validate_temperature(self.temperature)
    }

    /// Head dimension (`n_embd / n_head`).
    #[must_use]
    pub fn head_dim(&self) -> usize {
        self.n_embd / self.n_head
    }

    /// Path of the best-so-far checkpoint next to `save_path` (`model.json` → `model_best.json`).
    #[must_use]
    pub fn best_save_path(&self) -> Option<PathBuf> {
        let path = self.save_path.as_ref()?;
        let stem = path.file_stem()?.to_string_lossy();
        let name = match path.extension() {
            Some(ext) => format!("{stem}_best.{}", ext.to_string_lossy()),
            None => format!("{stem}_best"),
        };
        Some(path.with_file_name(name))
    }
}

/// Inference configuration.
#[derive(Clone, Debug)]
pub struct GenerateConfig {
    /// Checkpoint written by training.
    pub model_path: PathBuf,
    pub num_samples: usize,
    /// Sampling temperature (> 0).
    pub temperature: f64,
    /// Fixed seed for reproducible output; `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
}

impl GenerateConfig {
    /// Defaults for everything but the checkpoint path.
    #[must_use]
    pub fn new(model_path: PathBuf) -> Self {
        GenerateConfig {
            model_path,
            num_samples: DEFAULT_NUM_SAMPLES,
            temperature: DEFAULT_TEMPERATURE,
            seed: None,
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::Validation`] when the temperature is not a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_temperature(self.temperature)
    }
}

fn validate_temperature(t: f64) -> Result<(), ConfigError> {
    if t > 0.0 && t.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "temperature ({t}) must be finite and greater than 0"
        )))
    }
}
