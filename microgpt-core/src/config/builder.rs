//! Build [`Config`] and [`GenerateConfig`] from `MICROGPT_*` environment variables.
//!
//! Unset variables fall back to the defaults in [`crate::config::constants`]; a variable that is
//! set but malformed is an error rather than being silently ignored.

use std::path::PathBuf;

use super::constants::{
    ENV_AVG_WINDOW, ENV_BEST_CHECK_EVERY, ENV_BETA1, ENV_BETA2, ENV_BLOCK_SIZE, ENV_EPSILON,
    ENV_INIT_STD, ENV_INPUT_PATH, ENV_LEARNING_RATE, ENV_LOSS_LOG_EVERY, ENV_MODEL_PATH,
    ENV_NUM_SAMPLES, ENV_NUM_STEPS, ENV_N_EMBD, ENV_N_HEAD, ENV_N_LAYER, ENV_PREFIX,
    ENV_SAVE_PATH, ENV_SEED, ENV_TEMPERATURE,
};
use super::{Config, ConfigError, GenerateConfig};

/// Returns the full environment variable key for a suffix (e.g. `SEED` → `MICROGPT_SEED`).
#[must_use]
pub fn env_key(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

/// Reads an environment variable as a string; `Ok(None)` when unset.
///
/// # Errors
///
/// [`ConfigError::EnvVar`] when the variable is set but not valid Unicode.
pub fn env_string(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(s) => Ok(Some(s)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvVar {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Reads an environment variable and parses it into `T`; `Ok(None)` when unset.
///
/// # Errors
///
/// [`ConfigError::Parse`] when the variable is set but does not parse (e.g. `MICROGPT_SEED=abc`).
pub fn env_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = env_string(key)? else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Parse {
            key: key.to_string(),
            value: raw.clone(),
            message: e.to_string(),
        })
}

/// Builds the training [`Config`] from the environment, falling back to [`Config::default`].
///
/// An empty `MICROGPT_SAVE_PATH` means "do not save".
///
/// # Errors
///
/// Any set variable that fails to read or parse.
pub fn from_env() -> Result<Config, ConfigError> {
    let d = Config::default();

    let save_path = match env_string(&env_key(ENV_SAVE_PATH))? {
        Some(s) if !s.trim().is_empty() => Some(PathBuf::from(s.trim())),
        Some(_) => None,
        None => d.save_path.clone(),
    };

    Ok(Config {
        seed: env_parsed(&env_key(ENV_SEED))?.unwrap_or(d.seed),
        input_path: env_string(&env_key(ENV_INPUT_PATH))?
            .map(PathBuf::from)
            .unwrap_or_else(|| d.input_path.clone()),
        save_path,
        n_embd: env_parsed(&env_key(ENV_N_EMBD))?.unwrap_or(d.n_embd),
        n_head: env_parsed(&env_key(ENV_N_HEAD))?.unwrap_or(d.n_head),
        n_layer: env_parsed(&env_key(ENV_N_LAYER))?.unwrap_or(d.n_layer),
        block_size: env_parsed(&env_key(ENV_BLOCK_SIZE))?.unwrap_or(d.block_size),
        init_std: env_parsed(&env_key(ENV_INIT_STD))?.unwrap_or(d.init_std),
        learning_rate: env_parsed(&env_key(ENV_LEARNING_RATE))?.unwrap_or(d.learning_rate),
        beta1: env_parsed(&env_key(ENV_BETA1))?.unwrap_or(d.beta1),
        beta2: env_parsed(&env_key(ENV_BETA2))?.unwrap_or(d.beta2),
        epsilon: env_parsed(&env_key(ENV_EPSILON))?.unwrap_or(d.epsilon),
        num_steps: env_parsed(&env_key(ENV_NUM_STEPS))?.unwrap_or(d.num_steps),
        loss_log_every: env_parsed(&env_key(ENV_LOSS_LOG_EVERY))?.unwrap_or(d.loss_log_every),
        avg_window: env_parsed(&env_key(ENV_AVG_WINDOW))?.unwrap_or(d.avg_window),
        best_check_every: env_parsed(&env_key(ENV_BEST_CHECK_EVERY))?
            .unwrap_or(d.best_check_every),
        temperature: env_parsed(&env_key(ENV_TEMPERATURE))?.unwrap_or(d.temperature),
        num_samples: env_parsed(&env_key(ENV_NUM_SAMPLES))?.unwrap_or(d.num_samples),
    })
}

/// Builds the inference [`GenerateConfig`].
///
/// `model_path` (typically the first command-line argument) wins over `MICROGPT_MODEL_PATH`.
///
/// # Errors
///
/// [`ConfigError::Missing`] when neither provides a checkpoint path, plus any read/parse error.
pub fn generate_from_env(model_path: Option<PathBuf>) -> Result<GenerateConfig, ConfigError> {
    let model_key = env_key(ENV_MODEL_PATH);
    let model_path = match model_path {
        Some(p) => p,
        None => env_string(&model_key)?
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing { key: model_key })?,
    };
    let d = GenerateConfig::new(model_path);
    Ok(GenerateConfig {
        num_samples: env_parsed(&env_key(ENV_NUM_SAMPLES))?.unwrap_or(d.num_samples),
        temperature: env_parsed(&env_key(ENV_TEMPERATURE))?.unwrap_or(d.temperature),
        seed: env_parsed(&env_key(ENV_SEED))?,
        ..d
    })
}
