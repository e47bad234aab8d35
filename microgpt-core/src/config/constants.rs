//! Default values and environment variable key names for the config builders.

/// Environment variable prefix (e.g. `MICROGPT_N_EMBD`).
pub(crate) const ENV_PREFIX: &str = "MICROGPT_";

// --- Env key suffixes (full key = ENV_PREFIX + suffix) ---

pub(crate) const ENV_SEED: &str = "SEED";
pub(crate) const ENV_INPUT_PATH: &str = "INPUT_PATH";
pub(crate) const ENV_SAVE_PATH: &str = "SAVE_PATH";
pub(crate) const ENV_MODEL_PATH: &str = "MODEL_PATH";
pub(crate) const ENV_N_EMBD: &str = "N_EMBD";
pub(crate) const ENV_N_HEAD: &str = "N_HEAD";
pub(crate) const ENV_N_LAYER: &str = "N_LAYER";
pub(crate) const ENV_BLOCK_SIZE: &str = "BLOCK_SIZE";
pub(crate) const ENV_INIT_STD: &str = "INIT_STD";
pub(crate) const ENV_LEARNING_RATE: &str = "LEARNING_RATE";
pub(crate) const ENV_BETA1: &str = "BETA1";
pub(crate) const ENV_BETA2: &str = "BETA2";
pub(crate) const ENV_EPSILON: &str = "EPSILON";
pub(crate) const ENV_NUM_STEPS: &str = "NUM_STEPS";
pub(crate) const ENV_LOSS_LOG_EVERY: &str = "LOSS_LOG_EVERY";
pub(crate) const ENV_AVG_WINDOW: &str = "AVG_WINDOW";
pub(crate) const ENV_BEST_CHECK_EVERY: &str = "BEST_CHECK_EVERY";
pub(crate) const ENV_TEMPERATURE: &str = "TEMPERATURE";
pub(crate) const ENV_NUM_SAMPLES: &str = "NUM_SAMPLES";

// --- Default values ---

pub(crate) const DEFAULT_SEED: u64 = 42;
pub(crate) const DEFAULT_INPUT_PATH: &str = "input.txt";
pub(crate) const DEFAULT_N_EMBD: usize = 24;
pub(crate) const DEFAULT_N_HEAD: usize = 4;
pub(crate) const DEFAULT_N_LAYER: usize = 1;
pub(crate) const DEFAULT_BLOCK_SIZE: usize = 24;
pub(crate) const DEFAULT_INIT_STD: f64 = 0.02;
pub(crate) const DEFAULT_LEARNING_RATE: f64 = 1e-2;
pub(crate) const DEFAULT_BETA1: f64 = 0.9;
pub(crate) const DEFAULT_BETA2: f64 = 0.95;
pub(crate) const DEFAULT_EPSILON: f64 = 1e-8;
pub(crate) const DEFAULT_NUM_STEPS: usize = 3000;
pub(crate) const DEFAULT_LOSS_LOG_EVERY: usize = 100;
pub(crate) const DEFAULT_AVG_WINDOW: usize = 50;
pub(crate) const DEFAULT_BEST_CHECK_EVERY: usize = 10;
pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.6;
pub(crate) const DEFAULT_NUM_SAMPLES: usize = 20;
