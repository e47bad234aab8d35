//! Inference entrypoint: `generate [MODEL_PATH]`.
//!
//! The checkpoint path comes from the first argument or `MICROGPT_MODEL_PATH`;
//! `MICROGPT_NUM_SAMPLES`, `MICROGPT_TEMPERATURE` and `MICROGPT_SEED` tune sampling.
//! Without a seed every run draws different names.

use std::path::PathBuf;

use anyhow::Context;
use microgpt_core::checkpoint::load_model;
use microgpt_core::config::generate_from_env;
use microgpt_core::generate::Generator;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = generate_from_env(cli_path).context("reading configuration")?;
    config.validate().context("invalid configuration")?;

    log::info!("loading model from {}", config.model_path.display());
    let model = load_model(&config.model_path)
        .with_context(|| format!("loading checkpoint {}", config.model_path.display()))?;
    log::info!(
        "loaded: vocab_size={}, n_embd={}, n_layer={}, n_head={}",
        model.vocab_size(),
        model.hyperparams.n_embd,
        model.hyperparams.n_layer,
        model.hyperparams.n_head
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let samples = Generator::new(&model, config.temperature)?
        .samples(config.num_samples, &mut rng)
        .context("sampling")?;

    println!(
        "\n--- generated names (temperature={}) ---",
        config.temperature
    );
    for (i, sample) in samples.iter().enumerate() {
        println!("  {:2}. {sample}", i + 1);
    }
    Ok(())
}
