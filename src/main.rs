//! Training entrypoint: reads `MICROGPT_*` settings, trains, saves checkpoints if
//! `MICROGPT_SAVE_PATH` is set, then prints preview samples.

use anyhow::Context;
use microgpt_core::config;
use microgpt_core::train;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::from_env().context("reading MICROGPT_* configuration")?;
    config.validate().context("invalid configuration")?;
    log::info!(
        "n_embd={} n_head={} n_layer={} block_size={} num_steps={} lr={} seed={}",
        config.n_embd,
        config.n_head,
        config.n_layer,
        config.block_size,
        config.num_steps,
        config.learning_rate,
        config.seed
    );

    let report = train::run(&config)
        .with_context(|| format!("training on {}", config.input_path.display()))?;

    println!(
        "\n--- generated names (temperature={}) ---",
        config.temperature
    );
    for (i, sample) in report.samples.iter().enumerate() {
        println!("  {:2}. {sample}", i + 1);
    }
    Ok(())
}
