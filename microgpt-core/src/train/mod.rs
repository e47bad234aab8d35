//! Training: corpus → shuffled documents → per-step loss and Adam update → checkpoints → preview.
//!
//! [`run`] is the whole pipeline behind the `train` binary. [`Trainer`] exposes the loop one
//! step at a time; [`document_loss`] is the differentiable part on its own.

mod error;
mod history;
mod trainer;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::checkpoint::{save_model, Checkpoint};
use crate::config::Config;
use crate::data::load_from_path;
use crate::generate::Generator;

pub use error::TrainError;
pub use history::{LossHistory, StepReport};
pub use trainer::{document_loss, BestSnapshot, TrainOutcome, Trainer};

/// Everything a training run produced.
#[derive(Clone, Debug)]
pub struct TrainReport {
    pub outcome: TrainOutcome,
    /// Preview samples drawn from the final weights.
    pub samples: Vec<String>,
}

/// Loads the corpus, trains, saves the final (and best) checkpoint when a save path is set, and
/// samples a preview from the final weights.
///
/// One `StdRng` seeded from `config.seed` drives the shuffle, the init and the preview, in
/// that order.
///
/// # Errors
///
/// Any [`TrainError`]; nothing is written unless training completed.
pub fn run(config: &Config) -> Result<TrainReport, TrainError> {
    config.validate()?;
    let docs = load_from_path(&config.input_path)?.into_documents();
    log::info!("num docs: {}", docs.len());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let trainer = Trainer::new(config, docs, &mut rng)?;
    log::info!("vocab size: {}", trainer.model().vocab_size());
    log::info!("num params: {}", trainer.model().state.num_params());

    let outcome = trainer.train()?;

    if let Some(path) = &config.save_path {
        save_model(&outcome.model, path)?;
        log::info!("final model saved to {}", path.display());
        if let (Some(best), Some(best_path)) = (&outcome.best, config.best_save_path()) {
            let model = &outcome.model;
            Checkpoint::from_parts(model.hyperparams, &model.tokenizer, &best.state)
                .save(&best_path)?;
            log::info!(
                "best model (avg loss {:.4}, step {}) saved to {}",
                best.avg_loss,
                best.step + 1,
                best_path.display()
            );
        }
    }

    log::info!(
        "sampling {} names (temperature={})",
        config.num_samples,
        config.temperature
    );
    let samples = Generator::new(&outcome.model, config.temperature)?
        .samples(config.num_samples, &mut rng)?;
    Ok(TrainReport { outcome, samples })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::autograd::{Arithmetic, Graph, Plain};
    use crate::checkpoint::load_model;
    use crate::data::DataError;
    use crate::model::{forward, Hyperparams, KvCache, Model, StateDict};
    use crate::tokenizer::{CharTokenizer, Tokenizer};

    fn small_config(input: &Path) -> Config {
        Config {
            input_path: input.to_path_buf(),
            n_embd: 8,
            n_head: 2,
            n_layer: 1,
            block_size: 8,
            num_steps: 60,
            loss_log_every: 20,
            avg_window: 10,
            best_check_every: 5,
            num_samples: 3,
            ..Config::default()
        }
    }

    fn corpus(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        f.flush().unwrap();
        f
    }

    fn gradient_model() -> (Hyperparams, Model) {
        let tokenizer = CharTokenizer::from_docs(&["abc"]);
        let hp = Hyperparams::new(4, 1, 2, 6);
        let mut model = Model::init(hp, tokenizer, 0.4, &mut StdRng::seed_from_u64(5)).unwrap();
        for (i, w) in model.state.values_mut().enumerate() {
            if *w == 0.0 {
                *w = ((i % 7) as f64 - 3.0) * 0.05;
            }
        }
        (hp, model)
    }

    fn numeric_grad(hp: &Hyperparams, state: &StateDict<f64>, tokens: &[usize], idx: usize) -> f64 {
        let h = 1e-6;
        let mut up = state.clone();
        let mut down = state.clone();
        *up.values_mut().nth(idx).unwrap() += h;
        *down.values_mut().nth(idx).unwrap() -= h;
        (document_loss(hp, &up, tokens).0 - document_loss(hp, &down, tokens).0) / (2.0 * h)
    }

    #[test]
    fn single_position_gradient_matches_finite_difference() {
        let (hp, model) = gradient_model();
        let tokens = [0, 3];
        let (_, grads) = document_loss(&hp, &model.state, &tokens);
        assert_eq!(grads.len(), model.state.num_params());
        let n = grads.len();
        for idx in [0, 3, 17, n / 3, n / 2, n - 40, n - 1] {
            let numeric = numeric_grad(&hp, &model.state, &tokens, idx);
            assert!(
                (grads[idx] - numeric).abs() <= 1e-5 * (1.0 + numeric.abs()),
                "param {idx}: analytic {} vs numeric {numeric}",
                grads[idx]
            );
        }
    }

    #[test]
    fn per_position_backward_recounts_earlier_positions() {
        let (hp, model) = gradient_model();
        let tokens = model.tokenizer.encode_document("cab").unwrap();
        assert_eq!(tokens.len(), 5);
        let (_, grads) = document_loss(&hp, &model.state, &tokens);
        let wpe_row = |pos: usize| {
            let start = model.tokenizer.vocab_size() * hp.n_embd + pos * hp.n_embd;
            start..start + hp.n_embd
        };

        // The last position's embedding feeds only the last backward call.
        for idx in wpe_row(3) {
            let numeric = numeric_grad(&hp, &model.state, &tokens, idx);
            assert!(
                (grads[idx] - numeric).abs() <= 1e-5 * (1.0 + numeric.abs()),
                "param {idx}: analytic {} vs numeric {numeric}",
                grads[idx]
            );
        }
        // Later calls reach position 0 through the cached keys and values and send its
        // stored gradient back again.
        let excess: f64 = wpe_row(0)
            .map(|idx| (grads[idx] - numeric_grad(&hp, &model.state, &tokens, idx)).abs())
            .sum();
        assert!(excess > 1e-4, "position 0 gradient excess {excess}");
        // Rows past the document are never used.
        assert!(wpe_row(5).all(|idx| grads[idx] == 0.0));
    }

    #[test]
    fn single_token_document_has_zero_loss() {
        let tokenizer = CharTokenizer::from_docs(&["ab"]);
        let hp = Hyperparams::new(4, 1, 2, 1);
        let model = Model::init(hp, tokenizer, 0.1, &mut StdRng::seed_from_u64(1)).unwrap();
        let (loss, grads) = document_loss(&hp, &model.state, &[0]);
        assert_eq!(loss, 0.0);
        assert!(grads.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn trainer_learns_deterministic_sequence() {
        let f = corpus(&["ab"; 8]);
        let config = Config {
            num_steps: 200,
            learning_rate: 0.02,
            ..small_config(f.path())
        };
        let docs = load_from_path(f.path()).unwrap().into_documents();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let outcome = Trainer::new(&config, docs, &mut rng)
            .unwrap()
            .train()
            .unwrap();
        assert_eq!(outcome.losses.len(), 200);
        let tail = &outcome.losses[180..];
        let avg = tail.iter().sum::<f64>() / tail.len() as f64;
        assert!(avg < 0.5, "final average loss {avg}");
        assert!(avg < outcome.losses[0] / 2.0);
        let best = outcome.best.unwrap();
        assert!(best.avg_loss < outcome.losses[0]);
    }

    #[test]
    fn same_seed_same_losses() {
        let f = corpus(&["emma", "olivia", "ava", "isabella"]);
        let config = small_config(f.path());
        let run_steps = || {
            let docs = load_from_path(f.path()).unwrap().into_documents();
            let mut rng = StdRng::seed_from_u64(config.seed);
            let mut trainer = Trainer::new(&config, docs, &mut rng).unwrap();
            let losses: Vec<f64> = (0..5).map(|_| trainer.step().unwrap()).collect();
            assert_eq!(trainer.steps_done(), 5);
            (trainer.docs().to_vec(), losses)
        };
        let (docs_a, losses_a) = run_steps();
        let (docs_b, losses_b) = run_steps();
        assert_eq!(docs_a, docs_b);
        assert_eq!(losses_a, losses_b);
        let mut sorted = docs_a;
        sorted.sort();
        assert_eq!(sorted, ["ava", "emma", "isabella", "olivia"]);
    }

    #[test]
    fn run_saves_final_and_best_checkpoints() {
        let f = corpus(&["anna", "bob", "cara", "dave", "eve", "fred"]);
        let dir = tempfile::tempdir().unwrap();
        let save = dir.path().join("model.json");
        let config = Config {
            save_path: Some(save.clone()),
            ..small_config(f.path())
        };

        let report = run(&config).unwrap();
        assert_eq!(report.samples.len(), 3);
        assert_eq!(report.outcome.losses.len(), 60);

        let final_model = load_model(&save).unwrap();
        assert_eq!(final_model.state, report.outcome.model.state);
        let best_model = load_model(dir.path().join("model_best.json")).unwrap();
        let best = report.outcome.best.as_ref().unwrap();
        assert_eq!(best_model.state, best.state);
        assert_eq!(
            best_model.tokenizer.symbols(),
            report.outcome.model.tokenizer.symbols()
        );

        // the loaded weights give the same logits through both backends
        let hp = final_model.hyperparams;
        let tokens = final_model.tokenizer.encode_document("cara").unwrap();
        let mut g = Graph::new();
        let params = final_model.state.map(&mut |&w| g.leaf(w));
        let mut graph_cache = KvCache::new(hp.n_layer);
        let mut plain_cache = KvCache::new(hp.n_layer);
        for (pos, &tok) in tokens.iter().enumerate() {
            let a = forward(&mut g, &hp, &params, tok, pos, &mut graph_cache);
            let b = forward(&mut Plain, &hp, &final_model.state, tok, pos, &mut plain_cache);
            for (&x, &y) in a.iter().zip(&b) {
                assert!((g.data(x) - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn run_without_save_path_writes_nothing() {
        let f = corpus(&["x", "y"]);
        let config = Config {
            num_steps: 3,
            ..small_config(f.path())
        };
        let report = run(&config).unwrap();
        assert_eq!(report.outcome.losses.len(), 3);
        assert!(report.samples.iter().all(|s| s.chars().all(|c| c == 'x' || c == 'y')));
    }

    #[test]
    fn missing_corpus_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(&dir.path().join("input.txt"));
        let err = run(&config).unwrap_err();
        assert!(matches!(err, TrainError::Data(DataError::NotFound(_))));
        assert_eq!(err.to_string(), "train: loading the corpus failed");
        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.to_string().contains("create the dataset"));
        assert!(std::error::Error::source(cause).is_none());
    }

    #[test]
    fn trainer_rejects_empty_documents() {
        let config = small_config(Path::new("unused.txt"));
        let err = Trainer::new(&config, Vec::new(), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, TrainError::Data(DataError::EmptyFile)));
    }

    #[test]
    fn invalid_config_is_rejected_before_loading() {
        let config = Config {
            n_head: 3,
            ..small_config(Path::new("does-not-exist.txt"))
        };
        assert!(matches!(run(&config), Err(TrainError::Config(_))));
    }

    #[test]
    fn eos_and_bos_ids_are_fixed() {
        let f = corpus(&["zed"]);
        let docs = load_from_path(f.path()).unwrap().into_documents();
        let config = small_config(f.path());
        let trainer = Trainer::new(&config, docs, &mut StdRng::seed_from_u64(0)).unwrap();
        let t = &trainer.model().tokenizer;
        assert_eq!((t.bos_id(), t.eos_id()), (0, 1));
        assert_eq!(t.vocab_size(), 5);
    }
}
