//! JSON checkpoints: the one artifact shared by training and inference.
//!
//! ```json
//! {
//!   "hyperparams": {"n_embd": 24, "n_layer": 1, "n_head": 4, "block_size": 24, "head_dim": 6},
//!   "vocab": {"chars": ["<BOS>", "<EOS>", "a", ...], "vocab_size": 28},
//!   "state_dict": {"wte": [[...], ...], "wpe": [[...], ...], "layer0.attn_wq": [[...], ...], ...}
//! }
//! ```
//!
//! Floats are written in shortest round-trip form and parsed back exactly, so
//! `load(save(state)) == state` bit for bit.

mod error;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{Hyperparams, Matrix, Model, StateDict};
use crate::tokenizer::{CharTokenizer, Tokenizer};

pub use error::CheckpointError;

/// Vocabulary as persisted: symbols in id order plus their count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VocabRecord {
    pub chars: Vec<String>,
    pub vocab_size: usize,
}

/// In-memory form of a checkpoint document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub hyperparams: Hyperparams,
    pub vocab: VocabRecord,
    pub state_dict: BTreeMap<String, Matrix<f64>>,
}

impl Checkpoint {
    /// Snapshot of `state` (final or best weights) with the model's shape and vocabulary.
    #[must_use]
    pub fn from_parts(
        hyperparams: Hyperparams,
        tokenizer: &CharTokenizer,
        state: &StateDict<f64>,
    ) -> Self {
        Checkpoint {
            hyperparams,
            vocab: VocabRecord {
                chars: tokenizer.symbols().to_vec(),
                vocab_size: tokenizer.vocab_size(),
            },
            state_dict: state.to_named(),
        }
    }

    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        Self::from_parts(model.hyperparams, &model.tokenizer, &model.state)
    }

    /// Rebuilds the vocabulary first, then sizes and checks every matrix against it.
    ///
    /// # Errors
    ///
    /// [`CheckpointError::Model`], [`CheckpointError::Vocab`] or
    /// [`CheckpointError::VocabSizeMismatch`].
    pub fn into_model(self) -> Result<Model, CheckpointError> {
        let Checkpoint {
            hyperparams,
            vocab,
            state_dict,
        } = self;
        hyperparams.validate()?;
        if vocab.vocab_size != vocab.chars.len() {
            return Err(CheckpointError::VocabSizeMismatch {
                declared: vocab.vocab_size,
                actual: vocab.chars.len(),
            });
        }
        let tokenizer = CharTokenizer::from_symbols(vocab.chars)?;
        let state = StateDict::from_named(&hyperparams, tokenizer.vocab_size(), state_dict)?;
        Ok(Model {
            hyperparams,
            tokenizer,
            state,
        })
    }

    /// # Errors
    ///
    /// [`CheckpointError::Json`] if serialization fails. Non-finite weights come out as `null`
    /// and will not load back.
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// [`CheckpointError::Json`] for malformed input.
    pub fn from_json(s: &str) -> Result<Self, CheckpointError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Writes the document to `path` atomically: the full text goes to a sibling temporary
    /// file which is then renamed over `path`.
    ///
    /// # Errors
    ///
    /// [`CheckpointError::Json`] or [`CheckpointError::Io`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let tmp = temp_path(path);
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        log::debug!("wrote checkpoint {}", path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// [`CheckpointError::NotFound`], [`CheckpointError::Io`] or [`CheckpointError::Json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CheckpointError::NotFound(path.to_path_buf()),
            _ => CheckpointError::Io(e),
        })?;
        Self::from_json(&text)
    }
}

/// `dir/.name.tmp` next to the target, so the final rename stays on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "checkpoint".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Saves `model` to `path`.
///
/// # Errors
///
/// See [`Checkpoint::save`].
pub fn save_model(model: &Model, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
    Checkpoint::from_model(model).save(path)
}

/// Loads and validates a model saved by [`save_model`].
///
/// # Errors
///
/// See [`Checkpoint::load`] and [`Checkpoint::into_model`].
pub fn load_model(path: impl AsRef<Path>) -> Result<Model, CheckpointError> {
    Checkpoint::load(path)?.into_model()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::model::ModelError;
    use crate::tokenizer::TokenizerError;

    fn model() -> Model {
        let tokenizer = CharTokenizer::from_docs(&["abcdefgh", "राम", "xyz"]);
        let hp = Hyperparams::new(8, 2, 2, 6);
        let mut m = Model::init(hp, tokenizer, 0.3, &mut StdRng::seed_from_u64(11)).unwrap();
        // give the zero-initialised projections awkward values too
        for (i, w) in m.state.values_mut().enumerate() {
            if *w == 0.0 {
                *w = (i as f64).sqrt() * 1e-7 - 1.0 / 3.0;
            }
        }
        m
    }

    fn bits(state: &StateDict<f64>) -> Vec<u64> {
        state.values().map(|v| v.to_bits()).collect()
    }

    #[test]
    fn save_then_load_is_bit_exact() {
        let m = model();
        assert!(m.vocab_size() >= 10);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_model(&m, &path).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.hyperparams, m.hyperparams);
        assert_eq!(loaded.tokenizer.symbols(), m.tokenizer.symbols());
        assert_eq!(bits(&loaded.state), bits(&m.state));
        assert_eq!(loaded.state, m.state);
    }

    #[test]
    fn save_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        save_model(&model(), &path).unwrap();
        save_model(&model(), &path).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("m.json")]);
    }

    #[test]
    fn document_uses_expected_keys() {
        let json = Checkpoint::from_model(&model()).to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["hyperparams"]["head_dim"], 4);
        assert_eq!(v["vocab"]["chars"][0], "<BOS>");
        assert_eq!(v["vocab"]["chars"][1], "<EOS>");
        assert_eq!(v["vocab"]["vocab_size"], v["vocab"]["chars"].as_array().unwrap().len());
        assert!(v["state_dict"]["layer1.mlp_fc2"].is_array());
        assert!(json.contains('र'), "non-ASCII symbols are stored unescaped");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CheckpointError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"hyperparams\": {\"n_embd\": 8}").unwrap();
        assert!(matches!(load_model(&path), Err(CheckpointError::Json(_))));
        fs::write(&path, "{\"vocab\": {}, \"state_dict\": {}}").unwrap();
        assert!(matches!(load_model(&path), Err(CheckpointError::Json(_))));
    }

    #[test]
    fn structural_problems_are_reported() {
        let base = Checkpoint::from_model(&model());

        let mut c = base.clone();
        c.vocab.vocab_size += 1;
        assert!(matches!(
            c.into_model(),
            Err(CheckpointError::VocabSizeMismatch { .. })
        ));

        let mut c = base.clone();
        c.vocab.chars.retain(|s| s != "<EOS>");
        c.vocab.vocab_size -= 1;
        assert!(matches!(
            c.into_model(),
            Err(CheckpointError::Vocab(TokenizerError::MissingSentinel(
                "<EOS>"
            )))
        ));

        let mut c = base.clone();
        c.hyperparams.head_dim = 3;
        assert!(matches!(
            c.into_model(),
            Err(CheckpointError::Model(ModelError::Hyperparams(_)))
        ));

        let mut c = base.clone();
        c.state_dict.remove("wte");
        assert!(matches!(
            c.into_model(),
            Err(CheckpointError::Model(ModelError::MissingMatrix(_)))
        ));

        let mut c = base;
        c.hyperparams.block_size = 7;
        assert!(matches!(
            c.into_model(),
            Err(CheckpointError::Model(ModelError::Shape { .. }))
        ));
    }
}
