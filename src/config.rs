/// Classification thresholds over per-phoneme mean log-probabilities.
///
/// These are empirical policy values, not derived quantities; callers tuning
/// for a different acoustic model are expected to override them.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct ScoreThresholds {
    /// Scores above this are considered excellent.
    pub excellent: f32,
    /// Scores above this pass the per-phoneme `is_good` judgement.
    pub good: f32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            excellent: -1.0,
            good: -2.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GopConfig {
    pub model_path: String,
    pub vocab_path: String,
    /// JSON word -> IPA lexicon backing the default G2P. May stay empty when
    /// a custom `Grapheme2Phoneme` is injected through the builder.
    pub lexicon_path: String,
    pub device: String,
    /// CTC blank token id in the vocabulary.
    pub blank_id: usize,
    pub thresholds: ScoreThresholds,
}

impl GopConfig {
    pub const DEFAULT_BLANK_ID: usize = 0;
}

impl Default for GopConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            vocab_path: String::new(),
            lexicon_path: String::new(),
            device: "cpu".to_string(),
            blank_id: Self::DEFAULT_BLANK_ID,
            thresholds: ScoreThresholds::default(),
        }
    }
}
