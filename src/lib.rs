pub mod alignment;
pub mod audio;
pub mod config;
pub mod emission;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod vocab;

pub use alignment::gop::{overall_score, MIN_VALID_SCORE, MISSING_SCORE};
pub use alignment::tokenization::tokenize_ipa;
pub use audio::TARGET_SAMPLE_RATE;
pub use config::{GopConfig, ScoreThresholds};
pub use emission::EmissionMatrix;
pub use error::GopError;
pub use pipeline::builder::GopScorerBuilder;
pub use pipeline::g2p::LexiconG2p;
pub use pipeline::runtime::PronunciationScorer;
pub use pipeline::traits::{Grapheme2Phoneme, RawLogits, RuntimeBackend};
pub use types::{PhonemeDetail, UtteranceInput, UtteranceScore, WordAnalysis};
pub use vocab::Vocabulary;
