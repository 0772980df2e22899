use crate::alignment::{calculate_gop, gop, reference};
use crate::audio;
use crate::config::ScoreThresholds;
use crate::emission::EmissionMatrix;
use crate::error::GopError;
use crate::pipeline::traits::{parse_logits_shape, Grapheme2Phoneme, RuntimeBackend};
use crate::types::{UtteranceInput, UtteranceScore};
use crate::vocab::Vocabulary;

/// End-to-end pronunciation scorer: preprocessing, acoustic inference,
/// reference assembly, forced alignment, and GOP aggregation for one
/// utterance per call.
pub struct PronunciationScorer {
    backend: Box<dyn RuntimeBackend>,
    vocab: Vocabulary,
    g2p: Box<dyn Grapheme2Phoneme>,
    thresholds: ScoreThresholds,
}

impl std::fmt::Debug for PronunciationScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PronunciationScorer").finish_non_exhaustive()
    }
}

pub(crate) struct PronunciationScorerParts {
    pub backend: Box<dyn RuntimeBackend>,
    pub vocab: Vocabulary,
    pub g2p: Box<dyn Grapheme2Phoneme>,
    pub thresholds: ScoreThresholds,
}

impl PronunciationScorer {
    pub(crate) fn from_parts(parts: PronunciationScorerParts) -> Self {
        Self {
            backend: parts.backend,
            vocab: parts.vocab,
            g2p: parts.g2p,
            thresholds: parts.thresholds,
        }
    }

    /// Scores one utterance against its reference sentence.
    pub fn score(&self, input: &UtteranceInput) -> Result<UtteranceScore, GopError> {
        let prepared = audio::prepare(&input.samples, input.sample_rate_hz, input.channels)?;

        let raw = self.backend.infer(&prepared)?;
        let (time_steps, vocab_size) = parse_logits_shape(&raw.dims, raw.logits.len())?;
        if vocab_size < self.vocab.len() {
            tracing::warn!(
                model_vocab = vocab_size,
                file_vocab = self.vocab.len(),
                "model emits fewer tokens than the vocabulary file defines"
            );
        }
        let emission = EmissionMatrix::from_raw_logits(raw.logits, time_steps, vocab_size);

        let mut words = reference::build_reference(&input.sentence, self.g2p.as_ref(), &self.vocab)?;
        calculate_gop(&emission, &mut words, &self.vocab, &self.thresholds)?;
        let overall_score = gop::overall_score(&words);

        tracing::debug!(
            words = words.len(),
            time_steps,
            overall_score,
            "utterance scored"
        );
        Ok(UtteranceScore {
            words,
            overall_score,
        })
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn thresholds(&self) -> ScoreThresholds {
        self.thresholds
    }

    pub fn device_label(&self) -> String {
        self.backend.device_label()
    }
}
