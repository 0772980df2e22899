use std::path::Path;

use crate::config::GopConfig;
use crate::error::GopError;
use crate::pipeline::g2p::LexiconG2p;
use crate::pipeline::model_runtime::build_runtime_backend;
use crate::pipeline::runtime::{PronunciationScorer, PronunciationScorerParts};
use crate::pipeline::traits::{Grapheme2Phoneme, RuntimeBackend};
use crate::vocab::Vocabulary;

pub struct GopScorerBuilder {
    config: GopConfig,
    backend: Option<Box<dyn RuntimeBackend>>,
    g2p: Option<Box<dyn Grapheme2Phoneme>>,
}

impl GopScorerBuilder {
    pub fn new(config: GopConfig) -> Self {
        Self {
            config,
            backend: None,
            g2p: None,
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn RuntimeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_g2p(mut self, g2p: Box<dyn Grapheme2Phoneme>) -> Self {
        self.g2p = Some(g2p);
        self
    }

    pub fn build(self) -> Result<PronunciationScorer, GopError> {
        let vocab = Vocabulary::load(Path::new(&self.config.vocab_path), self.config.blank_id)?;
        tracing::info!(
            tokens = vocab.len(),
            blank_id = vocab.blank_id(),
            "vocabulary loaded"
        );

        let g2p: Box<dyn Grapheme2Phoneme> = match self.g2p {
            Some(g2p) => g2p,
            None => {
                if self.config.lexicon_path.is_empty() {
                    return Err(GopError::g2p(
                        "no G2P configured: set lexicon_path or inject one with with_g2p",
                    ));
                }
                Box::new(LexiconG2p::load(Path::new(&self.config.lexicon_path))?)
            }
        };

        let backend = match self.backend {
            Some(backend) => backend,
            None => build_runtime_backend(&self.config)?,
        };

        Ok(PronunciationScorer::from_parts(PronunciationScorerParts {
            backend,
            vocab,
            g2p,
            thresholds: self.config.thresholds,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_without_injected_seams() {
        let builder = GopScorerBuilder::new(GopConfig::default());
        assert!(builder.backend.is_none());
        assert!(builder.g2p.is_none());
    }

    #[test]
    fn missing_vocab_file_fails_build() {
        let config = GopConfig {
            vocab_path: "/nonexistent/vocab.json".to_string(),
            ..GopConfig::default()
        };
        let err = GopScorerBuilder::new(config).build().expect_err("must fail");
        assert!(matches!(err, GopError::Io { .. }));
    }
}
