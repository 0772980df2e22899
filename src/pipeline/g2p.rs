use std::collections::HashMap;
use std::path::Path;

use crate::error::GopError;
use crate::pipeline::traits::Grapheme2Phoneme;

/// Dictionary-backed G2P: a JSON object mapping lowercase words to raw IPA
/// strings. Lookups are case-folded; a miss degrades the word (empty IPA,
/// warned) instead of aborting the utterance.
#[derive(Debug)]
pub struct LexiconG2p {
    entries: HashMap<String, String>,
}

impl LexiconG2p {
    pub fn load(path: &Path) -> Result<Self, GopError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| GopError::io("read lexicon.json", e))?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, GopError> {
        let entries: HashMap<String, String> =
            serde_json::from_str(data).map_err(|e| GopError::json("parse lexicon.json", e))?;
        tracing::info!(entries = entries.len(), "G2P lexicon loaded");
        Ok(Self { entries })
    }

    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Grapheme2Phoneme for LexiconG2p {
    fn ipa(&self, text: &str) -> Result<String, GopError> {
        let key = text.to_lowercase();
        match self.entries.get(&key) {
            Some(ipa) => Ok(ipa.clone()),
            None => {
                if !key.is_empty() {
                    tracing::warn!(word = %text, "word missing from G2P lexicon");
                }
                Ok(String::new())
            }
        }
    }
}
