use crate::alignment::tokenization::tokenize_ipa;
use crate::error::GopError;
use crate::pipeline::traits::Grapheme2Phoneme;
use crate::types::WordAnalysis;
use crate::vocab::Vocabulary;

/// Builds the structured reference for a sentence: one `WordAnalysis` per
/// whitespace-separated surface word, carrying the G2P output and its
/// vocabulary tokenization. Scores and details are filled in by alignment.
pub fn build_reference(
    sentence: &str,
    g2p: &dyn Grapheme2Phoneme,
    vocab: &Vocabulary,
) -> Result<Vec<WordAnalysis>, GopError> {
    let mut words = Vec::new();
    for surface in sentence.split_ascii_whitespace() {
        let clean: String = surface
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();
        let raw_ipa = g2p.ipa(&clean)?;
        let phonemes = tokenize_ipa(&raw_ipa, vocab);
        words.push(WordAnalysis {
            word: surface.to_string(),
            raw_ipa,
            phonemes,
            details: Vec::new(),
            word_score: 0.0,
        });
    }
    Ok(words)
}
