pub mod gop;
pub mod reference;
pub mod tokenization;
pub(crate) mod viterbi;

use crate::config::ScoreThresholds;
use crate::emission::EmissionMatrix;
use crate::error::GopError;
use crate::types::WordAnalysis;
use crate::vocab::Vocabulary;

/// Forced alignment plus GOP scoring over a prepared reference.
///
/// Mutates `words` in place: every in-vocabulary phoneme receives a
/// `PhonemeDetail` with its frame span and mean log-probability along the
/// Viterbi path, and every word receives its aggregate score.
pub fn calculate_gop(
    emission: &EmissionMatrix,
    words: &mut [WordAnalysis],
    vocab: &Vocabulary,
    thresholds: &ScoreThresholds,
) -> Result<(), GopError> {
    let flat = viterbi::flatten_targets(words, vocab);
    if flat.is_empty() {
        return Err(GopError::NoValidTargets);
    }

    let states = viterbi::expand_states(&flat, vocab.blank_id());
    let path = viterbi::viterbi_path(emission, &states, vocab.blank_id())?;

    gop::score_targets(emission, &path, &flat, words, thresholds);
    gop::aggregate_word_scores(words);

    tracing::debug!(
        time_steps = emission.time_steps(),
        state_len = states.len(),
        targets = flat.len(),
        "alignment completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::gop::MISSING_SCORE;
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_json_str(r#"{"<blank>":0,"a":1,"b":2}"#, 0).expect("valid vocab json")
    }

    fn word(surface: &str, phonemes: &[&str]) -> WordAnalysis {
        WordAnalysis {
            word: surface.to_string(),
            raw_ipa: phonemes.concat(),
            phonemes: phonemes.iter().map(|p| p.to_string()).collect(),
            details: Vec::new(),
            word_score: 0.0,
        }
    }

    #[test]
    fn empty_reference_has_no_valid_targets() {
        let emission = EmissionMatrix::from_log_probs(vec![-1.0; 3], 1, 3);
        let mut words = Vec::new();
        let err = calculate_gop(&emission, &mut words, &vocab(), &ScoreThresholds::default())
            .expect_err("must fail");
        assert!(matches!(err, GopError::NoValidTargets));
    }

    #[test]
    fn fully_unknown_reference_has_no_valid_targets() {
        let emission = EmissionMatrix::from_log_probs(vec![-1.0; 3], 1, 3);
        let mut words = vec![word("zz", &["z", "z"])];
        let err = calculate_gop(&emission, &mut words, &vocab(), &ScoreThresholds::default())
            .expect_err("must fail");
        assert!(matches!(err, GopError::NoValidTargets));
    }

    #[test]
    fn blank_only_vocabulary_has_no_valid_targets() {
        let blank_only = Vocabulary::from_json_str(r#"{"<blank>":0}"#, 0).expect("valid json");
        let emission = EmissionMatrix::from_log_probs(vec![-1.0; 3], 3, 1);
        let mut words = vec![word("ab", &["a", "b"])];
        let err = calculate_gop(&emission, &mut words, &blank_only, &ScoreThresholds::default())
            .expect_err("must fail");
        assert!(matches!(err, GopError::NoValidTargets));
    }

    #[test]
    fn unknown_only_word_degrades_and_rest_is_scored() {
        // "q" is out of vocabulary; its word ends with no details and the
        // missing score while the other word aligns normally.
        let rows: Vec<f32> = vec![
            -5.0, -0.1, -5.0, //
            -5.0, -0.1, -5.0, //
            -5.0, -5.0, -0.1, //
            -5.0, -5.0, -0.1, //
        ];
        let emission = EmissionMatrix::from_log_probs(rows, 4, 3);
        let mut words = vec![word("q", &["q"]), word("ab", &["a", "b"])];
        calculate_gop(&emission, &mut words, &vocab(), &ScoreThresholds::default())
            .expect("alignment");

        assert!(words[0].details.is_empty());
        assert_eq!(words[0].word_score, MISSING_SCORE);

        assert_eq!(words[1].details.len(), 2);
        assert!(words[1].word_score > MISSING_SCORE);
        assert!(words[1].details.len() <= words[1].phonemes.len());
    }

    #[test]
    fn word_scores_are_nonpositive_or_missing() {
        let rows: Vec<f32> = vec![
            -0.5, -1.0, -2.0, //
            -2.0, -0.5, -1.0, //
            -1.0, -2.0, -0.5, //
            -0.5, -1.0, -2.0, //
        ];
        let emission = EmissionMatrix::from_log_probs(rows, 4, 3);
        let mut words = vec![word("ab", &["a", "b"])];
        calculate_gop(&emission, &mut words, &vocab(), &ScoreThresholds::default())
            .expect("alignment");
        for w in &words {
            assert!(w.word_score <= 0.0 || w.word_score == MISSING_SCORE);
        }
        let overall = gop::overall_score(&words);
        assert!(overall <= 0.0 || overall == MISSING_SCORE);
    }

    #[test]
    fn rescoring_replaces_previous_details() {
        let rows: Vec<f32> = vec![
            -5.0, -0.1, -5.0, //
            -5.0, -5.0, -0.1, //
        ];
        let emission = EmissionMatrix::from_log_probs(rows, 2, 3);
        let mut words = vec![word("ab", &["a", "b"])];
        calculate_gop(&emission, &mut words, &vocab(), &ScoreThresholds::default())
            .expect("first pass");
        calculate_gop(&emission, &mut words, &vocab(), &ScoreThresholds::default())
            .expect("second pass");
        assert_eq!(words[0].details.len(), 2);
    }
}
