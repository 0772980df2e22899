use crate::alignment::viterbi::FlatTarget;
use crate::config::ScoreThresholds;
use crate::emission::EmissionMatrix;
use crate::types::{PhonemeDetail, WordAnalysis};

/// Score assigned to phonemes and words the aligner could not place.
pub const MISSING_SCORE: f32 = -10.0;

/// Details at or below this are excluded from word means; they mark
/// phonemes that were effectively not detected.
pub const MIN_VALID_SCORE: f32 = -9.0;

/// Walks the decoded path once per flat target, collects the frames spent
/// in its state (`2i + 1`), and appends a `PhonemeDetail` to the owning
/// word. A target the path squeezed out gets `MISSING_SCORE` and a `-1`
/// frame span.
pub(crate) fn score_targets(
    emission: &EmissionMatrix,
    path: &[usize],
    flat: &[FlatTarget],
    words: &mut [WordAnalysis],
    thresholds: &ScoreThresholds,
) {
    for (i, target) in flat.iter().enumerate() {
        let target_state = 2 * i + 1;

        let mut start_frame: i32 = -1;
        let mut end_frame: i32 = -1;
        let mut sum_log_prob = 0.0f32;
        let mut count = 0u32;

        for (t, &state) in path.iter().enumerate() {
            if state == target_state {
                if start_frame == -1 {
                    start_frame = t as i32;
                }
                end_frame = t as i32;
                sum_log_prob += emission.log_prob(t, target.token_id);
                count += 1;
            }
        }

        let score = if count > 0 {
            sum_log_prob / count as f32
        } else {
            MISSING_SCORE
        };

        tracing::trace!(
            word_idx = target.word_idx,
            phoneme_idx = target.phoneme_idx,
            ipa = %target.text,
            score,
            "scored phoneme"
        );

        words[target.word_idx].details.push(PhonemeDetail {
            ipa: target.text.clone(),
            token_id: target.token_id,
            score,
            is_good: score > thresholds.good,
            start_frame,
            end_frame,
        });
    }
}

/// Word score is the mean over details above `MIN_VALID_SCORE`;
/// `MISSING_SCORE` when none qualify.
pub(crate) fn aggregate_word_scores(words: &mut [WordAnalysis]) {
    for word in words.iter_mut() {
        let mut total = 0.0f32;
        let mut valid = 0u32;
        for detail in &word.details {
            if detail.score > MIN_VALID_SCORE {
                total += detail.score;
                valid += 1;
            }
        }
        word.word_score = if valid > 0 {
            total / valid as f32
        } else {
            MISSING_SCORE
        };
    }
}

/// Utterance score is the mean over words above `MISSING_SCORE`;
/// `MISSING_SCORE` when none qualify.
pub fn overall_score(words: &[WordAnalysis]) -> f32 {
    let mut total = 0.0f32;
    let mut valid = 0u32;
    for word in words {
        if word.word_score > MISSING_SCORE {
            total += word.word_score;
            valid += 1;
        }
    }
    if valid > 0 {
        total / valid as f32
    } else {
        MISSING_SCORE
    }
}
