use crate::emission::{EmissionMatrix, NEG_INF};
use crate::error::GopError;
use crate::types::WordAnalysis;
use crate::vocab::Vocabulary;

/// One in-vocabulary reference phoneme after flattening, remembering where
/// in the (word, phoneme) structure it came from.
#[derive(Debug, Clone)]
pub(crate) struct FlatTarget {
    pub word_idx: usize,
    pub phoneme_idx: usize,
    pub token_id: usize,
    pub text: String,
}

/// Flattens the word list into the ordered target sequence the lattice is
/// built from. Clears any stale per-word scoring state. Phonemes missing
/// from the vocabulary are warned about and skipped; the word keeps its
/// remaining phonemes.
pub(crate) fn flatten_targets(words: &mut [WordAnalysis], vocab: &Vocabulary) -> Vec<FlatTarget> {
    let mut flat = Vec::new();
    for (word_idx, word) in words.iter_mut().enumerate() {
        word.details.clear();
        word.word_score = 0.0;

        for (phoneme_idx, phoneme) in word.phonemes.iter().enumerate() {
            match vocab.token_id(phoneme) {
                Some(token_id) => flat.push(FlatTarget {
                    word_idx,
                    phoneme_idx,
                    token_id,
                    text: phoneme.clone(),
                }),
                None => {
                    tracing::warn!(
                        phoneme = %phoneme,
                        word = %word.word,
                        "skipping phoneme unknown to the vocabulary"
                    );
                }
            }
        }
    }
    flat
}

/// Interleaves blanks around the targets: `[A, B]` becomes
/// `[blank, A, blank, B, blank]`. The target at flat index `i` lives at
/// state index `2i + 1`.
pub(crate) fn expand_states(flat: &[FlatTarget], blank_id: usize) -> Vec<usize> {
    let mut states = Vec::with_capacity(flat.len() * 2 + 1);
    for target in flat {
        states.push(blank_id);
        states.push(target.token_id);
    }
    states.push(blank_id);
    states
}

/// CTC Viterbi forced alignment over the expanded state sequence.
///
/// Returns the per-frame state index of the best path ending in the
/// trailing blank or the final target, whichever scores higher. Transitions
/// per frame are stay (`s`), step (`s-1`), and skip-blank (`s-2`, only onto
/// a non-blank whose predecessor label differs, as CTC forbids merging
/// identical adjacent labels). Exact ties keep the earliest-evaluated
/// predecessor in that order.
pub(crate) fn viterbi_path(
    emission: &EmissionMatrix,
    states: &[usize],
    blank_id: usize,
) -> Result<Vec<usize>, GopError> {
    let t_len = emission.time_steps();
    let s_len = states.len();
    if t_len == 0 || s_len == 0 {
        return Err(GopError::AlignmentBroken);
    }

    // dp[t * S + s] is the log-score of the best path ending in state s at
    // frame t; back holds its predecessor state, -1 when unreachable.
    let mut dp = vec![NEG_INF; t_len * s_len];
    let mut back = vec![-1i32; t_len * s_len];

    // Only the leading blank and the first target are valid entry states.
    dp[0] = emission.log_prob(0, states[0]);
    if s_len > 1 {
        dp[1] = emission.log_prob(0, states[1]);
    }

    for t in 1..t_len {
        let prev_offset = (t - 1) * s_len;
        let offset = t * s_len;
        for s in 0..s_len {
            let emit = emission.log_prob(t, states[s]);

            let mut best = NEG_INF;
            let mut best_prev = -1i32;

            let stay = dp[prev_offset + s];
            if stay > best {
                best = stay;
                best_prev = s as i32;
            }

            if s >= 1 {
                let step = dp[prev_offset + s - 1];
                if step > best {
                    best = step;
                    best_prev = (s - 1) as i32;
                }
            }

            if s >= 2
                && states[s] != blank_id
                && states[s - 1] == blank_id
                && states[s - 2] != states[s]
            {
                let skip = dp[prev_offset + s - 2];
                if skip > best {
                    best = skip;
                    best_prev = (s - 2) as i32;
                }
            }

            if best_prev != -1 {
                dp[offset + s] = best + emit;
                back[offset + s] = best_prev;
            }
        }
    }

    // Valid terminals: trailing blank or final target.
    let last_offset = (t_len - 1) * s_len;
    let score_blank = dp[last_offset + s_len - 1];
    let score_last = if s_len > 1 {
        dp[last_offset + s_len - 2]
    } else {
        NEG_INF
    };
    let terminal = if score_blank > score_last {
        s_len - 1
    } else {
        s_len.saturating_sub(2)
    };

    if dp[last_offset + terminal] <= NEG_INF {
        return Err(GopError::AlignmentBroken);
    }

    let mut path = vec![0usize; t_len];
    let mut s = terminal as i32;
    for t in (0..t_len).rev() {
        path[t] = s as usize;
        s = back[t * s_len + s as usize];
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordAnalysis;

    fn word(surface: &str, phonemes: &[&str]) -> WordAnalysis {
        WordAnalysis {
            word: surface.to_string(),
            raw_ipa: phonemes.concat(),
            phonemes: phonemes.iter().map(|p| p.to_string()).collect(),
            details: Vec::new(),
            word_score: 0.0,
        }
    }

    fn vocab() -> Vocabulary {
        Vocabulary::from_json_str(r#"{"<blank>":0,"a":1,"b":2}"#, 0).expect("valid vocab json")
    }

    /// T x V matrix where `rows[t]` lists each token's log-prob at frame t.
    fn emission(rows: &[&[f32]]) -> EmissionMatrix {
        let vocab_size = rows[0].len();
        let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        EmissionMatrix::from_log_probs(flat, rows.len(), vocab_size)
    }

    #[test]
    fn flatten_skips_unknown_and_clears_details() {
        let mut words = vec![word("ab", &["a", "q", "b"]), word("q", &["q"])];
        words[0].word_score = 1.0;
        let flat = flatten_targets(&mut words, &vocab());
        assert_eq!(flat.len(), 2);
        assert_eq!(
            flat.iter().map(|t| t.token_id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(flat[1].word_idx, 0);
        assert_eq!(flat[1].phoneme_idx, 2);
        assert_eq!(words[0].word_score, 0.0);
    }

    #[test]
    fn expand_interleaves_blanks() {
        let mut words = vec![word("ab", &["a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        assert_eq!(expand_states(&flat, 0), vec![0, 1, 0, 2, 0]);
    }

    #[test]
    fn canonical_path_follows_strong_emissions() {
        // states = [0, 1, 0, 2, 0]; make a strong on frames 0-1 and b strong
        // on frames 2-4 so the best path is 1,1,3,3,3 with no trailing blank.
        let e = emission(&[
            &[-5.0, -0.1, -5.0],
            &[-5.0, -0.1, -5.0],
            &[-5.0, -5.0, -0.1],
            &[-5.0, -5.0, -0.1],
            &[-5.0, -5.0, -0.1],
        ]);
        let mut words = vec![word("ab", &["a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        let path = viterbi_path(&e, &states, 0).expect("alignment");
        assert_eq!(path, vec![1, 1, 3, 3, 3]);
    }

    #[test]
    fn path_steps_are_monotone_and_bounded() {
        let e = emission(&[
            &[-0.5, -1.0, -2.0],
            &[-2.0, -0.5, -1.0],
            &[-0.5, -2.0, -1.0],
            &[-1.0, -2.0, -0.5],
            &[-0.5, -2.0, -1.0],
            &[-0.5, -2.0, -1.0],
        ]);
        let mut words = vec![word("ab", &["a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        let path = viterbi_path(&e, &states, 0).expect("alignment");
        for pair in path.windows(2) {
            let delta = pair[1] as i64 - pair[0] as i64;
            assert!((0..=2).contains(&delta), "step {delta} out of range");
        }
    }

    #[test]
    fn repeated_label_must_pass_through_blank() {
        // Reference [a, a]: the skip from state 1 to state 3 is forbidden
        // because both carry the same label, so the middle blank at state 2
        // must appear on the path.
        let e = emission(&[
            &[-5.0, -0.1, -5.0],
            &[-5.0, -0.1, -5.0],
            &[-0.1, -5.0, -5.0],
            &[-5.0, -0.1, -5.0],
            &[-5.0, -0.1, -5.0],
        ]);
        let mut words = vec![word("aa", &["a", "a"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        assert_eq!(states, vec![0, 1, 0, 1, 0]);
        let path = viterbi_path(&e, &states, 0).expect("alignment");
        assert!(path.contains(&2), "path {path:?} skipped the middle blank");
    }

    #[test]
    fn distinct_labels_may_skip_the_blank() {
        let e = emission(&[
            &[-5.0, -0.1, -5.0],
            &[-5.0, -5.0, -0.1],
        ]);
        let mut words = vec![word("ab", &["a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        let path = viterbi_path(&e, &states, 0).expect("alignment");
        assert_eq!(path, vec![1, 3]);
    }

    #[test]
    fn unreachable_terminals_break_alignment() {
        // T=1 with S=5: neither terminal state is reachable at frame 0.
        let e = emission(&[&[-0.1, -5.0, -5.0]]);
        let mut words = vec![word("ab", &["a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        let err = viterbi_path(&e, &states, 0).expect_err("must break");
        assert!(matches!(err, GopError::AlignmentBroken));
    }

    #[test]
    fn too_few_frames_is_an_error_not_a_panic() {
        let e = emission(&[
            &[-0.1, -5.0, -5.0],
            &[-0.1, -5.0, -5.0],
        ]);
        let mut words = vec![word("abab", &["a", "b", "a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        assert!(states.len() > e.time_steps());
        assert!(viterbi_path(&e, &states, 0).is_err());
    }

    #[test]
    fn exact_frame_budget_visits_every_state() {
        // T == S forces each state to be visited exactly once.
        let e = emission(&[
            &[-0.1, -5.0, -5.0],
            &[-5.0, -0.1, -5.0],
            &[-0.1, -5.0, -5.0],
            &[-5.0, -5.0, -0.1],
            &[-0.1, -5.0, -5.0],
        ]);
        let mut words = vec![word("ab", &["a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        let path = viterbi_path(&e, &states, 0).expect("alignment");
        assert_eq!(path, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn terminal_tie_prefers_final_target() {
        // Equal scores at both terminals: the final target state wins.
        let e = emission(&[
            &[-1.0, -1.0, -1.0],
            &[-1.0, -1.0, -1.0],
            &[-1.0, -1.0, -1.0],
            &[-1.0, -1.0, -1.0],
            &[-1.0, -1.0, -1.0],
        ]);
        let mut words = vec![word("ab", &["a", "b"])];
        let flat = flatten_targets(&mut words, &vocab());
        let states = expand_states(&flat, 0);
        let path = viterbi_path(&e, &states, 0).expect("alignment");
        assert_eq!(*path.last().expect("nonempty"), states.len() - 2);
    }
}
