use crate::vocab::Vocabulary;

/// Widest byte window tried by greatest-match; covers phoneme graphemes of
/// up to four 2-byte codepoints (e.g. an aspirated affricate).
pub const MAX_TOKEN_BYTES: usize = 8;

/// Segments a raw G2P IPA string into vocabulary tokens.
///
/// Stress marks and word separators are stripped first, then the cleaned
/// codepoint stream is consumed by greatest-match: at each position the
/// longest byte substring that is a vocabulary key wins, so a diphthong key
/// like "eɪ" beats its "e" prefix. Codepoints no key starts with are logged
/// and skipped.
pub fn tokenize_ipa(raw_ipa: &str, vocab: &Vocabulary) -> Vec<String> {
    let cleaned = clean_ipa(raw_ipa);
    let bytes_len = cleaned.len();

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes_len {
        let max_try = MAX_TOKEN_BYTES.min(bytes_len - i);
        let mut matched = false;
        for len in (1..=max_try).rev() {
            // Substring boundaries only matter at codepoint edges; a slice
            // ending mid-codepoint cannot equal a UTF-8 vocabulary key.
            if !cleaned.is_char_boundary(i + len) {
                continue;
            }
            let candidate = &cleaned[i..i + len];
            if vocab.contains(candidate) {
                tokens.push(candidate.to_string());
                i += len;
                matched = true;
                break;
            }
        }
        if !matched {
            let Some(unknown) = cleaned[i..].chars().next() else {
                break;
            };
            tracing::warn!(codepoint = %unknown, "IPA codepoint not covered by any vocabulary key");
            i += unknown.len_utf8();
        }
    }
    tokens
}

/// Drops primary/secondary stress marks, spaces, underscores, and
/// non-breaking spaces. Everything else (length marks, ties) passes through;
/// the vocabulary decides whether those are atomic.
fn clean_ipa(raw_ipa: &str) -> String {
    raw_ipa
        .chars()
        .filter(|&c| !matches!(c, '\u{02C8}' | '\u{02CC}' | ' ' | '_' | '\u{00A0}'))
        .collect()
}
