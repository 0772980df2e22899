use crate::error::GopError;

/// Raw logits from one forward pass, before log-softmax. `dims` is the
/// backend-reported shape, expected `[1, T, V]` or `[T, V]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLogits {
    pub dims: Vec<i64>,
    pub logits: Vec<f32>,
}

/// Acoustic model seam: one synchronous forward pass per utterance over
/// mono 16 kHz normalized samples.
pub trait RuntimeBackend: Send + Sync {
    fn infer(&self, normalized_audio: &[f32]) -> Result<RawLogits, GopError>;

    fn device_label(&self) -> String;
}

/// Grapheme-to-phoneme seam. The returned IPA string may contain stress
/// marks, spaces, and underscores; the tokenizer strips them.
pub trait Grapheme2Phoneme: Send + Sync {
    fn ipa(&self, text: &str) -> Result<String, GopError>;
}

/// Validates backend-reported logits dims against the flat buffer length
/// and extracts `(time_steps, vocab_size)`.
pub(crate) fn parse_logits_shape(dims: &[i64], logits_len: usize) -> Result<(usize, usize), GopError> {
    let (time_steps, vocab_size) = match dims {
        [batch, t, v] => {
            let batch = non_negative_dim(*batch, "batch")?;
            if batch != 1 {
                return Err(GopError::invalid_input(format!(
                    "logits batch size must be 1, got {batch}"
                )));
            }
            (positive_dim(*t, "time")?, positive_dim(*v, "vocab")?)
        }
        [t, v] => (positive_dim(*t, "time")?, positive_dim(*v, "vocab")?),
        _ => {
            return Err(GopError::invalid_input(format!(
                "unsupported logits rank {}; expected [1, T, V] or [T, V]",
                dims.len()
            )));
        }
    };

    let expected_len = time_steps
        .checked_mul(vocab_size)
        .ok_or_else(|| GopError::invalid_input("logits shape is too large"))?;
    if expected_len != logits_len {
        return Err(GopError::invalid_input(format!(
            "logits shape/data mismatch: shape implies {expected_len} values, got {logits_len}"
        )));
    }
    Ok((time_steps, vocab_size))
}

fn non_negative_dim(value: i64, name: &'static str) -> Result<usize, GopError> {
    if value < 0 {
        return Err(GopError::invalid_input(format!(
            "logits {name} dimension must be >= 0, got {value}"
        )));
    }
    Ok(value as usize)
}

fn positive_dim(value: i64, name: &'static str) -> Result<usize, GopError> {
    if value <= 0 {
        return Err(GopError::invalid_input(format!(
            "logits {name} dimension must be > 0, got {value}"
        )));
    }
    Ok(value as usize)
}
