/// Sentinel treated as -inf throughout alignment; any score at or below it
/// means "unreachable".
pub const NEG_INF: f32 = -1e9;

/// Dense `T x V` matrix of per-frame per-token log-probabilities, stored
/// row-major. One instance per scored utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionMatrix {
    log_probs: Vec<f32>,
    time_steps: usize,
    vocab_size: usize,
}

impl EmissionMatrix {
    /// Converts raw model logits into log-probabilities, applying a
    /// numerically stable log-softmax per frame.
    pub fn from_raw_logits(mut logits: Vec<f32>, time_steps: usize, vocab_size: usize) -> Self {
        debug_assert_eq!(logits.len(), time_steps * vocab_size);
        for frame in logits.chunks_mut(vocab_size.max(1)) {
            log_softmax_in_place(frame);
        }
        Self {
            log_probs: logits,
            time_steps,
            vocab_size,
        }
    }

    /// Wraps rows that are already log-probabilities (e.g. a backend that
    /// applies softmax itself, or a synthetic matrix in tests).
    pub fn from_log_probs(log_probs: Vec<f32>, time_steps: usize, vocab_size: usize) -> Self {
        debug_assert_eq!(log_probs.len(), time_steps * vocab_size);
        Self {
            log_probs,
            time_steps,
            vocab_size,
        }
    }

    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Out-of-range queries return `NEG_INF` rather than panicking.
    pub fn log_prob(&self, time_step: usize, token_id: usize) -> f32 {
        if time_step >= self.time_steps || token_id >= self.vocab_size {
            return NEG_INF;
        }
        self.log_probs[time_step * self.vocab_size + token_id]
    }
}

/// log_softmax(x)_i = (x_i - m) - log sum_j exp(x_j - m), with m = max_j x_j.
/// The shift keeps exp() from overflowing on realistic logit magnitudes.
fn log_softmax_in_place(frame: &mut [f32]) {
    if frame.is_empty() {
        return;
    }
    let max_val = frame.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let sum_exp: f64 = frame.iter().map(|&x| f64::from(x - max_val).exp()).sum();
    let log_sum_exp = sum_exp.ln() as f32;
    for v in frame.iter_mut() {
        *v = (*v - max_val) - log_sum_exp;
    }
}
