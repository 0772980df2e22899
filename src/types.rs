#[derive(Debug, Clone)]
pub struct UtteranceInput {
    pub samples: Vec<f32>,
    pub sample_rate_hz: u32,
    pub channels: u32,
    /// Reference sentence the speaker was asked to read.
    pub sentence: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeDetail {
    pub ipa: String,
    pub token_id: usize,
    /// Mean log-probability of the token over the frames the aligner
    /// assigned to it, or -10.0 when the phoneme got zero frames.
    pub score: f32,
    pub is_good: bool,
    /// Frame span is [start_frame, end_frame] inclusive, in the acoustic
    /// model's native stride; both -1 when the phoneme got zero frames.
    pub start_frame: i32,
    pub end_frame: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordAnalysis {
    /// Surface form as it appeared in the sentence, punctuation included.
    pub word: String,
    pub raw_ipa: String,
    pub phonemes: Vec<String>,
    /// One entry per in-vocabulary phoneme; shorter than `phonemes` when
    /// some were skipped as unknown to the vocabulary.
    pub details: Vec<PhonemeDetail>,
    pub word_score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceScore {
    pub words: Vec<WordAnalysis>,
    pub overall_score: f32,
}
