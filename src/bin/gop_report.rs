use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gop_rs::{GopConfig, GopScorerBuilder, UtteranceInput, UtteranceScore};

#[derive(Debug, Parser)]
#[command(
    name = "gop_report",
    about = "Score a WAV recording against a reference sentence and print a JSON report"
)]
struct Args {
    /// Phoneme CTC acoustic model (ONNX).
    #[arg(long)]
    model: PathBuf,
    /// Vocabulary JSON mapping phoneme strings to token ids.
    #[arg(long)]
    vocab: PathBuf,
    /// G2P lexicon JSON mapping words to raw IPA.
    #[arg(long)]
    lexicon: PathBuf,
    /// WAV file with the spoken utterance.
    #[arg(long)]
    wav: PathBuf,
    /// Reference sentence the speaker was asked to read.
    #[arg(long)]
    text: String,
    /// Inference device: cpu or cuda.
    #[arg(long, default_value = "cpu")]
    device: String,
    /// CTC blank token id.
    #[arg(long, default_value_t = 0)]
    blank_id: usize,
    /// Override the per-phoneme pass threshold.
    #[arg(long)]
    threshold_good: Option<f32>,
    /// Override the excellent threshold used in the summary tally.
    #[arg(long)]
    threshold_excellent: Option<f32>,
    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        tracing::error!(error = %err, "scoring failed");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GopConfig {
        model_path: args.model.to_string_lossy().into_owned(),
        vocab_path: args.vocab.to_string_lossy().into_owned(),
        lexicon_path: args.lexicon.to_string_lossy().into_owned(),
        device: args.device.clone(),
        blank_id: args.blank_id,
        ..GopConfig::default()
    };
    if let Some(good) = args.threshold_good {
        config.thresholds.good = good;
    }
    if let Some(excellent) = args.threshold_excellent {
        config.thresholds.excellent = excellent;
    }

    let scorer = GopScorerBuilder::new(config).build()?;
    tracing::info!(device = %scorer.device_label(), "scorer ready");

    let (samples, sample_rate_hz, channels) = read_wav_f32(&args.wav)?;
    let input = UtteranceInput {
        samples,
        sample_rate_hz,
        channels,
        sentence: args.text.clone(),
    };

    let score = scorer.score(&input)?;
    log_summary(&score, scorer.thresholds().excellent, scorer.thresholds().good);

    let report = report_json(&score);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");
    Ok(())
}

/// Decodes a WAV file to interleaved f32 PCM; integer formats are scaled to
/// [-1, 1]. Channel layout is preserved for the core's downmix.
fn read_wav_f32(path: &Path) -> Result<(Vec<f32>, u32, u32), hound::Error> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = ((1_i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    tracing::debug!(
        samples = samples.len(),
        sample_rate_hz = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        "wav decoded"
    );
    Ok((samples, spec.sample_rate, u32::from(spec.channels)))
}

fn log_summary(score: &UtteranceScore, excellent: f32, good: f32) {
    let mut n_excellent = 0usize;
    let mut n_good = 0usize;
    let mut n_poor = 0usize;
    for word in &score.words {
        for detail in &word.details {
            if detail.score > excellent {
                n_excellent += 1;
            } else if detail.score > good {
                n_good += 1;
            } else {
                n_poor += 1;
            }
        }
    }
    tracing::info!(
        overall = score.overall_score,
        excellent = n_excellent,
        good = n_good,
        poor = n_poor,
        "phoneme tally"
    );
}

fn report_json(score: &UtteranceScore) -> serde_json::Value {
    serde_json::json!({
        "words": score
            .words
            .iter()
            .map(|w| {
                serde_json::json!({
                    "word": w.word,
                    "score": w.word_score,
                    "phonemes": w
                        .details
                        .iter()
                        .map(|d| {
                            serde_json::json!({
                                "ipa": d.ipa,
                                "score": d.score,
                                "is_good": d.is_good,
                                "start_frame": d.start_frame,
                                "end_frame": d.end_frame,
                            })
                        })
                        .collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>(),
        "overall_score": score.overall_score,
    })
}
