use crate::error::GopError;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

const MIN_STD_DEV: f64 = 1e-5;

/// Prepares raw PCM for the acoustic model: downmix to mono, linear
/// resample to 16 kHz, normalize to zero mean / unit variance.
pub fn prepare(samples: &[f32], src_rate: u32, channels: u32) -> Result<Vec<f32>, GopError> {
    let mono = mix_to_mono(samples, channels);
    if mono.is_empty() {
        return Err(GopError::EmptyAudio);
    }
    let resampled = resample_linear(mono, src_rate);
    Ok(normalize(resampled))
}

fn mix_to_mono(samples: &[f32], channels: u32) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    let total_frames = samples.len() / channels;
    let mut mono = Vec::with_capacity(total_frames);
    for frame in 0..total_frames {
        let start = frame * channels;
        let sum: f32 = samples[start..start + channels].iter().sum();
        mono.push(sum / channels as f32);
    }
    mono
}

fn resample_linear(audio: Vec<f32>, src_rate: u32) -> Vec<f32> {
    if src_rate == TARGET_SAMPLE_RATE {
        return audio;
    }

    let ratio = f64::from(src_rate) / f64::from(TARGET_SAMPLE_RATE);
    let output_size = (audio.len() as f64 / ratio) as usize;

    let mut resampled = Vec::with_capacity(output_size);
    for i in 0..output_size {
        let src_index = i as f64 * ratio;
        let idx = src_index.floor() as usize;
        let frac = (src_index - idx as f64) as f32;
        if idx + 1 < audio.len() {
            resampled.push(audio[idx] * (1.0 - frac) + audio[idx + 1] * frac);
        } else {
            resampled.push(audio[idx]);
        }
    }
    resampled
}

fn normalize(audio: Vec<f32>) -> Vec<f32> {
    let n = audio.len() as f64;
    let mean = audio.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
    let var = audio
        .iter()
        .map(|&x| {
            let d = f64::from(x) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = var.sqrt().max(MIN_STD_DEV);
    audio
        .iter()
        .map(|&x| ((f64::from(x) - mean) / std_dev) as f32)
        .collect()
}
