//! WAV serialization of the master buffer.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::FlapgenResult;

/// Write mono `f32` samples as a 16-bit PCM WAV file.
///
/// Samples are clamped to [-1, 1] before quantization. Parent directories are
/// created as needed.
pub fn write_wav_pcm16(out_path: &Path, samples: &[f32], sample_rate: u32) -> FlapgenResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create audio output dir '{}'", parent.display()))?;
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(out_path, spec)
        .with_context(|| format!("create wav '{}'", out_path.display()))?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(v).context("write wav sample")?;
    }
    writer.finalize().context("finalize wav")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_hound() {
        let dir = std::env::temp_dir().join("flapgen-wav-test");
        let path = dir.join("tone.wav");
        let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0, 2.0];
        write_wav_pcm16(&path, &samples, 8_000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8_000);
        assert_eq!(spec.bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(decoded.len(), samples.len());
        assert_eq!(decoded[0], 0);
        assert_eq!(decoded[3], i16::MAX);
        // Out-of-range input is clamped, not wrapped.
        assert_eq!(decoded[5], i16::MAX);
        std::fs::remove_dir_all(&dir).ok();
    }
}
