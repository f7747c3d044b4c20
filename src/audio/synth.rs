//! Procedural instrument generators.
//!
//! Each generator is a pure function of its parameters (plus a caller-supplied
//! PCG stream for noise) mapping to a short sample buffer in [-1, 1]. Events
//! are immutable once generated; the track assembler overlays them into the
//! master buffer.

use rand::Rng;
use rand_pcg::Pcg32;

use std::f32::consts::TAU;

/// Sample count for a duration at `sample_rate`.
pub fn samples_for(sample_rate: u32, duration_secs: f64) -> usize {
    (f64::from(sample_rate) * duration_secs) as usize
}

/// Sine tone with an optional square-root fade-out envelope.
pub fn sine_tone(sample_rate: u32, freq: f32, duration_secs: f64, volume: f32, fade_out: bool) -> Vec<f32> {
    let n = samples_for(sample_rate, duration_secs);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f32 / sample_rate as f32;
        let env = if fade_out {
            (1.0 - (i as f32 / n as f32).sqrt()).max(0.0)
        } else {
            1.0
        };
        out.push(volume * env * (TAU * freq * t).sin());
    }
    out
}

/// White-noise burst with an optional linear decay envelope.
pub fn noise_burst(
    sample_rate: u32,
    duration_secs: f64,
    volume: f32,
    decay: bool,
    rng: &mut Pcg32,
) -> Vec<f32> {
    let n = samples_for(sample_rate, duration_secs);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let env = if decay {
            (1.0 - i as f32 / n as f32).max(0.0)
        } else {
            1.0
        };
        out.push(volume * env * rng.random_range(-1.0f32..1.0));
    }
    out
}

/// 808-style kick drum: linear pitch sweep from 150 Hz down to 40 Hz.
pub fn kick(sample_rate: u32, volume: f32) -> Vec<f32> {
    let n = samples_for(sample_rate, 0.25);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f32 / sample_rate as f32;
        let progress = i as f32 / n as f32;
        let freq = 150.0 * (1.0 - progress) + 40.0 * progress;
        let env = (1.0 - progress.powf(0.6)).max(0.0);
        out.push(volume * env * (TAU * freq * t).sin());
    }
    out
}

/// Snare: 200 Hz tonal body blended with a decaying noise burst.
pub fn snare(sample_rate: u32, volume: f32, rng: &mut Pcg32) -> Vec<f32> {
    let dur = 0.15;
    let tone = sine_tone(sample_rate, 200.0, dur, volume * 0.6, true);
    let noise = noise_burst(sample_rate, dur, volume * 0.7, true, rng);
    mix(&[tone, noise])
}

/// Hi-hat: a short noise burst, longer when open.
pub fn hihat(sample_rate: u32, volume: f32, open: bool, rng: &mut Pcg32) -> Vec<f32> {
    let dur = if open { 0.2 } else { 0.08 };
    noise_burst(sample_rate, dur, volume, true, rng)
}

/// Split-flap mechanical click: sharp attack with stacked partials for a
/// metallic quality.
pub fn flap_click(sample_rate: u32, volume: f32, rng: &mut Pcg32) -> Vec<f32> {
    let n = samples_for(sample_rate, 0.06);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f32 / sample_rate as f32;
        let progress = i as f32 / n as f32;
        let env = (1.0 - progress.powf(0.3)).max(0.0);
        let val = 0.4 * (TAU * 2500.0 * t).sin()
            + 0.3 * (TAU * 4000.0 * t).sin()
            + 0.2 * rng.random_range(-1.0f32..1.0)
            + 0.1 * (TAU * 800.0 * t).sin();
        out.push(volume * env * val);
    }
    out
}

/// Sub bass note with tanh soft clipping and a linear release over the last
/// 30% of the note.
pub fn bass_note(sample_rate: u32, freq: f32, duration_secs: f64, volume: f32) -> Vec<f32> {
    let n = samples_for(sample_rate, duration_secs);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f32 / sample_rate as f32;
        let progress = i as f32 / n as f32;
        let env = if progress > 0.7 {
            (1.0 - (progress - 0.7) / 0.3).max(0.0)
        } else {
            1.0
        };
        let val = ((TAU * freq * t).sin() * 1.5).tanh();
        out.push(volume * env * val);
    }
    out
}

/// Sample-wise sum of event buffers, clamped to [-1, 1]. The result has the
/// length of the longest input.
pub fn mix(events: &[Vec<f32>]) -> Vec<f32> {
    let len = events.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = vec![0.0f32; len];
    for ev in events {
        for (dst, s) in out.iter_mut().zip(ev.iter()) {
            *dst += s;
        }
    }
    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const SR: u32 = 44_100;

    #[test]
    fn event_lengths_match_durations() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(sine_tone(SR, 440.0, 0.2, 0.5, true).len(), samples_for(SR, 0.2));
        assert_eq!(kick(SR, 0.7).len(), samples_for(SR, 0.25));
        assert_eq!(flap_click(SR, 0.6, &mut rng).len(), samples_for(SR, 0.06));
        assert_eq!(hihat(SR, 0.2, false, &mut rng).len(), samples_for(SR, 0.08));
        assert_eq!(hihat(SR, 0.2, true, &mut rng).len(), samples_for(SR, 0.2));
    }

    #[test]
    fn generators_stay_in_unit_range() {
        let mut rng = Pcg32::seed_from_u64(2);
        for buf in [
            kick(SR, 1.0),
            snare(SR, 1.0, &mut rng),
            flap_click(SR, 1.0, &mut rng),
            bass_note(SR, 55.0, 0.5, 1.0),
        ] {
            assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
        }
    }

    #[test]
    fn fade_out_envelope_ends_near_silence() {
        let tone = sine_tone(SR, 440.0, 0.2, 0.5, true);
        let tail = &tone[tone.len() - 100..];
        assert!(tail.iter().all(|s| s.abs() < 0.05));
    }

    #[test]
    fn kick_sweeps_downward() {
        // The zero-crossing interval should widen as the pitch falls.
        let buf = kick(SR, 0.7);
        let crossings: Vec<usize> = buf
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] <= 0.0 && w[1] > 0.0)
            .map(|(i, _)| i)
            .collect();
        assert!(crossings.len() >= 3);
        let first = crossings[1] - crossings[0];
        let last = crossings[crossings.len() - 1] - crossings[crossings.len() - 2];
        assert!(last > first);
    }

    #[test]
    fn mix_sums_and_clamps() {
        let a = vec![0.8f32; 4];
        let b = vec![0.8f32; 2];
        let out = mix(&[a, b]);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 1.0).abs() < 1e-6);
        assert!((out[3] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn noise_is_reproducible_from_seed() {
        let mut r1 = Pcg32::seed_from_u64(7);
        let mut r2 = Pcg32::seed_from_u64(7);
        assert_eq!(
            noise_burst(SR, 0.05, 0.3, true, &mut r1),
            noise_burst(SR, 0.05, 0.3, true, &mut r2)
        );
    }
}
