//! Beat-track assembly.
//!
//! Placement is table-driven scheduling data, not an algorithm: fixed beat
//! subdivisions for the drum kit, a per-bar bassline, a melody figure on
//! alternating bars, flap-click cascades at fixed timestamps, and start/end
//! accents. Events are overlaid additively into one master buffer, then the
//! buffer is normalized to a peak ceiling.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::synth;
use crate::foundation::error::{FlapgenError, FlapgenResult};

/// One melody hit at a beat offset inside its bar.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct MelodyNote {
    /// Offset within the bar, in beats.
    pub beat_offset: f64,
    /// Frequency in Hz.
    pub freq: f32,
}

/// One chime tone at an absolute timestamp.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ChimeNote {
    /// Absolute placement time in seconds.
    pub at_secs: f64,
    /// Frequency in Hz.
    pub freq: f32,
    /// Tone length in seconds.
    pub duration_secs: f64,
}

/// Parameters for the promo beat track.
///
/// [`TrackParams::default`] reproduces the shipped 15-second promo audio.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Track length in seconds.
    pub duration_secs: f64,
    /// Tempo in beats per minute.
    pub bpm: f64,
    /// Peak absolute sample value after normalization.
    pub peak_ceiling: f32,
    /// Seed for all noise and cascade-count draws.
    pub seed: u64,
    /// Bassline note cycle, one note per bar.
    pub bass_line: Vec<f32>,
    /// Melody figure, played on even bars.
    pub melody: Vec<MelodyNote>,
    /// Flap-click cascade start times, roughly one per scene change.
    pub click_times: Vec<f64>,
    /// Opening chime tones.
    pub chime: Vec<ChimeNote>,
    /// Final impact kick time in seconds.
    pub impact_at_secs: f64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            duration_secs: 15.0,
            bpm: 90.0,
            peak_ceiling: 0.85,
            seed: 0x70C4,
            // A1, A1, C2, D2
            bass_line: vec![55.0, 55.0, 65.41, 73.42],
            melody: vec![
                MelodyNote { beat_offset: 0.0, freq: 440.0 },
                MelodyNote { beat_offset: 1.0, freq: 523.25 },
                MelodyNote { beat_offset: 2.0, freq: 392.0 },
                MelodyNote { beat_offset: 3.0, freq: 349.23 },
                MelodyNote { beat_offset: 3.5, freq: 330.0 },
            ],
            click_times: vec![0.3, 1.5, 3.0, 4.5, 6.0, 7.5, 9.0, 10.5, 12.0, 13.5],
            chime: vec![
                ChimeNote { at_secs: 0.0, freq: 784.0, duration_secs: 0.4 },
                ChimeNote { at_secs: 0.3, freq: 1047.0, duration_secs: 0.5 },
            ],
            impact_at_secs: 14.0,
        }
    }
}

impl TrackParams {
    /// Validate parameter ranges.
    pub fn validate(&self) -> FlapgenResult<()> {
        if self.sample_rate == 0 {
            return Err(FlapgenError::validation("sample_rate must be > 0"));
        }
        if !(self.duration_secs > 0.0) {
            return Err(FlapgenError::validation("duration_secs must be > 0"));
        }
        if !(self.bpm > 0.0) {
            return Err(FlapgenError::validation("bpm must be > 0"));
        }
        if !(self.peak_ceiling > 0.0 && self.peak_ceiling <= 1.0) {
            return Err(FlapgenError::validation("peak_ceiling must be in (0, 1]"));
        }
        Ok(())
    }

    /// Seconds per beat at the configured tempo.
    pub fn beat_secs(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Exact master buffer length in samples.
    pub fn total_samples(&self) -> usize {
        (f64::from(self.sample_rate) * self.duration_secs) as usize
    }
}

/// Assembles the master waveform buffer from generated sound events.
pub struct TrackBuilder {
    params: TrackParams,
    buffer: Vec<f32>,
    rng: Pcg32,
}

impl TrackBuilder {
    /// Create a builder with a silent master buffer.
    pub fn new(params: TrackParams) -> FlapgenResult<Self> {
        params.validate()?;
        let buffer = vec![0.0f32; params.total_samples()];
        let rng = Pcg32::seed_from_u64(params.seed);
        Ok(Self { params, buffer, rng })
    }

    /// Assemble the full track and return the normalized buffer.
    #[tracing::instrument(skip(params))]
    pub fn build(params: TrackParams) -> FlapgenResult<Vec<f32>> {
        let mut b = Self::new(params)?;
        b.place_drums();
        b.place_bass();
        b.place_melody();
        b.place_click_cascades();
        b.place_chime();
        b.place_ending_impact();
        b.normalize();
        tracing::debug!(samples = b.buffer.len(), "assembled track");
        Ok(b.buffer)
    }

    /// Additively overlay `event` starting at `offset` samples, dropping any
    /// samples that fall outside the master buffer.
    fn place_at(&mut self, offset: i64, event: &[f32]) {
        for (i, &s) in event.iter().enumerate() {
            let idx = offset + i as i64;
            if idx >= 0 && (idx as usize) < self.buffer.len() {
                self.buffer[idx as usize] += s;
            }
        }
    }

    fn sample_at(&self, secs: f64) -> i64 {
        (secs * f64::from(self.params.sample_rate)) as i64
    }

    fn total_beats(&self) -> u64 {
        (self.params.duration_secs / self.params.beat_secs()) as u64
    }

    /// Kick on bar beats 0 and 2, snare on 1 and 3, hats on every eighth note
    /// with an open hat on the off-beat of bar beat 1.
    fn place_drums(&mut self) {
        let sr = self.params.sample_rate;
        let beat_secs = self.params.beat_secs();
        for beat in 0..self.total_beats() {
            let beat_pos = self.sample_at(beat as f64 * beat_secs);
            let bar_beat = beat % 4;

            if bar_beat == 0 || bar_beat == 2 {
                let ev = synth::kick(sr, 0.7);
                self.place_at(beat_pos, &ev);
            }
            if bar_beat == 1 || bar_beat == 3 {
                let ev = synth::snare(sr, 0.45, &mut self.rng);
                self.place_at(beat_pos, &ev);
            }

            for sub in 0..2u64 {
                let hat_pos = beat_pos + self.sample_at(sub as f64 * beat_secs / 2.0);
                let open = bar_beat == 1 && sub == 1;
                let ev = synth::hihat(sr, 0.2, open, &mut self.rng);
                self.place_at(hat_pos, &ev);
            }
        }
    }

    /// One bass note per bar, cycling through the note table, held for 1.8
    /// beats.
    fn place_bass(&mut self) {
        if self.params.bass_line.is_empty() {
            return;
        }
        let sr = self.params.sample_rate;
        let beat_secs = self.params.beat_secs();
        for beat in 0..self.total_beats() {
            if beat % 4 != 0 {
                continue;
            }
            let note = self.params.bass_line[(beat / 4) as usize % self.params.bass_line.len()];
            let ev = synth::bass_note(sr, note, beat_secs * 1.8, 0.35);
            self.place_at(self.sample_at(beat as f64 * beat_secs), &ev);
        }
    }

    /// Melody figure on even bars only, for groove.
    fn place_melody(&mut self) {
        let sr = self.params.sample_rate;
        let beat_secs = self.params.beat_secs();
        let bars = self.total_beats() / 4;
        for bar in 0..bars {
            if bar % 2 != 0 {
                continue;
            }
            let bar_start = bar as f64 * 4.0 * beat_secs;
            let melody = self.params.melody.clone();
            for note in &melody {
                let pos = self.sample_at(bar_start + note.beat_offset * beat_secs);
                let ev = synth::sine_tone(sr, note.freq, 0.2, 0.15, true);
                self.place_at(pos, &ev);
            }
        }
    }

    /// Rapid cascades of 4-6 clicks, 40 ms apart, with slightly decaying
    /// volume, timed to the video's scene changes.
    fn place_click_cascades(&mut self) {
        let sr = self.params.sample_rate;
        for ct in self.params.click_times.clone() {
            let num_clicks = self.rng.random_range(4..=6);
            for c in 0..num_clicks {
                let pos = self.sample_at(ct + c as f64 * 0.04);
                let vol = 0.5 * (1.0 - c as f32 * 0.08);
                let ev = synth::flap_click(sr, vol, &mut self.rng);
                self.place_at(pos, &ev);
            }
        }
    }

    /// Airline-style two-note chime at the very start.
    fn place_chime(&mut self) {
        let sr = self.params.sample_rate;
        for note in self.params.chime.clone() {
            let ev = synth::sine_tone(sr, note.freq, note.duration_secs, 0.25, true);
            self.place_at(self.sample_at(note.at_secs), &ev);
        }
    }

    /// Final impact kick with a cascade of decaying echo kicks.
    fn place_ending_impact(&mut self) {
        let sr = self.params.sample_rate;
        let at = self.params.impact_at_secs;
        let ev = synth::kick(sr, 0.9);
        self.place_at(self.sample_at(at), &ev);
        for delay in 0..5 {
            let pos = self.sample_at(at + 0.05 + delay as f64 * 0.08);
            let ev = synth::kick(sr, 0.4 * (1.0 - delay as f32 * 0.18));
            self.place_at(pos, &ev);
        }
    }

    /// Rescale so the peak absolute sample equals the configured ceiling.
    /// A fully silent buffer is left untouched.
    fn normalize(&mut self) {
        let peak = self.buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        if peak > 0.0 {
            let scale = self.params.peak_ceiling / peak;
            for s in &mut self.buffer {
                *s *= scale;
            }
        }
    }
}
