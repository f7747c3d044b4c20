//! Per-frame split-flap board state.
//!
//! Every frame is recomputed independently from (frame index, card index):
//! the PCG stream is reseeded deterministically at each sampling site, so the
//! animation is reproducible and frames can be generated in any order.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::anim::ease::Ease;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{FlapgenError, FlapgenResult};

/// Glyphs a card cycles through while flipping.
pub const FLAP_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%&";

/// Letter ring used for near-target flicker.
const LETTER_RING: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Eased progress below which a card flips at full speed.
const SLOWING_START: f64 = 0.70;
/// Eased progress at which flicker toward the target begins.
const FLICKER_START: f64 = 0.85;
/// Eased progress past which a card shows its target permanently.
const SETTLE_THRESHOLD: f64 = 0.95;

/// Board geometry and animation parameters.
///
/// [`BoardParams::default`] reproduces the shipped `DOWNLOAD` / `NOW` end
/// card flutter.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardParams {
    /// Output canvas in pixels.
    pub canvas: Canvas,
    /// Frame rate.
    pub fps: Fps,
    /// Animation length in seconds.
    pub duration_secs: f64,
    /// Target strings, one per board row.
    pub rows: Vec<String>,
    /// Vertical row centers relative to canvas center, one per row.
    pub row_center_offsets: Vec<f64>,
    /// Card width in pixels.
    pub card_w: f64,
    /// Card height in pixels.
    pub card_h: f64,
    /// Horizontal gap between cards.
    pub card_gap: f64,
    /// Card corner radius.
    pub card_radius: f64,
    /// Seed for settle offsets and per-frame glyph sampling.
    pub seed: u64,
}

impl Default for BoardParams {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1284,
                height: 2778,
            },
            fps: Fps { num: 30, den: 1 },
            duration_secs: 4.0,
            rows: vec!["DOWNLOAD".to_string(), "NOW".to_string()],
            row_center_offsets: vec![-80.0, 60.0],
            card_w: 72.0,
            card_h: 100.0,
            card_gap: 10.0,
            card_radius: 6.0,
            seed: 42,
        }
    }
}

impl BoardParams {
    /// Validate parameter ranges and row/offset agreement.
    pub fn validate(&self) -> FlapgenResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(FlapgenError::validation("canvas dimensions must be > 0"));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(FlapgenError::validation("fps components must be > 0"));
        }
        if !(self.duration_secs > 0.0) {
            return Err(FlapgenError::validation("duration_secs must be > 0"));
        }
        if self.total_frames() == 0 {
            return Err(FlapgenError::validation(
                "fps and duration_secs must yield at least one frame",
            ));
        }
        if self.rows.is_empty() || self.rows.iter().all(String::is_empty) {
            return Err(FlapgenError::validation("board needs at least one target glyph"));
        }
        if self.row_center_offsets.len() != self.rows.len() {
            return Err(FlapgenError::validation(
                "row_center_offsets must have one entry per row",
            ));
        }
        if !(self.card_w > 0.0 && self.card_h > 0.0) {
            return Err(FlapgenError::validation("card dimensions must be > 0"));
        }
        Ok(())
    }

    /// Exact frame count, `fps * duration`.
    pub fn total_frames(&self) -> u64 {
        self.fps.secs_to_frames_floor(self.duration_secs)
    }
}

/// A positional card placeholder: where it sits and what it settles to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Card {
    /// Board-wide card index.
    pub index: usize,
    /// Card center x in canvas pixels.
    pub cx: f64,
    /// Card center y in canvas pixels.
    pub cy: f64,
    /// Glyph the card settles on.
    pub target: char,
}

/// Animation phase of one card at one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphPhase {
    /// Full-speed flipping through random glyphs.
    Spinning,
    /// Flipping with a widening hold interval.
    Slowing,
    /// Flickering between the target and its alphabet neighbors.
    Flicker,
    /// Locked on the target glyph.
    Settled,
}

/// Resolved display state of one card at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardState {
    /// Glyph to display.
    pub glyph: char,
    /// Animation phase.
    pub phase: GlyphPhase,
    /// Eased per-card progress in [0, 1].
    pub eased: f64,
}

/// Split-flap board with laid-out cards and per-card settle offsets.
pub struct FlapBoard {
    params: BoardParams,
    cards: Vec<Card>,
    settle_offsets: Vec<f64>,
    alphabet: Vec<char>,
    letters: Vec<char>,
}

impl FlapBoard {
    /// Lay out the board and draw the per-card settle offsets.
    pub fn new(params: BoardParams) -> FlapgenResult<Self> {
        params.validate()?;

        let mut cards = Vec::new();
        let w = f64::from(params.canvas.width);
        let cy_base = f64::from(params.canvas.height) / 2.0;
        let pitch = params.card_w + params.card_gap;
        for (row, text) in params.rows.iter().enumerate() {
            let chars: Vec<char> = text.chars().collect();
            let row_w = chars.len() as f64 * pitch - params.card_gap;
            let x_start = (w - row_w) / 2.0 + params.card_w / 2.0;
            let cy = cy_base + params.row_center_offsets[row];
            for (i, &target) in chars.iter().enumerate() {
                cards.push(Card {
                    index: cards.len(),
                    cx: x_start + i as f64 * pitch,
                    cy,
                    target,
                });
            }
        }

        // Each card locks in at a slightly different time; the final cards
        // settle last for dramatic effect.
        let mut rng = Pcg32::seed_from_u64(params.seed);
        let mut settle_offsets: Vec<f64> = (0..cards.len())
            .map(|_| rng.random_range(-0.12..0.18))
            .collect();
        let n = settle_offsets.len();
        if n >= 1 {
            settle_offsets[n - 1] += 0.08;
        }
        if n >= 2 {
            settle_offsets[n - 2] += 0.05;
        }

        Ok(Self {
            params,
            cards,
            settle_offsets,
            alphabet: FLAP_ALPHABET.chars().collect(),
            letters: LETTER_RING.chars().collect(),
        })
    }

    /// Board parameters.
    pub fn params(&self) -> &BoardParams {
        &self.params
    }

    /// Cards in layout order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Global progress fraction for a frame, in [0, 1).
    pub fn progress(&self, frame: FrameIndex) -> f64 {
        frame.0 as f64 / self.params.total_frames() as f64
    }

    /// Eased per-card progress with the card's settle offset applied.
    pub fn eased_progress(&self, frame: FrameIndex, card: usize) -> f64 {
        let t = self.progress(frame);
        let card_t = (t + self.settle_offsets[card] * 0.5).clamp(0.0, 1.0);
        Ease::OutExpo.apply(card_t)
    }

    /// Resolve the glyph displayed by `card` at `frame`.
    ///
    /// Deterministic in (frame, card): the PCG stream is reseeded from both
    /// indices at every sampling site.
    pub fn card_state(&self, frame: FrameIndex, card: usize) -> CardState {
        let eased = self.eased_progress(frame, card);
        let target = self.cards[card].target;
        let idx = card as u64;

        if eased < SLOWING_START {
            // Hyper speed: a fresh glyph every frame.
            let seed = frame.0 * 100 + idx * 7 + (eased * 50.0) as u64;
            let glyph = self.random_glyph(seed);
            return CardState {
                glyph,
                phase: GlyphPhase::Spinning,
                eased,
            };
        }
        if eased < FLICKER_START {
            // Slowing down: hold each glyph for a widening frame interval.
            let skip = (3.0 + (eased - SLOWING_START) * 40.0) as u64;
            let seed = (frame.0 / skip.max(1)) * 100 + idx * 7;
            let glyph = self.random_glyph(seed);
            return CardState {
                glyph,
                phase: GlyphPhase::Slowing,
                eased,
            };
        }
        if eased < SETTLE_THRESHOLD {
            // Almost there: flicker between the target and nearby letters,
            // with an increasing chance of showing the target.
            let mut rng = self.rng_for(frame.0 * 100 + idx * 7);
            let glyph = if rng.random::<f64>() < (eased - FLICKER_START) * 10.0 {
                target
            } else {
                self.neighbor_letter(target, &mut rng)
            };
            return CardState {
                glyph,
                phase: GlyphPhase::Flicker,
                eased,
            };
        }

        CardState {
            glyph: target,
            phase: GlyphPhase::Settled,
            eased,
        }
    }

    /// Vertical glyph jitter in pixels while a card is flipping fast.
    pub fn jitter_px(&self, frame: FrameIndex, card: usize) -> i32 {
        let state = self.card_state(frame, card);
        let flipping = matches!(
            state.phase,
            GlyphPhase::Spinning | GlyphPhase::Slowing | GlyphPhase::Flicker
        );
        if !flipping || state.eased >= 0.8 {
            return 0;
        }
        let mut rng = self.rng_for(frame.0 * 131 + card as u64 * 31 + 1);
        rng.random_range(-2..=2)
    }

    fn rng_for(&self, site: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.params.seed.wrapping_mul(0x9E37_79B9).wrapping_add(site))
    }

    fn random_glyph(&self, seed: u64) -> char {
        let mut rng = self.rng_for(seed);
        self.alphabet[rng.random_range(0..self.alphabet.len())]
    }

    /// A letter adjacent to `target` in the A-Z ring; non-letters have no
    /// neighbors and resolve to the target directly.
    fn neighbor_letter(&self, target: char, rng: &mut Pcg32) -> char {
        let Some(pos) = self.letters.iter().position(|&c| c == target) else {
            return target;
        };
        let step: i64 = if rng.random_bool(0.5) { 1 } else { -1 };
        let n = self.letters.len() as i64;
        self.letters[((pos as i64 + step).rem_euclid(n)) as usize]
    }
}
