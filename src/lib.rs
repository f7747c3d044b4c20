//! Flapgen generates the two promo assets for the split-flap demo video:
//!
//! - a procedural beat track with split-flap click accents, written as mono
//!   16-bit PCM WAV ([`audio`]);
//! - a split-flap "flutter" animation where randomized glyphs settle into
//!   target strings, rendered on the CPU and written as a PNG frame
//!   sequence ([`render`]).
//!
//! Both pipelines are single-pass, offline, and deterministic: every source of
//! randomness is a seeded PCG stream, so re-running with the same parameters
//! produces byte-identical output.
#![forbid(unsafe_code)]

pub mod anim;
pub mod audio;
pub mod foundation;
pub mod render;

pub use anim::ease::Ease;
pub use anim::flap::{BoardParams, FlapBoard, GlyphPhase};
pub use audio::track::{TrackBuilder, TrackParams};
pub use foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
pub use foundation::error::{FlapgenError, FlapgenResult};
pub use render::frame::{BoardRenderer, FrameRgba, RenderStyle};
pub use render::sink::{FrameSink, InMemorySink, PngDirSink};
