//! Frame sinks consuming rendered frames in timeline order.

use std::path::PathBuf;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::FlapgenResult;
use crate::render::frame::FrameRgba;

/// Configuration provided to a [`FrameSink`] at the start of a render.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output canvas dimensions.
    pub canvas: Canvas,
    /// Total frame count the render will push.
    pub total_frames: u64,
}

/// Sink contract for consuming rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing
/// `FrameIndex` order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> FlapgenResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> FlapgenResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> FlapgenResult<()>;
}

/// Writes frames as `<prefix>_NNNN.png` into one output directory.
#[derive(Debug, Clone)]
pub struct PngDirSink {
    out_dir: PathBuf,
    prefix: String,
}

impl PngDirSink {
    /// Create a sink writing into `out_dir` with the given file prefix.
    pub fn new(out_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            prefix: prefix.into(),
        }
    }

    fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.out_dir.join(format!("{}_{:04}.png", self.prefix, idx.0))
    }
}

impl FrameSink for PngDirSink {
    fn begin(&mut self, _cfg: SinkConfig) -> FlapgenResult<()> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("create frame output dir '{}'", self.out_dir.display()))?;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> FlapgenResult<()> {
        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    fn end(&mut self) -> FlapgenResult<()> {
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgba)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames in timeline order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgba)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FlapgenResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> FlapgenResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FlapgenResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_sink_numbers_frames() {
        let sink = PngDirSink::new("/tmp/frames", "flutter");
        assert_eq!(
            sink.frame_path(FrameIndex(7)),
            PathBuf::from("/tmp/frames/flutter_0007.png")
        );
        assert_eq!(
            sink.frame_path(FrameIndex(1234)),
            PathBuf::from("/tmp/frames/flutter_1234.png")
        );
    }

    #[test]
    fn in_memory_sink_collects_in_order() {
        let mut sink = InMemorySink::new();
        sink.begin(SinkConfig {
            canvas: Canvas { width: 2, height: 2 },
            total_frames: 2,
        })
        .unwrap();
        let frame = FrameRgba {
            width: 2,
            height: 2,
            data: vec![0u8; 16],
        };
        sink.push_frame(FrameIndex(0), &frame).unwrap();
        sink.push_frame(FrameIndex(1), &frame).unwrap();
        sink.end().unwrap();
        assert_eq!(sink.frames().len(), 2);
        assert_eq!(sink.config().unwrap().total_frames, 2);
        assert!(sink.frames().windows(2).all(|w| w[0].0 < w[1].0));
    }
}
