use flapgen::anim::flap::{BoardParams, FlapBoard};
use flapgen::foundation::core::{Canvas, Fps, FrameIndex};
use flapgen::render::fonts;
use flapgen::render::frame::{BoardRenderer, RenderStyle};
use flapgen::render::sink::{FrameSink, InMemorySink, PngDirSink};

fn small_params() -> BoardParams {
    BoardParams {
        canvas: Canvas {
            width: 200,
            height: 320,
        },
        fps: Fps { num: 30, den: 1 },
        duration_secs: 0.2,
        rows: vec!["OK".to_string()],
        row_center_offsets: vec![-40.0],
        ..BoardParams::default()
    }
}

fn renderer() -> Option<BoardRenderer> {
    // Hosts without any installed fonts cannot rasterize glyphs; there is
    // nothing meaningful to assert there.
    let font_bytes = fonts::resolve_font_bytes().ok()?;
    let board = FlapBoard::new(small_params()).unwrap();
    BoardRenderer::with_font_bytes(board, RenderStyle::default(), font_bytes).ok()
}

#[test]
fn sequence_has_exact_frame_count_and_dimensions() {
    let Some(mut renderer) = renderer() else { return };
    let mut sink = InMemorySink::new();
    renderer.render_all(&mut sink).unwrap();

    assert_eq!(sink.frames().len(), 6); // 30 fps * 0.2 s
    for (idx, frame) in sink.frames() {
        assert!(idx.0 < 6);
        assert_eq!(frame.width, 200);
        assert_eq!(frame.height, 320);
        assert_eq!(frame.data.len(), 200 * 320 * 4);
    }
}

#[test]
fn frames_are_byte_identical_across_runs() {
    let Some(mut a) = renderer() else { return };
    let Some(mut b) = renderer() else { return };
    for i in 0..6 {
        let fa = a.render_frame(FrameIndex(i)).unwrap();
        let fb = b.render_frame(FrameIndex(i)).unwrap();
        assert_eq!(fa, fb, "frame {i}");
    }
}

#[test]
fn frame_shows_background_and_cards() {
    let Some(mut renderer) = renderer() else { return };
    let frame = renderer.render_frame(FrameIndex(0)).unwrap();

    // Top-left corner is untouched background.
    assert_eq!(&frame.data[0..4], &[17, 17, 17, 255]);

    // The card area differs from the background somewhere.
    let bg = [17u8, 17, 17, 255];
    assert!(frame.data.chunks_exact(4).any(|px| px != bg));
}

#[test]
fn png_sink_writes_numbered_files() {
    let Some(mut renderer) = renderer() else { return };
    let dir = std::env::temp_dir().join("flapgen-render-test");
    std::fs::remove_dir_all(&dir).ok();

    let mut sink = PngDirSink::new(&dir, "flutter");
    renderer.render_all(&mut sink).unwrap();

    for i in 0..6 {
        let path = dir.join(format!("flutter_{i:04}.png"));
        assert!(path.is_file(), "missing {}", path.display());
        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 200);
        assert_eq!(img.height(), 320);
    }
    assert!(!dir.join("flutter_0006.png").exists());

    std::fs::remove_dir_all(&dir).ok();
}
