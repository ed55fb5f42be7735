//! Full-pipeline scenario: a synthetic frame with one rendered marker
//! must decode to the expected identity, and overlays must stay inside
//! the marker's quadrilateral.

use ar_markers_cli::overlay::CostumeContent;
use ar_markers_cli::pipeline::{analyze_frame, composite_color, composite_costume, run_loop, OverlayMode};
use ar_markers_cli::sink::FrameSink;
use ar_markers_cli::source::StillSource;
use ar_markers_decode::{MarkerDecoder, TemplateBank};
use ar_markers_detect::DetectParams;
use image::{Rgb, RgbImage};

const MARKER_X: u32 = 250;
const MARKER_Y: u32 = 110;
const MARKER_SIDE: u32 = 140; // 7 cells of 20 px

/// Render a marker: a bright square whose outermost cell ring stays
/// bright and whose interior 5x5 cells are dark where the template
/// lists a cell.
fn draw_marker(frame: &mut RgbImage, cells: &[(i32, i32)]) {
    let cell = MARKER_SIDE / 7;
    for y in 0..MARKER_SIDE {
        for x in 0..MARKER_SIDE {
            frame.put_pixel(MARKER_X + x, MARKER_Y + y, Rgb([255, 255, 255]));
        }
    }
    for &(cx, cy) in cells {
        let x0 = MARKER_X + cell * (cx as u32 + 1);
        let y0 = MARKER_Y + cell * (cy as u32 + 1);
        for y in y0..y0 + cell {
            for x in x0..x0 + cell {
                frame.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
    }
}

fn template_cells() -> Vec<(i32, i32)> {
    vec![(0, 0), (1, 1)]
}

fn test_frame() -> RgbImage {
    let mut frame = RgbImage::new(640, 360);
    draw_marker(&mut frame, &template_cells());
    frame
}

fn test_decoder() -> MarkerDecoder {
    MarkerDecoder::new(TemplateBank::from_cells(vec![template_cells()]))
}

fn in_marker_bbox(x: u32, y: u32, margin: u32) -> bool {
    x + margin >= MARKER_X
        && x < MARKER_X + MARKER_SIDE + margin
        && y + margin >= MARKER_Y
        && y < MARKER_Y + MARKER_SIDE + margin
}

#[test]
fn rendered_marker_decodes_to_its_identity() {
    let params = DetectParams::default();
    let analysis = analyze_frame(&test_frame(), &params);
    assert!(!analysis.quads.is_empty(), "no candidates detected");

    let decoder = test_decoder();
    let ids: Vec<_> = analysis
        .quads
        .iter()
        .filter_map(|q| decoder.decode_first(&analysis.binary, q))
        .collect();
    assert!(ids.contains(&0), "identity 0 not decoded: {ids:?}");
    assert!(ids.iter().all(|&id| id == 0), "spurious identities: {ids:?}");
}

#[test]
fn costume_overlay_is_confined_to_the_marker_quad() {
    let params = DetectParams::default();
    let mut analysis = analyze_frame(&test_frame(), &params);
    let before = analysis.frame.clone();

    let decoder = test_decoder();
    let red = RgbImage::from_pixel(100, 100, Rgb([200, 0, 0]));
    let content =
        CostumeContent::from_images(red.clone(), red.clone(), red.clone(), red.clone());

    let ids = composite_costume(
        &mut analysis.frame,
        &analysis.binary,
        &analysis.quads,
        &decoder,
        &content,
    );
    assert!(ids.contains(&0));

    let mut changed = 0u32;
    for (x, y, px) in analysis.frame.enumerate_pixels() {
        if px != before.get_pixel(x, y) {
            changed += 1;
            assert!(
                in_marker_bbox(x, y, 8),
                "pixel outside the marker changed at ({x},{y})"
            );
        }
    }
    assert!(changed > 0, "overlay did not touch the frame");
    // The marker center must now show the pose content.
    let center = analysis
        .frame
        .get_pixel(MARKER_X + MARKER_SIDE / 2, MARKER_Y + MARKER_SIDE / 2);
    assert_eq!(center, &Rgb([200, 0, 0]));
}

#[test]
fn color_overlay_paints_an_identity_swatch() {
    let params = DetectParams::default();
    let mut analysis = analyze_frame(&test_frame(), &params);

    let decoder = test_decoder();
    let ids = composite_color(
        &mut analysis.frame,
        &analysis.binary,
        &analysis.quads,
        &decoder,
    );
    assert!(ids.contains(&0));

    // Identity 0 keys the yellow swatch.
    let center = analysis
        .frame
        .get_pixel(MARKER_X + MARKER_SIDE / 2, MARKER_Y + MARKER_SIDE / 2);
    assert_eq!(center, &Rgb([255, 255, 0]));
}

#[test]
fn run_loop_persists_one_numbered_composite_per_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("frames");

    let mut source = StillSource::from_image(test_frame());
    let mut sink = FrameSink::create(&out).expect("sink");
    let decoder = test_decoder();

    let frames = run_loop(
        &mut source,
        &DetectParams::default(),
        &decoder,
        &OverlayMode::Color,
        &mut sink,
    )
    .expect("run");

    assert_eq!(frames, 1);
    let composite = image::open(out.join("0000.jpg")).expect("composite").to_rgb8();
    assert_eq!(composite.dimensions(), (1280, 720));
}
