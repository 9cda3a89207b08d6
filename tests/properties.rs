//! # Design Properties
//!
//! Laws that must hold for any design: clamping on write, undo/redo as
//! inverses, resolution-independent export and gradient angle periodicity.

use pretty_assertions::assert_eq;
use qrwall::{
    DesignDocument, DesignState, Editor, EditorConfig,
    color::Rgba,
    design::{
        BackgroundFill, BackgroundPatch, BackgroundSpec, DeviceCanvas, DevicePatch,
        GradientSpec, GradientStop, Percent2, QrPatch, QrSpec, from_serializable,
        to_serializable,
    },
    export::{ExportOptions, render_design},
    render::gradient::render_gradient,
};

fn small_state() -> DesignState {
    DesignState::new(
        DeviceCanvas::new(100, 160),
        BackgroundSpec::solid(Rgba::rgb(240, 240, 240)),
        QrSpec::default(),
    )
}

fn sunset() -> GradientSpec {
    GradientSpec::linear(
        0.0,
        vec![
            GradientStop::new(0.0, Rgba::rgb(255, 94, 98)),
            GradientStop::new(0.5, Rgba::rgb(120, 40, 200)),
            GradientStop::new(1.0, Rgba::rgb(255, 195, 113)),
        ],
    )
}

#[test]
fn writes_are_clamped() {
    let mut editor = Editor::new(small_state(), EditorConfig::default());
    editor.update_qr_config(QrPatch::scale(5.0)).unwrap();
    // Largest scale whose 8% border plate still fits the short side
    assert!((editor.state().qr().scale - 1.0 / 1.08).abs() < 1e-5);

    editor.update_qr_config(QrPatch::scale(0.01)).unwrap();
    assert_eq!(editor.state().qr().scale, 0.1);

    editor.update_qr_config(QrPatch::rotation(-190.0)).unwrap();
    assert_eq!(editor.state().qr().rotation_degrees, 170.0);

    editor.update_background(BackgroundPatch::grain(3.0));
    assert_eq!(editor.state().background().grain, 1.0);
}

#[test]
fn position_keeps_qr_inside_canvas() {
    let mut editor = Editor::new(small_state(), EditorConfig::default());
    editor.update_qr_config(QrPatch::scale(0.6)).unwrap();
    editor.update_qr_config(QrPatch::position(0.0, 1.0)).unwrap();

    let qr_box = editor.state().qr_box();
    let reach = editor.state().artifact_half_extent();
    assert!(qr_box.left() >= -1e-3);
    assert!(qr_box.bottom() <= 160.0 + 1e-3);
    assert!(qr_box.center_x - reach >= -1e-3);
    assert!(qr_box.center_y + reach <= 160.0 + 1e-3);

    // Tilting re-clamps against the rotated corners
    editor.update_qr_config(QrPatch::rotation(45.0)).unwrap();
    let qr_box = editor.state().qr_box();
    let reach = editor.state().artifact_half_extent();
    assert!(qr_box.center_x - reach >= -1e-3);
    assert!(qr_box.center_y + reach <= 160.0 + 1e-3);

    // Shrinking the device re-clamps the stored position
    editor.update_device_info(DevicePatch::size(60, 60));
    let qr_box = editor.state().qr_box();
    assert!(qr_box.left() >= -1e-3);
    assert!(qr_box.bottom() <= 60.0 + 1e-3);
}

#[test]
fn undo_redo_are_inverses() {
    let mut editor = Editor::new(small_state(), EditorConfig::default());
    editor.render();
    let initial = editor.state().clone();

    let edits: Vec<Box<dyn Fn(&mut Editor)>> = vec![
        Box::new(|e| {
            e.update_qr_config(QrPatch::scale(0.3)).unwrap();
        }),
        Box::new(|e| {
            e.update_background(BackgroundPatch::fill(BackgroundFill::Gradient {
                gradient: sunset(),
            }));
        }),
        Box::new(|e| {
            e.update_qr_config(QrPatch::position(0.3, 0.7)).unwrap();
        }),
        Box::new(|e| {
            e.update_qr_config(QrPatch::colors(Rgba::rgb(10, 20, 90), Rgba::WHITE))
                .unwrap();
        }),
    ];

    let mut states = vec![initial.clone()];
    for (i, edit) in edits.iter().enumerate() {
        editor.take_snapshot(&format!("edit {}", i));
        edit(&mut editor);
        states.push(editor.state().clone());
    }
    let last = states.last().cloned().unwrap();

    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo());
        assert_eq!(&*editor.state(), expected);
    }
    assert!(!editor.undo());
    assert_eq!(*editor.state(), initial);

    for expected in states.iter().skip(1) {
        assert!(editor.redo());
        assert_eq!(&*editor.state(), expected);
    }
    assert!(!editor.redo());
    assert_eq!(*editor.state(), last);
}

#[test]
fn export_is_resolution_independent() {
    let state = small_state();
    let config = EditorConfig::default();
    let decode = |scale: f32| {
        let out = render_design(&state, None, &config, &ExportOptions::png(scale)).unwrap();
        image::load_from_memory(&out.bytes).unwrap().to_rgba8()
    };
    let one = decode(1.0);
    let three = decode(3.0);
    assert_eq!(one.dimensions(), (100, 160));
    assert_eq!(three.dimensions(), (300, 480));

    // Background and the finder corner land on the same relative spots
    assert_eq!(one.get_pixel(3, 3), three.get_pixel(9, 9));
    assert_eq!(*one.get_pixel(26, 56), Rgba::BLACK.to_pixel());
    assert_eq!(*three.get_pixel(78, 168), Rgba::BLACK.to_pixel());

    let dark_fraction = |img: &image::RgbaImage| {
        let dark = img.pixels().filter(|p| p.0[0] < 128).count();
        dark as f64 / (img.width() * img.height()) as f64
    };
    assert!((dark_fraction(&one) - dark_fraction(&three)).abs() < 0.02);
}

#[test]
fn gradient_angle_has_period_360() {
    let at = |angle: f32| {
        let mut spec = sunset();
        spec.kind = qrwall::design::GradientKind::Linear {
            angle_degrees: angle,
        };
        render_gradient(&spec, 64, 96)
    };
    assert_eq!(at(0.0), at(360.0));
    assert_eq!(at(45.0), at(405.0));
    assert_eq!(at(-90.0), at(270.0));
    assert_ne!(at(0.0), at(90.0));
}

#[test]
fn radial_gradient_is_centered() {
    let spec = GradientSpec::radial(
        Percent2::CENTER,
        vec![
            GradientStop::new(0.0, Rgba::BLACK),
            GradientStop::new(1.0, Rgba::WHITE),
        ],
    );
    let img = render_gradient(&spec, 90, 90);
    // Symmetric about the center
    assert_eq!(img.get_pixel(10, 45), img.get_pixel(79, 45));
    assert!(img.get_pixel(45, 45).0[0] < img.get_pixel(0, 0).0[0]);
}

#[test]
fn document_round_trip_preserves_design() {
    let mut state = small_state();
    state.update_qr(QrPatch::payload("https://example.com/wallpaper"));
    state.update_background(BackgroundPatch::grain(0.4));

    let json = to_serializable(&state).to_json_pretty().unwrap();
    let restored = from_serializable(DesignDocument::from_json(&json).unwrap()).unwrap();
    assert_eq!(restored, state);
}
