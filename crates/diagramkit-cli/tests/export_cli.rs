use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use diagramkit_cli::{CliError, ExportArgs, Format, run_export};
use diagramkit_core::elements::{
    Element, ElementKind, LineElement, ShapeElement, ShapeVariant, TextElement,
};
use diagramkit_core::{ElementId, ElementStore};

/// Writes a small board (two shapes and a label) and returns the ids.
fn write_board(dir: &Path) -> (PathBuf, ElementId, ElementId) {
    let mut store = ElementStore::new();
    let a = store.add_element(Element::new(
        ElementKind::Shape(ShapeElement::new(ShapeVariant::Rectangle, 100.0, 60.0)),
        0.0,
        0.0,
    ));
    let b = store.add_element(Element::new(
        ElementKind::Shape(ShapeElement::new(ShapeVariant::Diamond, 80.0, 80.0)),
        300.0,
        200.0,
    ));
    store.add_element(Element::new(
        ElementKind::Line(LineElement::new(300.0, 240.0)),
        100.0,
        30.0,
    ));
    store.add_element(Element::new(
        ElementKind::Text(TextElement::new(120.0, 30.0, "Checkout flow")),
        0.0,
        -60.0,
    ));
    let path = dir.join("board.json");
    fs::write(&path, store.export_to_json().unwrap()).unwrap();
    (path, a, b)
}

fn args(input: PathBuf, format: Format) -> ExportArgs {
    ExportArgs {
        input,
        format,
        selection_only: Vec::new(),
        output: None,
        config: None,
    }
}

#[test]
fn test_png_export_writes_next_to_input() {
    let dir = tempdir().unwrap();
    let (input, _, _) = write_board(dir.path());

    let output = run_export(&args(input, Format::Png)).unwrap();
    assert_eq!(output, dir.path().join("board.png"));
    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_svg_export_has_shapes_and_markers() {
    let dir = tempdir().unwrap();
    let (input, _, _) = write_board(dir.path());
    let out = dir.path().join("nested.svg");

    let mut export = args(input, Format::Svg);
    export.output = Some(out.clone());
    run_export(&export).unwrap();

    let svg = fs::read_to_string(out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Checkout flow"));
    assert_eq!(svg.matches("<marker").count(), 1);
    assert!(svg.contains("marker-end="));
}

#[test]
fn test_json_export_round_trips() {
    let dir = tempdir().unwrap();
    let (input, a, b) = write_board(dir.path());
    let mut export = args(input, Format::Json);
    export.output = Some(dir.path().join("normalized.json"));

    let output = run_export(&export).unwrap();
    let mut store = ElementStore::new();
    store
        .import_from_json(&fs::read_to_string(output).unwrap())
        .unwrap();
    assert_eq!(store.len(), 4);
    assert!(store.contains(a));
    assert!(store.contains(b));
}

#[test]
fn test_selection_only_shrinks_png() {
    let dir = tempdir().unwrap();
    let (input, a, _) = write_board(dir.path());

    let full = run_export(&args(input.clone(), Format::Png)).unwrap();
    let (full_w, full_h) = image::image_dimensions(&full).unwrap();

    let mut export = args(input, Format::Png);
    export.selection_only = vec![a];
    export.output = Some(dir.path().join("selection.png"));
    let partial = run_export(&export).unwrap();
    let (w, h) = image::image_dimensions(&partial).unwrap();

    // 100x60 shape, 20px padding each side, 2x scale.
    assert_eq!((w, h), (280, 200));
    assert!(w < full_w && h < full_h);
}

#[test]
fn test_unknown_selection_exports_nothing() {
    let dir = tempdir().unwrap();
    let (input, _, _) = write_board(dir.path());
    let mut export = args(input, Format::Svg);
    export.selection_only = vec![uuid::Uuid::new_v4()];

    let err = run_export(&export).unwrap_err();
    assert!(matches!(
        err,
        CliError::Export(diagramkit_render::ExportError::Empty)
    ));
}

#[test]
fn test_config_scale_applies() {
    let dir = tempdir().unwrap();
    let (input, a, _) = write_board(dir.path());
    let config = dir.path().join("diagramkit.toml");
    fs::write(&config, "[renderer]\nexport_scale = 1.0\nexport_padding = 0.0\n").unwrap();

    let mut export = args(input, Format::Png);
    export.selection_only = vec![a];
    export.config = Some(config);
    let output = run_export(&export).unwrap();
    assert_eq!(image::image_dimensions(&output).unwrap(), (100, 60));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempdir().unwrap();
    let err = run_export(&args(dir.path().join("absent.json"), Format::Png)).unwrap_err();
    assert!(matches!(err, CliError::Io(_)));
}

#[test]
fn test_invalid_document_is_import_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, "{\"version\": 1}").unwrap();
    let err = run_export(&args(input, Format::Png)).unwrap_err();
    assert!(matches!(err, CliError::Import(_)));
}
