mod common;

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::AtomicBool;

use rayon::prelude::*;

use common::{item, manifest, png_logo, tagged_manifest};
use packing_list_pdf::{
    Assets, Error, LayoutConfig, generate_packing_list, generate_packing_list_with_cancel,
    write_packing_list,
};

fn system_assets() -> Option<Assets> {
    common::init_logging();
    let font = common::find_system_font()?;
    let data = std::fs::read(&font).ok()?;
    Some(Assets::new(png_logo(40, 12), data))
}

macro_rules! require_font {
    () => {
        match system_assets() {
            Some(assets) => assets,
            None => {
                eprintln!("skipping: no TrueType font found on this system");
                return;
            }
        }
    };
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn page_objects(pdf: &[u8]) -> usize {
    count(pdf, b"/Type /Page") - count(pdf, b"/Type /Pages")
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("packing-list-pdf-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir.join(name)
}

#[test]
fn unreadable_font_is_an_asset_error() {
    let assets = Assets::new(png_logo(4, 4), b"definitely not a font".to_vec());
    let err = generate_packing_list(&manifest(Vec::new()), &assets, &LayoutConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::AssetLoad { asset: "font", .. }), "{err:?}");
}

#[test]
fn missing_asset_files_are_asset_errors() {
    let err = Assets::load(
        Path::new("/nonexistent/logo.png"),
        Path::new("/nonexistent/font.ttf"),
    )
    .unwrap_err();
    assert!(matches!(err, Error::AssetLoad { asset: "logo", .. }), "{err:?}");
    assert!(err.to_string().contains("/nonexistent/logo.png"));
}

#[test]
fn undecodable_logo_is_an_asset_error() {
    let mut assets = require_font!();
    assets.logo_png = b"\x89PNG but not really".to_vec();
    let err = generate_packing_list(&manifest(Vec::new()), &assets, &LayoutConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::AssetLoad { asset: "logo", .. }), "{err:?}");
}

#[test]
fn invalid_config_fails_before_any_output() {
    let assets = Assets::new(Vec::new(), Vec::new());
    let config = LayoutConfig {
        column_widths: vec![100.0; 4],
        ..LayoutConfig::default()
    };
    let err = generate_packing_list(&manifest(Vec::new()), &assets, &config).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err:?}");
}

#[test]
fn renders_a_single_page_document() {
    let assets = require_font!();
    let m = manifest(vec![
        item("Bolts", &["M8 x 40mm, zinc plated"]),
        item("Nuts", &["M8, boxes of 100", "台北市 warehouse stock"]),
    ]);
    let bytes = generate_packing_list(&m, &assets, &LayoutConfig::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.trim_ascii_end().ends_with(b"%%EOF"));
    assert_eq!(page_objects(&bytes), 1);
    assert!(count(&bytes, b"/Helvetica-Bold") >= 1);
    assert!(count(&bytes, b"/Identity-H") >= 1);
    assert!(count(&bytes, b"/SMask") >= 1, "logo alpha should become a soft mask");
}

#[test]
fn page_count_matches_layout() {
    let assets = require_font!();
    // Short tags never wrap, so the page count does not depend on glyph widths.
    let m = tagged_manifest(60, 3);
    let expected = common::layout(&m).page_count();
    assert!(expected > 1);
    let bytes = generate_packing_list(&m, &assets, &LayoutConfig::default()).unwrap();
    assert_eq!(page_objects(&bytes), expected);
}

#[test]
fn cancelled_render_returns_no_bytes() {
    let assets = require_font!();
    let cancel = AtomicBool::new(true);
    let err = generate_packing_list_with_cancel(
        &tagged_manifest(30, 2),
        &assets,
        &LayoutConfig::default(),
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Cancelled { pages: 0 }), "{err:?}");
}

#[test]
fn independent_renders_run_in_parallel() {
    let assets = require_font!();
    let config = LayoutConfig::default();
    let results: Vec<Result<Vec<u8>, Error>> = (0..8)
        .into_par_iter()
        .map(|n| generate_packing_list(&tagged_manifest(n * 15, 2), &assets, &config))
        .collect();
    for (n, result) in results.iter().enumerate() {
        let bytes = result.as_ref().unwrap_or_else(|e| panic!("render {n} failed: {e}"));
        assert!(bytes.starts_with(b"%PDF-"));
        let expected = common::layout(&tagged_manifest(n * 15, 2)).page_count();
        assert_eq!(page_objects(bytes), expected, "render {n}");
    }
}

#[test]
fn writes_manifest_file_to_pdf() {
    let assets = require_font!();
    let json = scratch("manifest.json");
    let out = scratch("manifest.pdf");
    std::fs::write(
        &json,
        r#"{
            "sender": {"name": "Alice", "address": "12 Harbour Road"},
            "receiver": {"name": "Bob", "address": "台北市大安區仁愛路三段123號5樓"},
            "shippingItemList": [{"item": "Rope", "prodDescription": "20m coil", "qty": 4}]
        }"#,
    )
    .unwrap();

    write_packing_list(&json, &out, &assets, &LayoutConfig::default()).unwrap();
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let missing = scratch("missing.json");
    let err = write_packing_list(&missing, &out, &assets, &LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("missing.json"));
}

/// Page count and the first media box as reported by `mutool info`.
fn mutool_info(pdf: &Path) -> Option<(usize, (f32, f32))> {
    let output = Command::new("mutool")
        .args(["info", pdf.to_str()?])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);

    let pages = text
        .lines()
        .find_map(|l| l.trim().strip_prefix("Pages:"))
        .and_then(|n| n.trim().parse().ok())?;

    let mut in_mediaboxes = false;
    for line in text.lines() {
        if line.starts_with("Mediaboxes") {
            in_mediaboxes = true;
            continue;
        }
        if in_mediaboxes {
            let start = line.find('[')?;
            let end = line.find(']')?;
            let nums: Vec<f32> = line[start + 1..end]
                .split_whitespace()
                .filter_map(|s| s.parse().ok())
                .collect();
            if nums.len() == 4 {
                return Some((pages, (nums[2] - nums[0], nums[3] - nums[1])));
            }
            break;
        }
    }
    None
}

#[test]
fn mutool_reads_page_count_and_geometry() {
    let assets = require_font!();
    let m = tagged_manifest(60, 3);
    let bytes = generate_packing_list(&m, &assets, &LayoutConfig::default()).unwrap();
    let path = scratch("geometry.pdf");
    std::fs::write(&path, &bytes).unwrap();

    let Some((pages, (w, h))) = mutool_info(&path) else {
        eprintln!("skipping: mutool not available");
        return;
    };
    assert_eq!(pages, common::layout(&m).page_count());
    assert!((w - 595.28).abs() < 0.5, "width {w}");
    assert!((h - 841.89).abs() < 0.5, "height {h}");
}
