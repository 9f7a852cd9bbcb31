#![allow(dead_code)]

use std::path::{Path, PathBuf};

use packing_list_pdf::layout::{
    FontSet, FontSlot, LogoBox, Page, RenderContext, RenderedDocument, TextOp, layout_document,
};
use packing_list_pdf::{LayoutConfig, LineItem, Measure, MeasureError, PartyInfo, ShipmentManifest};

/// Every character advances by the same amount (1000-units), so widths are
/// easy to compute by hand.
pub struct Fixed(pub f32);

impl Measure for Fixed {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        Ok(text.chars().count() as f32 * self.0 * font_size / 1000.0)
    }
}

/// Fails on anything outside ASCII, like a WinAnsi font asked for CJK.
pub struct AsciiOnly(pub f32);

impl Measure for AsciiOnly {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        match text.chars().find(|c| !c.is_ascii()) {
            Some(c) => Err(MeasureError::Unencodable(c)),
            None => Fixed(self.0).text_width(text, font_size),
        }
    }
}

pub static MONO: Fixed = Fixed(500.0);

pub const LOGO: LogoBox = LogoBox {
    width: 60.0,
    height: 20.0,
};

pub fn mono_fonts() -> FontSet<'static> {
    FontSet {
        regular: &MONO,
        bold: &MONO,
        alternate: &MONO,
    }
}

pub fn party(name: &str, address: &str) -> PartyInfo {
    PartyInfo {
        name: name.to_string(),
        address: address.to_string(),
        company: format!("{name} Ltd."),
        tel: "+886 2 1234 5678".to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn item(name: &str, description: &[&str]) -> LineItem {
    LineItem {
        item: name.to_string(),
        prod_description: description.iter().map(|s| s.to_string()).collect(),
        qty: "2".to_string(),
        weight: "1.5kg".to_string(),
    }
}

pub fn manifest(items: Vec<LineItem>) -> ShipmentManifest {
    ShipmentManifest {
        sender: party("Alice", "12 Harbour Road, Keelung"),
        receiver: party("Bob", "5F, No. 123, Section 3, Ren'ai Road, Taipei"),
        shipping_item_list: items,
    }
}

/// `count` items whose descriptions are `lines` short entries each, tagged
/// `r{row}l{line}` so every drawn line can be traced back.
pub fn tagged_manifest(count: usize, lines: usize) -> ShipmentManifest {
    let items = (1..=count)
        .map(|r| LineItem {
            item: format!("item-{r}"),
            prod_description: (1..=lines).map(|l| format!("r{r}l{l}")).collect(),
            qty: r.to_string(),
            weight: format!("{r}kg"),
        })
        .collect();
    manifest(items)
}

pub fn layout_with(manifest: &ShipmentManifest, config: &LayoutConfig) -> RenderedDocument {
    let ctx = RenderContext::new(config, mono_fonts(), LOGO, manifest);
    layout_document(&ctx).expect("layout")
}

pub fn layout(manifest: &ShipmentManifest) -> RenderedDocument {
    layout_with(manifest, &LayoutConfig::default())
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

/// Text drawn inside the table body (below the title) in column `col`.
pub fn column_texts<'p>(page: &'p Page, config: &LayoutConfig, col: usize) -> Vec<&'p TextOp> {
    page.texts()
        .filter(|t| t.font == FontSlot::Regular)
        .filter(|t| t.y < config.table_start_y && t.y > config.footer_margin + 20.0)
        .filter(|t| approx(t.x, config.column_x(col)))
        .collect()
}

pub fn row_labels(page: &Page, config: &LayoutConfig) -> Vec<String> {
    column_texts(page, config, 0)
        .into_iter()
        .map(|t| t.text.clone())
        .collect()
}

pub fn description_texts(page: &Page, config: &LayoutConfig) -> Vec<String> {
    column_texts(page, config, 2)
        .into_iter()
        .map(|t| t.text.clone())
        .collect()
}

/// Route `log` output through the test harness; `RUST_LOG=debug` shows page breaks.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A TrueType font from the usual system locations, for end-to-end renders.
pub fn find_system_font() -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![
        "/usr/share/fonts".into(),
        "/usr/local/share/fonts".into(),
        "/Library/Fonts".into(),
        "/System/Library/Fonts/Supplemental".into(),
        "C:\\Windows\\Fonts".into(),
    ];
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(home).join(".local/share/fonts"));
    }

    let mut stack = dirs;
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_usable_font(&path) {
                return Some(path);
            }
        }
    }
    None
}

fn is_usable_font(path: &Path) -> bool {
    let is_ttf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttf"));
    if !is_ttf {
        return false;
    }
    std::fs::read(path).is_ok_and(|data| ttf_parser::Face::parse(&data, 0).is_ok())
}

pub fn png_logo(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 20) as u8, (y * 20) as u8, 128, if x == 0 { 0 } else { 255 }])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
