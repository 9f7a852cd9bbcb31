//! PDF serialization: registers the three document fonts, embeds the logo,
//! runs the layout against the real font metrics and writes one content
//! stream per recorded page.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::config::{Assets, LayoutConfig};
use crate::error::Error;
use crate::fonts::{FontEntry, StandardFace, register_standard_font, register_truetype_font};
use crate::layout::{self, DrawOp, FontSet, FontSlot, LogoBox, Page, RenderContext};
use crate::model::ShipmentManifest;

const LOGO_RESOURCE: &str = "Im1";

struct DocumentFonts {
    regular: FontEntry,
    bold: FontEntry,
    alternate: FontEntry,
}

impl DocumentFonts {
    fn get(&self, slot: FontSlot) -> &FontEntry {
        match slot {
            FontSlot::Regular => &self.regular,
            FontSlot::Bold => &self.bold,
            FontSlot::Alternate => &self.alternate,
        }
    }

    fn as_set(&self) -> FontSet<'_> {
        FontSet {
            regular: &self.regular,
            bold: &self.bold,
            alternate: &self.alternate,
        }
    }

    fn all(&self) -> [&FontEntry; 3] {
        [&self.regular, &self.bold, &self.alternate]
    }
}

/// Every character the embedded font may have to measure or draw. The font
/// is subset to exactly this set.
fn collect_used_chars(manifest: &ShipmentManifest, config: &LayoutConfig) -> HashSet<char> {
    let parties = [&manifest.sender, &manifest.receiver];
    let party_fields = parties
        .into_iter()
        .flat_map(|p| [&p.name, &p.address, &p.company, &p.tel, &p.email]);
    let item_fields = manifest.shipping_item_list.iter().flat_map(|item| {
        [&item.item, &item.qty, &item.weight]
            .into_iter()
            .chain(&item.prod_description)
    });
    let config_fields = [&config.company_name, &config.contact_info, &config.table_title]
        .into_iter()
        .chain(&config.column_headings);

    let mut chars: HashSet<char> = party_fields
        .chain(item_fields)
        .chain(config_fields)
        .flat_map(|s| s.chars())
        .collect();
    // Info block labels and page numbers.
    chars.extend("ReceiverSenderAddressCompanyTelEmailPage No.: of".chars());
    chars.extend('0'..='9');
    chars
}

/// Pixel planes of a decoded logo.
struct LogoPixels {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    /// Present only when some pixel is not fully opaque.
    alpha: Option<Vec<u8>>,
}

fn decode_logo(data: &[u8]) -> Result<LogoPixels, Error> {
    let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Png).map_err(
        |e| Error::AssetLoad {
            asset: "logo",
            reason: format!("not a decodable PNG: {e}"),
        },
    )?;
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    let translucent = rgba.pixels().any(|p| p[3] < u8::MAX);
    Ok(LogoPixels {
        width,
        height,
        rgb: rgba.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect(),
        alpha: translucent.then(|| rgba.pixels().map(|p| p[3]).collect()),
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Channels {
    Gray,
    Rgb,
}

/// Write an 8-bit image XObject, Flate-compressed.
fn write_image(
    pdf: &mut Pdf,
    id: Ref,
    (width, height): (i32, i32),
    channels: Channels,
    samples: &[u8],
    smask: Option<Ref>,
) {
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(samples, 6);
    let mut image = pdf.image_xobject(id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(width);
    image.height(height);
    image.bits_per_component(8);
    match channels {
        Channels::Gray => image.color_space().device_gray(),
        Channels::Rgb => image.color_space().device_rgb(),
    };
    if let Some(mask) = smask {
        image.s_mask(mask);
    }
}

/// Embed the PNG logo as `id`, with a soft mask when it has transparency.
/// Returns its pixel size.
fn embed_logo(
    pdf: &mut Pdf,
    data: &[u8],
    id: Ref,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(u32, u32), Error> {
    let pixels = decode_logo(data)?;
    let size = match (i32::try_from(pixels.width), i32::try_from(pixels.height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::Pdf(format!(
                "logo dimensions {}x{} out of range",
                pixels.width, pixels.height
            )));
        }
    };

    let smask = pixels.alpha.as_deref().map(|alpha| {
        let mask = alloc();
        write_image(pdf, mask, size, Channels::Gray, alpha, None);
        mask
    });
    write_image(pdf, id, size, Channels::Rgb, &pixels.rgb, smask);
    Ok((pixels.width, pixels.height))
}

fn write_page_content(page: &Page, fonts: &DocumentFonts) -> Content {
    let mut content = Content::new();
    // Tf is only emitted when the font or size changes between text objects.
    let mut selected: Option<(FontSlot, f32)> = None;

    for op in &page.ops {
        match op {
            DrawOp::Text(t) => {
                let font = fonts.get(t.font);
                content.begin_text();
                if selected != Some((t.font, t.font_size)) {
                    content.set_font(Name(font.resource_name.as_bytes()), t.font_size);
                    selected = Some((t.font, t.font_size));
                }
                content.next_line(t.x, t.y);
                content.show(Str(&font.encode(&t.text)));
                content.end_text();
            }
            &DrawOp::Rule {
                x,
                y,
                width,
                thickness,
            } => {
                content.rect(x, y, width, thickness);
                content.fill_nonzero();
            }
            &DrawOp::Logo {
                x,
                y,
                width,
                height,
            } => {
                content.save_state();
                content.transform([width, 0.0, 0.0, height, x, y]);
                content.x_object(Name(LOGO_RESOURCE.as_bytes()));
                content.restore_state();
            }
        }
    }
    content
}

fn millis(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

pub fn render(
    manifest: &ShipmentManifest,
    assets: &Assets,
    config: &LayoutConfig,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();
    config.validate()?;

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };
    let catalog_id = alloc();
    let page_tree_id = alloc();

    let used_chars = collect_used_chars(manifest, config);
    let fonts = DocumentFonts {
        regular: register_standard_font(&mut pdf, StandardFace::Helvetica, "F1", &mut alloc),
        bold: register_standard_font(&mut pdf, StandardFace::HelveticaBold, "F2", &mut alloc),
        alternate: register_truetype_font(
            &mut pdf,
            &assets.font,
            assets.font_index,
            "F3",
            &used_chars,
            &mut alloc,
        )?,
    };
    let t_fonts = t0.elapsed();

    let logo_id = alloc();
    let (px_w, px_h) = embed_logo(&mut pdf, &assets.logo_png, logo_id, &mut alloc)?;
    let logo = LogoBox {
        width: px_w as f32 * config.logo_scale,
        height: px_h as f32 * config.logo_scale,
    };
    let t_logo = t0.elapsed();

    let mut ctx = RenderContext::new(config, fonts.as_set(), logo, manifest);
    ctx.cancel = cancel;
    let mut doc = layout::render_table(&ctx)?;
    let t_layout = t0.elapsed();
    layout::number_pages(&mut doc, &ctx);
    let t_numbering = t0.elapsed();

    // Page objects can only be allocated once the page count is final.
    let page_count = doc.page_count();
    let page_refs: Vec<(Ref, Ref)> = (0..page_count).map(|_| (alloc(), alloc())).collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_refs.iter().map(|&(page_id, _)| page_id))
        .count(i32::try_from(page_count).map_err(|_| Error::Pdf("too many pages".into()))?);

    for (page, &(page_id, content_id)) in doc.pages.iter().zip(&page_refs) {
        let raw = write_page_content(page, &fonts).finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

        let mut page_obj = pdf.page(page_id);
        page_obj
            .media_box(Rect::new(0.0, 0.0, page.width, page.height))
            .parent(page_tree_id)
            .contents(content_id);
        let mut resources = page_obj.resources();
        {
            let mut font_dict = resources.fonts();
            for font in fonts.all() {
                font_dict.pair(Name(font.resource_name.as_bytes()), font.object);
            }
        }
        resources
            .x_objects()
            .pair(Name(LOGO_RESOURCE.as_bytes()), logo_id);
    }

    let bytes = pdf.finish();
    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: font_embed={:.1}ms, logo={:.1}ms, layout={:.1}ms, numbering={:.1}ms, assembly={:.1}ms ({} pages, {} bytes)",
        millis(t_fonts),
        millis(t_logo - t_fonts),
        millis(t_layout - t_logo),
        millis(t_numbering - t_layout),
        millis(t_assembly - t_numbering),
        page_count,
        bytes.len(),
    );

    Ok(bytes)
}
