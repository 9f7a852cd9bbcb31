use std::collections::{HashMap, HashSet};

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Filter, Name, Pdf, Rect, Ref, Str};
use ttf_parser::Face;

use crate::error::{Error, MeasureError};

/// Width of rendered text. This is the only capability the layout engine
/// needs from a font.
pub trait Measure {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, MeasureError>;
}

/// One glyph of the embedded subset.
#[derive(Clone, Copy, Debug)]
struct SubsetGlyph {
    /// Glyph id inside the subset, which is also the CID under Identity-H.
    gid: u16,
    /// Glyph id in the complete font program.
    original: u16,
    /// Advance in 1000-units.
    advance: f32,
}

enum Encoding {
    /// Built-in Type1 face, one WinAnsi byte per character.
    WinAnsi { ascii: &'static [u16; 95] },
    /// Embedded subset, two-byte glyph ids.
    Identity { glyphs: HashMap<char, SubsetGlyph> },
}

/// A font registered in the document, addressed in content streams by its
/// resource name (`/F1`, `/F2`, ...).
pub(crate) struct FontEntry {
    pub(crate) resource_name: String,
    pub(crate) object: Ref,
    encoding: Encoding,
}

impl FontEntry {
    fn advance(&self, ch: char) -> Result<f32, MeasureError> {
        let advance = match &self.encoding {
            Encoding::WinAnsi { ascii } => winansi_byte(ch).map(|b| match b {
                32..=126 => f32::from(ascii[usize::from(b - 32)]),
                0xA0 => f32::from(ascii[0]),
                // Latin-1 letters and symbols: close enough to the AFM average.
                _ => 556.0,
            }),
            // Embedded fonts only know the characters they were subset for.
            Encoding::Identity { glyphs } => glyphs.get(&ch).map(|g| g.advance),
        };
        advance.ok_or(MeasureError::Unencodable(ch))
    }

    /// Bytes for a PDF `Tj` operand in this font's encoding. Characters the
    /// font cannot show are dropped (WinAnsi) or become `.notdef` (subset).
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.encoding {
            Encoding::WinAnsi { .. } => text.chars().filter_map(winansi_byte).collect(),
            Encoding::Identity { glyphs } => text
                .chars()
                .flat_map(|ch| glyphs.get(&ch).map_or(0, |g| g.gid).to_be_bytes())
                .collect(),
        }
    }
}

impl Measure for FontEntry {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        let units = text
            .chars()
            .try_fold(0.0f32, |sum, ch| self.advance(ch).map(|a| sum + a))?;
        Ok(units * font_size / 1000.0)
    }
}

/// Windows-1252 assignments in 0x80..=0x9F, where it departs from Latin-1.
const WINANSI_C1: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

fn winansi_byte(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => Some(ch as u8),
        _ => WINANSI_C1
            .iter()
            .find(|&&(c, _)| c == ch)
            .map(|&(_, byte)| byte),
    }
}

/// Helvetica AFM widths for printable ASCII (32..=126).
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold AFM widths for printable ASCII (32..=126).
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// The two built-in faces the packing list uses besides the embedded font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum StandardFace {
    Helvetica,
    HelveticaBold,
}

impl StandardFace {
    fn base_font(self) -> &'static [u8] {
        match self {
            StandardFace::Helvetica => b"Helvetica",
            StandardFace::HelveticaBold => b"Helvetica-Bold",
        }
    }

    fn ascii_widths(self) -> &'static [u16; 95] {
        match self {
            StandardFace::Helvetica => &HELVETICA_ASCII,
            StandardFace::HelveticaBold => &HELVETICA_BOLD_ASCII,
        }
    }
}

/// Register a base-14 face. Nothing is embedded; viewers supply the glyphs.
pub(crate) fn register_standard_font(
    pdf: &mut Pdf,
    face: StandardFace,
    resource_name: &str,
    alloc: &mut impl FnMut() -> Ref,
) -> FontEntry {
    let object = alloc();
    pdf.type1_font(object)
        .base_font(Name(face.base_font()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    FontEntry {
        resource_name: resource_name.to_string(),
        object,
        encoding: Encoding::WinAnsi {
            ascii: face.ascii_widths(),
        },
    }
}

fn font_error(reason: impl Into<String>) -> Error {
    Error::AssetLoad {
        asset: "font",
        reason: reason.into(),
    }
}

/// Font-wide metrics scaled to 1000 units per em.
struct FaceMetrics {
    ascent: f32,
    descent: f32,
    cap_height: f32,
    bbox: Rect,
}

impl FaceMetrics {
    fn read(face: &Face) -> Self {
        let scale = 1000.0 / f32::from(face.units_per_em());
        let bb = face.global_bounding_box();
        Self {
            ascent: f32::from(face.ascender()) * scale,
            descent: f32::from(face.descender()) * scale,
            cap_height: face
                .capital_height()
                .map_or(700.0, |h| f32::from(h) * scale),
            bbox: Rect::new(
                f32::from(bb.x_min) * scale,
                f32::from(bb.y_min) * scale,
                f32::from(bb.x_max) * scale,
                f32::from(bb.y_max) * scale,
            ),
        }
    }
}

/// Pick the glyphs the face has for `used_chars` and number them for the
/// subset. Characters are visited in order so the numbering is stable.
fn plan_subset(
    face: &Face,
    used_chars: &HashSet<char>,
) -> (subsetter::GlyphRemapper, HashMap<char, SubsetGlyph>) {
    let scale = 1000.0 / f32::from(face.units_per_em());
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut glyphs = HashMap::with_capacity(chars.len());
    for ch in chars {
        let Some(gid) = face.glyph_index(ch) else {
            continue;
        };
        let advance = face
            .glyph_hor_advance(gid)
            .map_or(0.0, |adv| f32::from(adv) * scale);
        glyphs.insert(
            ch,
            SubsetGlyph {
                gid: remapper.remap(gid.0),
                original: gid.0,
                advance,
            },
        );
    }
    (remapper, glyphs)
}

/// PostScript name from the `name` table, reduced to characters that are
/// legal in a PDF name.
fn base_font_name(face: &Face) -> String {
    let name = face
        .names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
        .find_map(|n| n.to_string())
        .unwrap_or_default();
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%#".contains(*c))
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

/// Six-letter subset prefix (`ABCDEF+Name`), derived from the covered
/// characters so identical input yields identical output.
fn subset_tag(glyphs: &HashMap<char, SubsetGlyph>) -> String {
    let mut chars: Vec<u32> = glyphs.keys().map(|&c| u32::from(c)).collect();
    chars.sort_unstable();
    let hash = chars
        .iter()
        .fold(0x811c_9dc5u32, |h, &c| (h ^ c).wrapping_mul(0x0100_0193));
    (0..6)
        .map(|i| char::from(b'A' + ((hash >> (i * 5)) % 26) as u8))
        .collect()
}

fn identity_system_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

/// Embed a TrueType/OpenType face as a Type0 font over a CIDFontType2
/// descendant, Identity-H encoded, with a ToUnicode map so the text stays
/// extractable.
///
/// The font program is subset to `used_chars`. Measuring any character
/// outside that set, or one the face has no glyph for, fails.
pub(crate) fn register_truetype_font(
    pdf: &mut Pdf,
    font_data: &[u8],
    face_index: u32,
    resource_name: &str,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<FontEntry, Error> {
    let t0 = std::time::Instant::now();
    let face = Face::parse(font_data, face_index)
        .map_err(|e| font_error(format!("not a TrueType/OpenType font: {e}")))?;

    let metrics = FaceMetrics::read(&face);
    let (remapper, planned) = plan_subset(&face, used_chars);
    let uncovered = used_chars.len() - planned.len();
    if uncovered > 0 {
        log::warn!(
            "Embedded font has no glyph for {uncovered} of {} characters",
            used_chars.len()
        );
    }

    let family = base_font_name(&face);
    let (program, glyphs, base_font) = match subsetter::subset(font_data, face_index, &remapper) {
        Ok(subset) => {
            let tagged = format!("{}+{family}", subset_tag(&planned));
            (subset, planned, tagged)
        }
        Err(e) => {
            log::warn!("Font subsetting failed for {family}: {e}; embedding full font");
            // The full program keeps the face's own glyph ids.
            let glyphs = planned
                .into_iter()
                .map(|(ch, g)| (ch, SubsetGlyph { gid: g.original, ..g }))
                .collect();
            (font_data.to_vec(), glyphs, family)
        }
    };

    let object = alloc();
    let cid_ref = alloc();
    let descriptor_ref = alloc();
    let program_ref = alloc();
    let to_unicode_ref = alloc();

    let raw_len = i32::try_from(program.len())
        .map_err(|_| Error::Pdf(format!("font program too large ({} bytes)", program.len())))?;
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&program, 6);
    pdf.stream(program_ref, &compressed)
        .filter(Filter::FlateDecode)
        .pair(Name(b"Length1"), raw_len);

    pdf.font_descriptor(descriptor_ref)
        .name(Name(base_font.as_bytes()))
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(metrics.bbox)
        .italic_angle(0.0)
        .ascent(metrics.ascent)
        .descent(metrics.descent)
        .cap_height(metrics.cap_height)
        .stem_v(80.0)
        .font_file2(program_ref);

    // Several characters may share a glyph; widths are keyed by glyph.
    let mut by_gid: Vec<(u16, f32)> = glyphs.values().map(|g| (g.gid, g.advance)).collect();
    by_gid.sort_by_key(|&(gid, _)| gid);
    by_gid.dedup_by_key(|&mut (gid, _)| gid);
    {
        let mut cid = pdf.cid_font(cid_ref);
        cid.subtype(CidFontType::Type2)
            .base_font(Name(base_font.as_bytes()))
            .system_info(identity_system_info())
            .font_descriptor(descriptor_ref)
            .default_width(0.0)
            .cid_to_gid_map_predefined(Name(b"Identity"));
        if !by_gid.is_empty() {
            let mut widths = cid.widths();
            for run in by_gid.chunk_by(|a, b| b.0 == a.0 + 1) {
                widths.consecutive(run[0].0, run.iter().map(|&(_, w)| w));
            }
        }
    }

    let cmap_name = format!("{base_font}-UTF16");
    let mut cmap = UnicodeCmap::new(Name(cmap_name.as_bytes()), identity_system_info());
    for (&ch, glyph) in &glyphs {
        cmap.pair(glyph.gid, ch);
    }
    let cmap = cmap.finish();
    pdf.stream(to_unicode_ref, cmap.as_slice());

    pdf.type0_font(object)
        .base_font(Name(base_font.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_ref)
        .to_unicode(to_unicode_ref);

    log::debug!(
        "Embedded {base_font}: {} glyphs, {} bytes in {:.1}ms",
        by_gid.len(),
        compressed.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(FontEntry {
        resource_name: resource_name.to_string(),
        object,
        encoding: Encoding::Identity { glyphs },
    })
}
