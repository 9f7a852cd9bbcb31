use super::page::{FontSlot, RenderedDocument};
use super::RenderContext;

/// Stamp `"{i} of {T}"` on every page. Needs the final page count, so it only
/// runs after the table is complete.
pub fn number_pages(doc: &mut RenderedDocument, ctx: &RenderContext) {
    let cfg = ctx.config;
    let size = cfg.body_font_size;
    let total = doc.pages.len();
    let y = cfg.margin + cfg.page_number_rise;

    for (i, page) in doc.pages.iter_mut().enumerate() {
        let label = format!("{} of {}", i + 1, total);
        let w = ctx.fonts.width(FontSlot::Regular, &label, size);
        let x = page.width - cfg.page_number_anchor - w / 2.0;
        page.draw_text(&label, x, y, FontSlot::Regular, size);
    }
}
