use crate::config::{COL_DESCRIPTION, COL_ITEM, COL_NO, COL_QTY, COL_WEIGHT};
use crate::error::Error;
use crate::model::LineItem;

use super::chrome::new_page;
use super::page::{FontSlot, Page, RenderedDocument};
use super::wrap::wrap_words;
use super::RenderContext;

// Offsets below the title baseline.
const HEADING_DROP: f32 = 20.0;
const TOP_RULE_DROP: f32 = 10.0;
const BOTTOM_RULE_DROP: f32 = 26.0;

/// Draw the table title, column headings and the two rules around them.
/// Returns the baseline of the first row.
pub fn draw_table_header(page: &mut Page, y: f32, ctx: &RenderContext) -> f32 {
    let cfg = ctx.config;
    let title_w = ctx.fonts.width(FontSlot::Bold, &cfg.table_title, cfg.title_font_size);
    page.draw_text(
        &cfg.table_title,
        page.width / 2.0 - title_w / 2.0,
        y,
        FontSlot::Bold,
        cfg.title_font_size,
    );

    for (i, heading) in cfg.column_headings.iter().enumerate() {
        page.draw_text(
            heading,
            cfg.column_x(i),
            y - HEADING_DROP,
            FontSlot::Bold,
            cfg.body_font_size,
        );
    }

    let table_w = cfg.table_width();
    page.draw_rule(cfg.margin, y - TOP_RULE_DROP, table_w, cfg.rule_thickness);
    page.draw_rule(cfg.margin, y - BOTTOM_RULE_DROP, table_w, cfg.rule_thickness);

    y - cfg.line_height - cfg.header_gap
}

/// Wrapped description lines of one item, in drawing order. Every entry is
/// split on newlines first; empty pieces produce no lines.
pub fn description_lines(item: &LineItem, ctx: &RenderContext) -> Vec<String> {
    let cfg = ctx.config;
    let width = cfg.column_widths[COL_DESCRIPTION];
    item.prod_description
        .iter()
        .flat_map(|entry| entry.split('\n'))
        .map(|piece| piece.strip_suffix('\r').unwrap_or(piece))
        .flat_map(|piece| {
            wrap_words(piece, width, ctx.fonts.regular, cfg.description_wrap_font_size)
        })
        .collect()
}

/// The single place that owns the page being drawn.
struct TableFlow<'c, 'a> {
    ctx: &'c RenderContext<'a>,
    doc: RenderedDocument,
    page: Page,
    y: f32,
}

impl<'c, 'a> TableFlow<'c, 'a> {
    fn start(ctx: &'c RenderContext<'a>) -> Result<Self, Error> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled { pages: 0 });
        }
        let (mut page, title_y) = new_page(ctx);
        let y = draw_table_header(&mut page, title_y, ctx);
        Ok(Self {
            ctx,
            doc: RenderedDocument::default(),
            page,
            y,
        })
    }

    /// Start a new page when the cursor has reached the break line.
    fn ensure_room(&mut self) -> Result<(), Error> {
        if self.y < self.ctx.config.break_y() {
            self.break_page()?;
        }
        Ok(())
    }

    fn break_page(&mut self) -> Result<(), Error> {
        if self.ctx.is_cancelled() {
            return Err(Error::Cancelled {
                pages: self.doc.pages.len() + 1,
            });
        }
        let (mut page, title_y) = new_page(self.ctx);
        self.y = draw_table_header(&mut page, title_y, self.ctx);
        let finished = std::mem::replace(&mut self.page, page);
        self.doc.pages.push(finished);
        log::debug!("page break, now page {}", self.doc.pages.len() + 1);
        Ok(())
    }

    fn draw_row(&mut self, index: usize, item: &LineItem) -> Result<(), Error> {
        self.ensure_room()?;
        let cfg = self.ctx.config;
        let size = cfg.body_font_size;
        let row_y = self.y;

        let label = (index + 1).to_string();
        self.page.draw_text(&label, cfg.column_x(COL_NO), row_y, FontSlot::Regular, size);
        self.page.draw_text(&item.item, cfg.column_x(COL_ITEM), row_y, FontSlot::Regular, size);
        // Quantity and weight sit on the row's first baseline, on the page
        // where the row starts, however many lines the description takes.
        self.page.draw_text(&item.qty, cfg.column_x(COL_QTY), row_y, FontSlot::Regular, size);
        self.page.draw_text(&item.weight, cfg.column_x(COL_WEIGHT), row_y, FontSlot::Regular, size);

        let lines = description_lines(item, self.ctx);
        if lines.is_empty() {
            self.y -= cfg.line_height;
        }
        let desc_x = cfg.column_x(COL_DESCRIPTION);
        for line in &lines {
            self.ensure_room()?;
            self.page.draw_text(line, desc_x, self.y, FontSlot::Regular, size);
            self.y -= cfg.line_height;
        }

        self.y -= cfg.line_height;
        log::debug!(
            "TABLE row={} lines={} page={} y={:.2}",
            index + 1,
            lines.len(),
            self.doc.pages.len() + 1,
            self.y
        );
        Ok(())
    }

    fn finish(mut self) -> RenderedDocument {
        let cfg = self.ctx.config;
        self.page.draw_rule(
            cfg.margin,
            self.y + cfg.closing_rule_offset,
            cfg.table_width(),
            cfg.rule_thickness,
        );
        self.doc.pages.push(self.page);
        self.doc
    }
}

/// Draw every line item, starting new pages as the table fills them.
///
/// Rows are never measured ahead: the description column paces the row, and
/// a page break may fall between two description lines of the same row. The
/// remaining lines continue under a fresh table header.
pub fn render_table(ctx: &RenderContext) -> Result<RenderedDocument, Error> {
    let mut flow = TableFlow::start(ctx)?;
    for (index, item) in ctx.manifest.shipping_item_list.iter().enumerate() {
        flow.draw_row(index, item)?;
    }
    Ok(flow.finish())
}
