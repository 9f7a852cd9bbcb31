use crate::model::PartyInfo;

use super::page::{FontSlot, Page};
use super::wrap::wrap_chars;
use super::RenderContext;

/// Index of the address line inside an info block.
const ADDRESS_LINE: usize = 1;

pub fn receiver_lines(receiver: &PartyInfo) -> Vec<String> {
    vec![
        format!("Receiver: {}", receiver.name),
        format!("Address: {}", receiver.address),
        String::new(),
        format!("Company: {}", receiver.company),
        format!("Tel: {}", receiver.tel),
        format!("Email: {}", receiver.email),
        String::new(),
    ]
}

/// The last line labels the page number stamped after layout.
pub fn sender_lines(sender: &PartyInfo) -> Vec<String> {
    vec![
        format!("Sender: {}", sender.name),
        format!("Address: {}", sender.address),
        String::new(),
        format!("Company: {}", sender.company),
        format!("Tel: {}", sender.tel),
        format!("Email: {}", sender.email),
        "Page No.: ".to_string(),
    ]
}

/// Draw `lines` downward from `(x, y)`, one line height apart.
///
/// With `wrap_address` the address line is character-wrapped in the alternate
/// font to half the page width less the margin, and its sub-lines run down
/// from the address's own baseline. It does not move the block cursor: the
/// blank line that follows the address shares its baseline, so an address
/// longer than two sub-lines runs into the lines below it.
pub fn draw_info_block(
    page: &mut Page,
    x: f32,
    y: f32,
    lines: &[String],
    ctx: &RenderContext,
    wrap_address: bool,
) {
    let cfg = ctx.config;
    let size = cfg.body_font_size;
    let address_width = (page.width - cfg.margin) / 2.0;
    let mut y = y;

    for (index, text) in lines.iter().enumerate() {
        if index == ADDRESS_LINE && wrap_address {
            let mut line_y = y;
            for part in wrap_chars(text, address_width, ctx.fonts.alternate, size) {
                page.draw_text(&part, x, line_y, FontSlot::Alternate, size);
                line_y -= cfg.line_height;
            }
            continue;
        }
        page.draw_text(text, x, y, FontSlot::Regular, size);
        y -= cfg.line_height;
    }
}

fn draw_centered(page: &mut Page, ctx: &RenderContext, text: &str, y: f32, font: FontSlot, size: f32) {
    let x = (page.width - ctx.fonts.width(font, text, size)) / 2.0;
    page.draw_text(text, x, y, font, size);
}

/// Start a page with its chrome: logo, receiver and sender blocks, footer.
///
/// Returns the page and the baseline where the table title goes. That
/// baseline is fixed and does not depend on how far the addresses wrapped.
pub fn new_page(ctx: &RenderContext) -> (Page, f32) {
    let cfg = ctx.config;
    let mut page = Page::new(cfg.page_width, cfg.page_height);
    let (width, height) = (page.width, page.height);

    let logo_x = (width - ctx.logo.width) / 2.0;
    let logo_y = height - cfg.margin - ctx.logo.height;
    page.draw_logo(logo_x, logo_y, ctx.logo.width, ctx.logo.height);

    let block_y = logo_y - cfg.logo_gap;
    draw_info_block(
        &mut page,
        cfg.margin,
        block_y,
        &receiver_lines(&ctx.manifest.receiver),
        ctx,
        cfg.wrap_address,
    );
    draw_info_block(
        &mut page,
        width / 2.0 + cfg.right_block_offset,
        block_y,
        &sender_lines(&ctx.manifest.sender),
        ctx,
        cfg.wrap_address,
    );

    // Footer
    page.draw_rule(
        cfg.margin,
        cfg.footer_margin,
        width - cfg.margin * 2.0,
        cfg.rule_thickness,
    );
    draw_centered(
        &mut page,
        ctx,
        &cfg.company_name,
        cfg.footer_margin + cfg.company_name_offset,
        FontSlot::Alternate,
        cfg.company_font_size,
    );
    draw_centered(
        &mut page,
        ctx,
        &cfg.contact_info,
        cfg.footer_margin - cfg.contact_offset,
        FontSlot::Regular,
        cfg.contact_font_size,
    );

    (page, cfg.table_start_y)
}
