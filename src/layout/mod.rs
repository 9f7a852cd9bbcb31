//! Page layout for the packing list: text wrapping, page chrome, the
//! paginating item table and page numbering. Nothing here knows about PDF
//! objects; pages are recorded as [`DrawOp`]s that the writer serializes.

mod chrome;
mod numbering;
mod page;
mod table;
mod wrap;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::LayoutConfig;
use crate::error::Error;
use crate::fonts::Measure;
use crate::model::ShipmentManifest;

pub use chrome::{draw_info_block, new_page, receiver_lines, sender_lines};
pub use numbering::number_pages;
pub use page::{DrawOp, FontSlot, Page, RenderedDocument, TextOp};
pub use table::{description_lines, draw_table_header, render_table};
pub use wrap::{measure_or_zero, wrap_chars, wrap_words};

#[derive(Clone, Copy)]
pub struct FontSet<'a> {
    pub regular: &'a dyn Measure,
    pub bold: &'a dyn Measure,
    pub alternate: &'a dyn Measure,
}

impl<'a> FontSet<'a> {
    pub fn get(&self, slot: FontSlot) -> &'a dyn Measure {
        match slot {
            FontSlot::Regular => self.regular,
            FontSlot::Bold => self.bold,
            FontSlot::Alternate => self.alternate,
        }
    }

    pub fn width(&self, slot: FontSlot, text: &str, font_size: f32) -> f32 {
        measure_or_zero(self.get(slot), text, font_size)
    }
}

/// Display size of the logo in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogoBox {
    pub width: f32,
    pub height: f32,
}

/// Everything a component needs to draw, passed by reference to each of them.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a LayoutConfig,
    pub fonts: FontSet<'a>,
    pub logo: LogoBox,
    pub manifest: &'a ShipmentManifest,
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        fonts: FontSet<'a>,
        logo: LogoBox,
        manifest: &'a ShipmentManifest,
    ) -> Self {
        Self {
            config,
            fonts,
            logo,
            manifest,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::Relaxed))
    }
}

/// Lay out and number every page of the packing list.
pub fn layout_document(ctx: &RenderContext) -> Result<RenderedDocument, Error> {
    ctx.config.validate()?;
    let mut doc = render_table(ctx)?;
    number_pages(&mut doc, ctx);
    Ok(doc)
}
