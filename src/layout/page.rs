/// Which of the three document fonts a text op uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontSlot {
    /// Helvetica: table cells, info lines, contact line, page numbers.
    Regular,
    /// Helvetica-Bold: table title and column headings.
    Bold,
    /// The embedded font: wrapped addresses and the company name.
    Alternate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub font: FontSlot,
    pub text: String,
}

/// One absolutely positioned drawing command. Coordinates are PDF points with
/// the origin at the bottom-left corner.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text(TextOp),
    /// Filled black bar of `width` x `thickness` with its bottom edge at `y`.
    Rule {
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
    },
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Empty strings draw nothing.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, font: FontSlot, font_size: f32) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text(TextOp {
            x,
            y,
            font_size,
            font,
            text: text.to_string(),
        }));
    }

    pub fn draw_rule(&mut self, x: f32, y: f32, width: f32, thickness: f32) {
        self.ops.push(DrawOp::Rule {
            x,
            y,
            width,
            thickness,
        });
    }

    pub fn draw_logo(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(DrawOp::Logo {
            x,
            y,
            width,
            height,
        });
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            DrawOp::Rule { x, y, width, .. } => Some((x, y, width)),
            _ => None,
        })
    }
}

/// All pages of one packing list, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedDocument {
    pub pages: Vec<Page>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
