use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Every layout constant of the packing list. A JSON file only needs to name
/// the values it overrides; everything else keeps its default.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub line_height: f32,
    /// Size of all table cells and info block lines.
    pub body_font_size: f32,
    pub company_font_size: f32,
    pub contact_font_size: f32,

    /// Defaults to the letterhead text as shipped, spelling included
    /// (`"Copany Name 公司名"`). Override it in the layout JSON.
    pub company_name: String,
    pub contact_info: String,

    pub logo_scale: f32,
    /// Distance between the logo bottom and the first info block line.
    pub logo_gap: f32,
    /// Right block starts this far right of the page center.
    pub right_block_offset: f32,
    pub wrap_address: bool,

    pub footer_margin: f32,
    pub company_name_offset: f32,
    pub contact_offset: f32,

    pub table_title: String,
    pub title_font_size: f32,
    pub column_headings: Vec<String>,
    pub column_widths: Vec<f32>,
    /// Baseline of the table title on every page.
    pub table_start_y: f32,
    pub header_gap: f32,
    /// A page is full once the cursor drops below `margin + row_threshold`.
    pub row_threshold: f32,
    /// Descriptions are measured at this size but drawn at `body_font_size`.
    pub description_wrap_font_size: f32,
    pub closing_rule_offset: f32,
    pub rule_thickness: f32,

    /// The page label is centered this far left of the right page edge.
    pub page_number_anchor: f32,
    /// Page label baseline above `margin`.
    pub page_number_rise: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 50.0,
            line_height: 15.0,
            body_font_size: 8.0,
            company_font_size: 8.0,
            contact_font_size: 7.5,
            company_name: "Copany Name 公司名".to_string(),
            contact_info:
                "5F, No. 123, Section 3, Ren'ai Road, Da'an District, Taipei City, Taiwan."
                    .to_string(),
            logo_scale: 0.1,
            logo_gap: 20.0,
            right_block_offset: 50.0,
            wrap_address: true,
            footer_margin: 30.0,
            company_name_offset: 8.0,
            contact_offset: 10.0,
            table_title: "Shipping Item List".to_string(),
            title_font_size: 14.0,
            column_headings: ["No.", "Item", "Prod Description", "Qty", "Weight"]
                .map(String::from)
                .to_vec(),
            column_widths: vec![50.0, 100.0, 240.0, 50.0, 50.0],
            table_start_y: 620.0,
            header_gap: 25.0,
            row_threshold: 50.0,
            description_wrap_font_size: 10.0,
            closing_rule_offset: 6.0,
            rule_thickness: 1.0,
            page_number_anchor: 190.0,
            page_number_rise: 604.5,
        }
    }
}

/// Column order of the item table.
pub(crate) const COL_NO: usize = 0;
pub(crate) const COL_ITEM: usize = 1;
pub(crate) const COL_DESCRIPTION: usize = 2;
pub(crate) const COL_QTY: usize = 3;
pub(crate) const COL_WEIGHT: usize = 4;
const COLUMN_COUNT: usize = 5;

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        Self::from_json(&text)
    }

    /// Baseline of the first row on a page that starts with the table header.
    pub fn first_row_y(&self) -> f32 {
        self.table_start_y - self.line_height - self.header_gap
    }

    pub fn break_y(&self) -> f32 {
        self.margin + self.row_threshold
    }

    pub fn table_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    /// Left edge of column `index`.
    pub fn column_x(&self, index: usize) -> f32 {
        self.margin + self.column_widths[..index.min(self.column_widths.len())].iter().sum::<f32>()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.column_widths.len() != COLUMN_COUNT {
            return Err(Error::Config(format!(
                "expected {COLUMN_COUNT} column widths, got {}",
                self.column_widths.len()
            )));
        }
        if self.column_headings.len() != self.column_widths.len() {
            return Err(Error::Config(format!(
                "{} column headings for {} columns",
                self.column_headings.len(),
                self.column_widths.len()
            )));
        }
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("line_height", self.line_height),
            ("body_font_size", self.body_font_size),
            ("description_wrap_font_size", self.description_wrap_font_size),
            ("logo_scale", self.logo_scale),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(Error::Config(format!("{name} must be positive, got {value}")));
        }
        if self.column_widths.iter().any(|w| !(*w >= 0.0)) {
            return Err(Error::Config("column widths must not be negative".into()));
        }
        // A fresh page must have room for at least one line, or the table
        // flow would start new pages forever.
        if self.first_row_y() < self.break_y() {
            return Err(Error::Config(format!(
                "first row baseline {:.2} is below the page-break line {:.2}",
                self.first_row_y(),
                self.break_y()
            )));
        }
        Ok(())
    }
}

/// Raw bytes of the two external assets. Both are required.
#[derive(Clone, Debug)]
pub struct Assets {
    pub logo_png: Vec<u8>,
    /// TrueType/OpenType font used for addresses and the company name.
    pub font: Vec<u8>,
    /// Face index inside a font collection (`.ttc`).
    pub font_index: u32,
}

impl Assets {
    pub fn new(logo_png: Vec<u8>, font: Vec<u8>) -> Self {
        Self {
            logo_png,
            font,
            font_index: 0,
        }
    }

    pub fn load(logo: &Path, font: &Path) -> Result<Self, Error> {
        let read = |asset: &'static str, path: &Path| {
            std::fs::read(path).map_err(|e| Error::AssetLoad {
                asset,
                reason: format!("{}: {}", path.display(), e),
            })
        };
        Ok(Self::new(read("logo", logo)?, read("font", font)?))
    }

    pub fn with_font_index(mut self, index: u32) -> Self {
        self.font_index = index;
        self
    }
}
