//! Annotation configuration

use crate::error::{Error, Result};
use crate::layout::Length;

/// Default watermark text
pub const DEFAULT_WATERMARK_TEXT: &str = "Controlled Copy";
/// Default template for the copy number label
pub const DEFAULT_COPY_LABEL_TEMPLATE: &str = "Copy No: {copy_number}";
/// Default template for the page number label
pub const DEFAULT_PAGE_LABEL_TEMPLATE: &str = "{number} / {total}";

/// Placeholders accepted by the copy label template
pub const COPY_LABEL_PLACEHOLDERS: &[&str] = &["copy_number"];
/// Placeholders accepted by the page label template
pub const PAGE_LABEL_PLACEHOLDERS: &[&str] = &["number", "total"];

/// Options for annotating a PDF
#[derive(Debug, Clone)]
pub struct AnnotationConfig {
    /// Identifier printed at the top of each annotated page
    pub copy_number: String,
    /// Number of pages, from the start, to annotate (all pages if unset)
    pub max_pages: Option<u32>,
    /// Total shown in the page label (the annotated page count if unset)
    pub total_pages: Option<u32>,
    /// Page number used for the first annotated page
    pub start_number: u32,
    /// Diagonal watermark text; empty disables the watermark
    pub watermark_text: String,
    /// Template for the copy number label
    pub copy_label_template: String,
    /// Template for the page number label
    pub page_label_template: String,
    /// Fonts, colors and margins
    pub style: OverlayStyle,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            copy_number: String::new(),
            max_pages: None,
            total_pages: None,
            start_number: 1,
            watermark_text: DEFAULT_WATERMARK_TEXT.to_string(),
            copy_label_template: DEFAULT_COPY_LABEL_TEMPLATE.to_string(),
            page_label_template: DEFAULT_PAGE_LABEL_TEMPLATE.to_string(),
            style: OverlayStyle::default(),
        }
    }
}

impl AnnotationConfig {
    /// Default configuration for the given copy number
    pub fn new(copy_number: impl Into<String>) -> Self {
        Self {
            copy_number: copy_number.into(),
            ..Default::default()
        }
    }

    /// Check the scalar parameters
    ///
    /// Templates are checked when a [`PageAnnotator`](crate::pdf::PageAnnotator)
    /// parses them.
    pub fn validate(&self) -> Result<()> {
        if self.copy_number.trim().is_empty() {
            return Err(Error::config("copy number must not be empty"));
        }
        if self.start_number < 1 {
            return Err(Error::config("start number must be at least 1"));
        }
        if self.max_pages == Some(0) {
            return Err(Error::config("max pages must be a positive integer"));
        }
        if self.total_pages == Some(0) {
            return Err(Error::config("total pages must be a positive integer"));
        }
        self.style.validate()
    }
}

/// Visual parameters of the overlay
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    /// Distance from the top edge to the copy label baseline;
    /// the page label sits at half this distance above the bottom edge
    pub margin: Length,
    /// Copy label size in points (Helvetica-Bold)
    pub copy_label_font_size: f32,
    /// Page label size in points (Helvetica)
    pub page_label_font_size: f32,
    /// Gray level for both labels (0 = black, 1 = white)
    pub label_gray: f32,
    /// Gray level for the watermark
    pub watermark_gray: f32,
    /// Watermark fill opacity
    pub watermark_opacity: f32,
    /// Watermark rotation in degrees, counter-clockwise
    pub watermark_angle: f32,
    /// Watermark font size as a fraction of the shorter visible page side
    pub watermark_size_ratio: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            margin: Length::from_inches(0.6),
            copy_label_font_size: 14.0,
            page_label_font_size: 12.0,
            label_gray: 0.4,
            watermark_gray: 0.7,
            watermark_opacity: 0.2,
            watermark_angle: 45.0,
            watermark_size_ratio: 0.1,
        }
    }
}

impl OverlayStyle {
    fn validate(&self) -> Result<()> {
        if !(self.margin.mm() > 0.0) {
            return Err(Error::config("margin must be positive"));
        }
        for (name, size) in [
            ("copy label font size", self.copy_label_font_size),
            ("page label font size", self.page_label_font_size),
            ("watermark size ratio", self.watermark_size_ratio),
        ] {
            if !(size > 0.0) {
                return Err(Error::config(format!("{} must be positive", name)));
            }
        }
        for (name, level) in [
            ("label gray", self.label_gray),
            ("watermark gray", self.watermark_gray),
            ("watermark opacity", self.watermark_opacity),
        ] {
            if !(0.0..=1.0).contains(&level) {
                return Err(Error::config(format!("{} must be between 0 and 1", name)));
            }
        }
        if !self.watermark_angle.is_finite() {
            return Err(Error::config("watermark angle must be finite"));
        }
        Ok(())
    }
}
