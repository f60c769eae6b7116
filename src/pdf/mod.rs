//! PDF manipulation module

pub mod annotate;
pub mod document;
pub mod metadata;
pub mod text;

// Re-export commonly used items
pub use annotate::{annotate_pdf, AnnotationSummary, PageAnnotator, PageOverlay};
pub use document::{load_document, save_document};
pub use metadata::stamp_output_metadata;
