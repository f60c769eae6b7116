//! Logbook Maker Library
//!
//! Stamps PDF logbooks and controlled documents so every distributed copy
//! can be traced. This library provides functionality to:
//! - Number pages with a "current / total" label
//! - Print a copy number at the top of each page
//! - Lay a diagonal "Controlled Copy" watermark across each page
//! - Limit annotation to the first pages of a document
//!
//! # Example
//!
//! ```no_run
//! use logbook_maker::config::AnnotationConfig;
//! use logbook_maker::pdf::annotate_pdf;
//! use std::path::Path;
//!
//! let config = AnnotationConfig {
//!     max_pages: Some(5),
//!     total_pages: Some(20),
//!     ..AnnotationConfig::new("CC-001")
//! };
//!
//! annotate_pdf(Path::new("logbook.pdf"), Path::new("logbook-cc-001.pdf"), &config)
//!     .expect("Failed to annotate PDF");
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod template;

// Re-export commonly used items
pub use config::AnnotationConfig;
pub use error::{Error, ErrorKind, Result};
pub use pdf::{annotate_pdf, PageAnnotator};
