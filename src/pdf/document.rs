//! Loading input PDFs and writing annotated output

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::{Error, Result};

/// Load a PDF that can be annotated
///
/// Fails for missing files, unreadable or encrypted PDFs, and documents
/// without pages.
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    check_annotatable(&doc, path)?;

    debug!(path = %path.display(), pages = doc.get_pages().len(), "loaded input");
    Ok(doc)
}

/// Reject documents the annotator cannot handle
pub fn check_annotatable(doc: &Document, path: &Path) -> Result<()> {
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(Error::Encrypted(path.to_path_buf()));
    }
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyDocument);
    }
    Ok(())
}

/// Save `doc` to `output_path` without ever leaving a partial file behind
///
/// The document is written to a temporary file next to the destination,
/// which is renamed into place once complete. Missing parent directories
/// are created.
pub fn save_document(doc: &mut Document, output_path: &Path) -> Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".logbook-maker-")
        .suffix(".pdf")
        .tempfile_in(dir)?;

    write_document(doc, BufWriter::new(temp.as_file_mut()))?;
    temp.as_file().sync_all()?;

    temp.persist(output_path).map_err(|e| Error::Persist {
        path: output_path.to_path_buf(),
        source: e.error,
    })?;

    debug!(path = %output_path.display(), "wrote output");
    Ok(())
}

/// Serialize `doc` into `writer`
///
/// Write failures surface as [`Error::Io`] rather than as PDF errors.
fn write_document<W: Write>(doc: &mut Document, mut writer: W) -> Result<()> {
    doc.save_to(&mut writer).map_err(Error::Io)?;
    writer.flush()?;
    Ok(())
}
