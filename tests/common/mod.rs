//! Shared fixtures: small PDFs generated with lopdf

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Build an A4 document whose pages each say "Original content on page N"
///
/// Resources and MediaBox live on the Pages node, so every page inherits them.
pub fn sample_document(page_count: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 0..page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 14.into()]),
                Operation::new("Td", vec![72.into(), 800.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Original content on page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write a sample document to `path`
pub fn write_sample_pdf(path: &Path, page_count: usize) {
    let mut doc = sample_document(page_count);
    doc.save(path).expect("Failed to write sample PDF");
}

/// Write a sample document protected by a user password
///
/// The trailer carries a Standard security handler (RC4, 40-bit) whose
/// password hashes do not match the empty password, so a reader cannot open
/// the file without credentials.
pub fn write_password_protected_pdf(path: &Path, page_count: usize) {
    let mut doc = sample_document(page_count);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "P" => -44,
        "O" => Object::String(vec![0x4f; 32], lopdf::StringFormat::Hexadecimal),
        "U" => Object::String(vec![0x55; 32], lopdf::StringFormat::Hexadecimal),
    });
    let file_id = Object::String(vec![0x1d; 16], lopdf::StringFormat::Hexadecimal);
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);
    doc.save(path).expect("Failed to write protected PDF");
}

/// Page object IDs in document order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Decoded content of one page, all content streams concatenated
pub fn page_text(doc: &Document, page_id: ObjectId) -> String {
    let bytes = doc.get_page_content(page_id).expect("Failed to read page content");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Number of times `needle` appears as a shown string on the page
pub fn count_shown(doc: &Document, page_id: ObjectId, needle: &str) -> usize {
    page_text(doc, page_id)
        .matches(&format!("({})", needle))
        .count()
}
