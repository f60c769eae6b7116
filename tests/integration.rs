//! Integration tests for the logbook maker library

mod common;

use common::{
    count_shown, page_ids, page_text, sample_document, write_password_protected_pdf,
    write_sample_pdf,
};
use logbook_maker::config::AnnotationConfig;
use logbook_maker::pdf::metadata::{info_entry, PRODUCER};
use logbook_maker::pdf::{annotate_pdf, PageAnnotator};
use logbook_maker::{Error, ErrorKind};
use lopdf::{dictionary, Document, Object};
use std::path::PathBuf;
use tempfile::TempDir;

fn annotate(doc: &Document, config: AnnotationConfig) -> Document {
    PageAnnotator::new(config)
        .expect("Invalid config")
        .annotate(doc)
        .expect("Failed to annotate")
}

#[test]
fn test_annotate_pdf_creates_watermarked_output() {
    for page_count in [1, 3] {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input = temp_dir.path().join("input.pdf");
        let output = temp_dir.path().join("output.pdf");
        write_sample_pdf(&input, page_count);

        let summary = annotate_pdf(&input, &output, &AnnotationConfig::new("CC-001"))
            .expect("Failed to annotate PDF");
        assert_eq!(summary.total_pages, page_count);
        assert_eq!(summary.annotated_pages, page_count);

        let doc = Document::load(&output).expect("Failed to load output");
        let pages = page_ids(&doc);
        assert_eq!(pages.len(), page_count);

        for (i, &page_id) in pages.iter().enumerate() {
            assert_eq!(count_shown(&doc, page_id, "Controlled Copy"), 1);
            assert_eq!(count_shown(&doc, page_id, "Copy No: CC-001"), 1);
            assert_eq!(
                count_shown(&doc, page_id, &format!("{} / {}", i + 1, page_count)),
                1,
                "page {} label missing",
                i + 1
            );
        }
    }
}

#[test]
fn test_max_pages_limits_processing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("input.pdf");
    let output = temp_dir.path().join("output.pdf");
    write_sample_pdf(&input, 4);

    let config = AnnotationConfig {
        max_pages: Some(2),
        total_pages: Some(5),
        ..AnnotationConfig::new("CC-002")
    };
    let summary = annotate_pdf(&input, &output, &config).expect("Failed to annotate PDF");
    assert_eq!(summary.annotated_pages, 2);

    let doc = Document::load(&output).expect("Failed to load output");
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 4);

    assert_eq!(count_shown(&doc, pages[0], "1 / 5"), 1);
    assert_eq!(count_shown(&doc, pages[0], "Copy No: CC-002"), 1);

    // Pages beyond the limit get no annotations
    assert_eq!(count_shown(&doc, pages[2], "Copy No: CC-002"), 0);
    assert_eq!(count_shown(&doc, pages[2], "3 / 5"), 0);
    assert_eq!(count_shown(&doc, pages[2], "Controlled Copy"), 0);
}

#[test]
fn test_first_five_of_twenty_pages() {
    let source = sample_document(20);
    let output = annotate(
        &source,
        AnnotationConfig {
            max_pages: Some(5),
            total_pages: Some(20),
            ..AnnotationConfig::new("CC-001")
        },
    );

    let source_pages = page_ids(&source);
    let output_pages = page_ids(&output);
    assert_eq!(source_pages, output_pages);

    for (i, &page_id) in output_pages.iter().enumerate().take(5) {
        assert_eq!(count_shown(&output, page_id, &format!("{} / 20", i + 1)), 1);
    }

    // Untouched suffix: same page dictionary, same content bytes
    for &page_id in &output_pages[5..] {
        assert_eq!(
            format!("{:?}", source.get_object(page_id).unwrap()),
            format!("{:?}", output.get_object(page_id).unwrap())
        );
        assert_eq!(page_text(&source, page_id), page_text(&output, page_id));
    }
}

#[test]
fn test_all_pages_when_max_omitted() {
    let output = annotate(&sample_document(7), AnnotationConfig::new("CC-003"));
    let pages = page_ids(&output);
    assert_eq!(count_shown(&output, pages[0], "1 / 7"), 1);
    assert_eq!(count_shown(&output, pages[6], "7 / 7"), 1);
}

#[test]
fn test_start_number_past_default_total() {
    let output = annotate(
        &sample_document(10),
        AnnotationConfig {
            start_number: 5,
            max_pages: Some(3),
            ..AnnotationConfig::new("CC-004")
        },
    );
    let pages = page_ids(&output);
    assert_eq!(count_shown(&output, pages[0], "5 / 3"), 1);
    assert_eq!(count_shown(&output, pages[1], "6 / 3"), 1);
    assert_eq!(count_shown(&output, pages[2], "7 / 3"), 1);
    assert_eq!(count_shown(&output, pages[3], "Copy No: CC-004"), 0);
}

#[test]
fn test_empty_copy_number_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("input.pdf");
    let output = temp_dir.path().join("output.pdf");
    write_sample_pdf(&input, 2);

    let result = annotate_pdf(&input, &output, &AnnotationConfig::new(""));
    let err = result.expect_err("Should fail with empty copy number");
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(!output.exists(), "No output should be written on failure");
}

#[test]
fn test_unknown_placeholder_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("input.pdf");
    let output = temp_dir.path().join("output.pdf");
    write_sample_pdf(&input, 2);

    let config = AnnotationConfig {
        page_label_template: "{number} / {pages}".to_string(),
        ..AnnotationConfig::new("CC-001")
    };
    let err = annotate_pdf(&input, &output, &config).expect_err("Should reject template");
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("pages"));
    assert!(!output.exists());
}

#[test]
fn test_zero_page_document_rejected() {
    let annotator = PageAnnotator::new(AnnotationConfig::new("CC-001")).unwrap();
    let err = annotator
        .annotate(&sample_document(0))
        .expect_err("Should fail with no pages");
    assert!(matches!(err, Error::EmptyDocument));
    assert_eq!(err.kind(), ErrorKind::Document);
}

#[test]
fn test_zero_page_file_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("empty.pdf");
    let output = temp_dir.path().join("output.pdf");
    write_sample_pdf(&input, 0);

    let err = annotate_pdf(&input, &output, &AnnotationConfig::new("CC-001")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Document);
    assert!(!output.exists());
}

#[test]
fn test_nonexistent_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = temp_dir.path().join("output.pdf");

    let result = annotate_pdf(
        &PathBuf::from("nonexistent.pdf"),
        &output,
        &AnnotationConfig::new("CC-001"),
    );
    assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    assert!(!output.exists());
}

#[test]
fn test_password_protected_input_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("protected.pdf");
    let output = temp_dir.path().join("output.pdf");
    write_password_protected_pdf(&input, 2);

    // Whether lopdf refuses the file or loads it still encrypted, it is a
    // document error and nothing is written
    let err = annotate_pdf(&input, &output, &AnnotationConfig::new("CC-001"))
        .expect_err("Should refuse a password-protected PDF");
    assert_eq!(err.kind(), ErrorKind::Document, "got: {err}");
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("input.pdf");
    let blocker = temp_dir.path().join("blocker");
    write_sample_pdf(&input, 1);
    std::fs::write(&blocker, b"not a directory").expect("Failed to write blocker file");
    let output = blocker.join("output.pdf");

    let err = annotate_pdf(&input, &output, &AnnotationConfig::new("CC-001"))
        .expect_err("Should fail to write under a regular file");
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!output.exists());
    assert_eq!(
        std::fs::read(&blocker).expect("blocker file"),
        b"not a directory".to_vec()
    );
    // Only the input and the blocking file remain, no temporary output
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
}

#[test]
fn test_source_document_not_mutated() {
    let source = sample_document(3);
    let object_count = source.objects.len();
    let before: Vec<String> = page_ids(&source)
        .iter()
        .map(|&id| page_text(&source, id))
        .collect();

    let _ = annotate(&source, AnnotationConfig::new("CC-001"));

    assert_eq!(source.objects.len(), object_count);
    let after: Vec<String> = page_ids(&source)
        .iter()
        .map(|&id| page_text(&source, id))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_annotated_pages_keep_original_content() {
    let output = annotate(&sample_document(2), AnnotationConfig::new("CC-001"));
    let pages = page_ids(&output);

    let text = page_text(&output, pages[1]);
    assert!(text.contains("(Original content on page 2)"));
    // Original content is bracketed so the overlay starts from a clean state
    assert!(text.starts_with("q\n"));
    let original = text.find("Original content").unwrap();
    let overlay = text.find("(Copy No: CC-001)").unwrap();
    assert!(original < overlay);
}

#[test]
fn test_reannotation_accumulates_overlays() {
    let config = AnnotationConfig::new("CC-001");
    let once = annotate(&sample_document(2), config.clone());
    let twice = annotate(&once, config);

    for page_id in page_ids(&twice) {
        assert_eq!(count_shown(&twice, page_id, "Copy No: CC-001"), 2);
        assert_eq!(count_shown(&twice, page_id, "Controlled Copy"), 2);
    }

    // The second run registers its fonts under fresh names
    let page = twice.get_object(page_ids(&twice)[0]).unwrap().as_dict().unwrap();
    let fonts = page
        .get(b"Resources")
        .and_then(Object::as_dict)
        .and_then(|r| r.get(b"Font"))
        .and_then(Object::as_dict)
        .unwrap();
    assert!(fonts.has(b"LbHelv"));
    assert!(fonts.has(b"LbHelv2"));
    assert!(fonts.has(b"F1"), "inherited font must survive");
}

#[test]
fn test_no_watermark() {
    let output = annotate(
        &sample_document(1),
        AnnotationConfig {
            watermark_text: String::new(),
            ..AnnotationConfig::new("CC-001")
        },
    );
    let page_id = page_ids(&output)[0];
    assert_eq!(count_shown(&output, page_id, "Controlled Copy"), 0);
    assert_eq!(count_shown(&output, page_id, "Copy No: CC-001"), 1);
    assert!(!page_text(&output, page_id).contains(" gs"));
}

#[test]
fn test_page_without_contents_and_rotation() {
    let mut doc = sample_document(1);
    let page_id = page_ids(&doc)[0];
    {
        let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
        page.remove(b"Contents");
        page.set("Rotate", 90);
    }

    let output = annotate(&doc, AnnotationConfig::new("CC-005"));
    let text = page_text(&output, page_id);
    assert!(text.contains("(Copy No: CC-005)"));
    assert!(text.contains("(1 / 1)"));
    assert!(!text.contains("Original content"));
}

#[test]
fn test_non_winansi_characters_replaced() {
    let output = annotate(
        &sample_document(1),
        AnnotationConfig {
            watermark_text: "管理 Copy".to_string(),
            ..AnnotationConfig::new("CC-006")
        },
    );
    let page_id = page_ids(&output)[0];
    assert_eq!(count_shown(&output, page_id, "?? Copy"), 1);
}

#[test]
fn test_output_metadata_stamped() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("input.pdf");
    let output = temp_dir.path().join("out").join("stamped.pdf");

    let mut source = sample_document(1);
    let info_id = source.add_object(dictionary! {
        "Title" => Object::string_literal("Shift Logbook"),
    });
    source.trailer.set("Info", info_id);
    source.save(&input).expect("Failed to write input");

    annotate_pdf(&input, &output, &AnnotationConfig::new("CC-001")).expect("Failed to annotate");

    let doc = Document::load(&output).expect("Failed to load output");
    assert_eq!(info_entry(&doc, b"Title").as_deref(), Some("Shift Logbook"));
    assert_eq!(info_entry(&doc, b"Producer").as_deref(), Some(PRODUCER));
    assert!(info_entry(&doc, b"ModDate").unwrap().starts_with("D:"));
}
