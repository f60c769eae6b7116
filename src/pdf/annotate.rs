//! Page numbering and Controlled Copy watermarking
//!
//! Overlays are written directly into each page as an extra content stream.
//! The original content is bracketed by `q`/`Q` streams, so whatever
//! transformation the page leaves behind is undone before the overlay draws,
//! and the page's own streams are never rewritten.

use std::path::Path;

use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info, warn};

use crate::config::{AnnotationConfig, COPY_LABEL_PLACEHOLDERS, PAGE_LABEL_PLACEHOLDERS};
use crate::error::{Error, Result};
use crate::layout::{centered_x, PageBox, Rotation};
use crate::pdf::document::{load_document, save_document};
use crate::pdf::metadata::stamp_output_metadata;
use crate::pdf::text::{encode_win_ansi, StandardFont};
use crate::template::Template;

/// Guards against cyclic `/Parent` chains in malformed page trees
const MAX_TREE_DEPTH: usize = 64;

/// Baseline shift that vertically centers the watermark, as a fraction of its size
const WATERMARK_BASELINE_SHIFT: f32 = 0.35;

/// Labels drawn on one annotated page
#[derive(Debug, Clone, PartialEq)]
pub struct PageOverlay {
    /// Zero-based position of the page in the document
    pub page_index: usize,
    /// Number shown in the page label
    pub page_number: u64,
    pub copy_label: String,
    pub page_label: String,
}

/// Outcome of [`annotate_pdf`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationSummary {
    /// Pages in the output document
    pub total_pages: usize,
    /// Pages that received overlays
    pub annotated_pages: usize,
}

/// Stamps page labels, copy labels and a watermark onto a document
///
/// # Example
///
/// ```no_run
/// use logbook_maker::config::AnnotationConfig;
/// use logbook_maker::pdf::PageAnnotator;
///
/// let annotator = PageAnnotator::new(AnnotationConfig {
///     max_pages: Some(5),
///     total_pages: Some(20),
///     ..AnnotationConfig::new("CC-001")
/// })?;
/// let source = lopdf::Document::load("logbook.pdf")?;
/// let mut annotated = annotator.annotate(&source)?;
/// annotated.save("logbook-cc-001.pdf")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct PageAnnotator {
    config: AnnotationConfig,
    copy_label: Template,
    page_label: Template,
}

impl PageAnnotator {
    /// Validate `config` and parse its templates
    pub fn new(config: AnnotationConfig) -> Result<Self> {
        config.validate()?;
        let copy_label = Template::parse(&config.copy_label_template, COPY_LABEL_PLACEHOLDERS)?;
        let page_label = Template::parse(&config.page_label_template, PAGE_LABEL_PLACEHOLDERS)?;

        Ok(Self {
            config,
            copy_label,
            page_label,
        })
    }

    /// How many leading pages of a `page_count`-page document get overlays
    pub fn annotated_count(&self, page_count: usize) -> usize {
        match self.config.max_pages {
            Some(max) => (max as usize).min(page_count),
            None => page_count,
        }
    }

    /// Labels for every annotated page of a `page_count`-page document
    pub fn plan(&self, page_count: usize) -> Vec<PageOverlay> {
        let n = self.annotated_count(page_count);
        let total = self
            .config
            .total_pages
            .map(u64::from)
            .unwrap_or(n as u64)
            .to_string();
        let copy_label = self
            .copy_label
            .render(&[("copy_number", self.config.copy_number.as_str())]);

        (0..n)
            .map(|i| {
                let page_number = u64::from(self.config.start_number) + i as u64;
                let number = page_number.to_string();
                PageOverlay {
                    page_index: i,
                    page_number,
                    copy_label: copy_label.clone(),
                    page_label: self
                        .page_label
                        .render(&[("number", number.as_str()), ("total", total.as_str())]),
                }
            })
            .collect()
    }

    fn draws_watermark(&self) -> bool {
        !self.config.watermark_text.trim().is_empty()
    }

    /// Return an annotated copy of `source`; `source` itself is left untouched
    ///
    /// Pages past the annotated prefix keep their original dictionaries and
    /// content streams.
    pub fn annotate(&self, source: &Document) -> Result<Document> {
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(Error::EmptyDocument);
        }

        let mut doc = source.clone();
        let plan = self.plan(page_ids.len());
        let Some(first) = plan.first() else {
            return Ok(doc);
        };

        let shared = SharedResources::add_to(&mut doc, &self.config, self.draws_watermark());
        let copy_label = encode_label("copy label", &first.copy_label);
        let watermark = self
            .draws_watermark()
            .then(|| encode_label("watermark", &self.config.watermark_text));

        for overlay in &plan {
            let page_label = if overlay.page_index == 0 {
                encode_label("page label", &overlay.page_label)
            } else {
                encode_win_ansi(&overlay.page_label).bytes
            };

            let labels = EncodedLabels {
                copy_label: &copy_label,
                page_label: &page_label,
                watermark: watermark.as_deref(),
            };
            self.annotate_page(&mut doc, page_ids[overlay.page_index], &labels, &shared)?;

            debug!(
                page = overlay.page_index + 1,
                label = %overlay.page_label,
                "annotated page"
            );
        }

        info!(
            annotated = plan.len(),
            total = page_ids.len(),
            copy_number = %self.config.copy_number,
            "annotated document"
        );

        Ok(doc)
    }

    fn annotate_page(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        labels: &EncodedLabels<'_>,
        shared: &SharedResources,
    ) -> Result<()> {
        let page_box = page_box(doc, page_id);

        // Copy inherited resources down so only this page sees our entries
        let mut resources = effective_resources(doc, page_id);
        let mut fonts = sub_dictionary(doc, &resources, b"Font");
        let regular = unique_name(&fonts, "LbHelv");
        fonts.set(regular.as_bytes(), Object::Reference(shared.regular_font));
        let bold = unique_name(&fonts, "LbHelvBold");
        fonts.set(bold.as_bytes(), Object::Reference(shared.bold_font));
        resources.set("Font", Object::Dictionary(fonts));

        let gs_name = match shared.watermark_state {
            Some(gs_id) => {
                let mut states = sub_dictionary(doc, &resources, b"ExtGState");
                let state_name = unique_name(&states, "LbWatermark");
                states.set(state_name.as_bytes(), Object::Reference(gs_id));
                resources.set("ExtGState", Object::Dictionary(states));
                Some(state_name)
            }
            None => None,
        };

        let names = ResourceNames {
            regular: &regular,
            bold: &bold,
            watermark_state: gs_name.as_deref(),
        };
        let content = self.overlay_content(&page_box, labels, &names);
        let mut stream = Stream::new(Dictionary::new(), content.encode()?);
        stream.compress()?;
        let overlay_id = doc.add_object(stream);

        let contents = existing_contents(doc, page_id)?;
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", wrap_contents(contents, shared, overlay_id));

        Ok(())
    }

    /// Content operators for one page, in the page's visible coordinate system
    fn overlay_content(
        &self,
        page_box: &PageBox,
        labels: &EncodedLabels<'_>,
        names: &ResourceNames<'_>,
    ) -> Content {
        let style = &self.config.style;
        let (width, height) = page_box.visible_size();
        let margin = style.margin.pt() as f32;
        let mut ops = Vec::new();

        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("cm", reals(&page_box.visible_to_user())));

        // Watermark first, so the labels stay legible on top of it
        if let (Some(text), Some(gs)) = (labels.watermark, names.watermark_state) {
            let size = width.min(height) * style.watermark_size_ratio;
            let text_width = StandardFont::HelveticaBold.text_width(text, size);
            let (sin, cos) = style.watermark_angle.to_radians().sin_cos();

            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("gs", vec![name(gs)]));
            ops.push(Operation::new("g", vec![Object::Real(style.watermark_gray)]));
            ops.push(Operation::new(
                "cm",
                reals(&[cos, sin, -sin, cos, width / 2.0, height / 2.0]),
            ));
            ops.extend(show_text(
                names.bold,
                size,
                -text_width / 2.0,
                -size * WATERMARK_BASELINE_SHIFT,
                text,
            ));
            ops.push(Operation::new("Q", vec![]));
        }

        ops.push(Operation::new("g", vec![Object::Real(style.label_gray)]));

        let size = style.copy_label_font_size;
        let text_width = StandardFont::HelveticaBold.text_width(labels.copy_label, size);
        ops.extend(show_text(
            names.bold,
            size,
            centered_x(width, text_width),
            height - margin,
            labels.copy_label,
        ));

        let size = style.page_label_font_size;
        let text_width = StandardFont::Helvetica.text_width(labels.page_label, size);
        ops.extend(show_text(
            names.regular,
            size,
            centered_x(width, text_width),
            margin / 2.0,
            labels.page_label,
        ));

        ops.push(Operation::new("Q", vec![]));

        Content { operations: ops }
    }
}

/// Annotate a PDF file and write the result
///
/// The configuration is validated before the input is opened, and the output
/// only appears once it has been written completely.
///
/// # Example
///
/// ```no_run
/// use logbook_maker::config::AnnotationConfig;
/// use logbook_maker::pdf::annotate_pdf;
/// use std::path::Path;
///
/// let summary = annotate_pdf(
///     Path::new("logbook.pdf"),
///     Path::new("logbook-cc-001.pdf"),
///     &AnnotationConfig::new("CC-001"),
/// ).expect("Failed to annotate");
/// println!("{} of {} pages annotated", summary.annotated_pages, summary.total_pages);
/// ```
pub fn annotate_pdf(
    input_path: &Path,
    output_path: &Path,
    config: &AnnotationConfig,
) -> Result<AnnotationSummary> {
    let annotator = PageAnnotator::new(config.clone())?;

    let source = load_document(input_path)?;
    let mut output = annotator.annotate(&source)?;
    drop(source);

    let total_pages = output.get_pages().len();
    let summary = AnnotationSummary {
        total_pages,
        annotated_pages: annotator.annotated_count(total_pages),
    };

    stamp_output_metadata(&mut output, Local::now().into())?;
    save_document(&mut output, output_path)?;

    Ok(summary)
}

/// Objects shared by every annotated page of one run
struct SharedResources {
    regular_font: ObjectId,
    bold_font: ObjectId,
    watermark_state: Option<ObjectId>,
    save_state: ObjectId,
    restore_state: ObjectId,
}

impl SharedResources {
    fn add_to(doc: &mut Document, config: &AnnotationConfig, watermark: bool) -> Self {
        let regular_font = doc.add_object(standard_font(StandardFont::Helvetica));
        let bold_font = doc.add_object(standard_font(StandardFont::HelveticaBold));

        let watermark_state = watermark.then(|| {
            let opacity = config.style.watermark_opacity;
            doc.add_object(dictionary! {
                "Type" => "ExtGState",
                "ca" => Object::Real(opacity),
                "CA" => Object::Real(opacity),
            })
        });

        let save_state = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_state = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

        Self {
            regular_font,
            bold_font,
            watermark_state,
            save_state,
            restore_state,
        }
    }
}

struct EncodedLabels<'a> {
    copy_label: &'a [u8],
    page_label: &'a [u8],
    watermark: Option<&'a [u8]>,
}

struct ResourceNames<'a> {
    regular: &'a str,
    bold: &'a str,
    watermark_state: Option<&'a str>,
}

/// Non-embedded Type1 font with WinAnsiEncoding
fn standard_font(font: StandardFont) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn encode_label(kind: &str, text: &str) -> Vec<u8> {
    let encoded = encode_win_ansi(text);
    if encoded.replaced > 0 {
        warn!(
            replaced = encoded.replaced,
            "{} \"{}\" has characters outside WinAnsi; they are drawn as '?'",
            kind,
            text
        );
    }
    encoded.bytes
}

fn show_text(font: &str, size: f32, x: f32, y: f32, text: &[u8]) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![name(font), Object::Real(size)]),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(text.to_vec(), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|&v| Object::Real(v)).collect()
}

/// Follow indirect references to the object they point at
fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> Option<&'a Object> {
    for _ in 0..MAX_TREE_DEPTH {
        match object {
            Object::Reference(id) => object = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Look up a page attribute, walking up the page tree for inherited values
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn as_f32(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let rotation = inherited(doc, page_id, b"Rotate")
        .and_then(|r| r.as_i64().ok())
        .map(Rotation::from_degrees)
        .unwrap_or_default();

    let media_box = match page_rect(doc, page_id, b"MediaBox") {
        Some(rect) => PageBox::new(rect, rotation),
        None => {
            warn!(?page_id, "page has no usable MediaBox, assuming US Letter");
            PageBox {
                rotation,
                ..PageBox::letter()
            }
        }
    };

    // Viewers only show the CropBox, so keep the labels inside it
    match page_rect(doc, page_id, b"CropBox") {
        Some(crop) => media_box.clipped_to(crop),
        None => media_box,
    }
}

/// An inherited rectangle entry such as `/MediaBox`, as four numbers
fn page_rect(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
    let array = inherited(doc, page_id, key)?.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(array) {
        *slot = as_f32(resolve(doc, value)?)?;
    }
    Some(rect)
}

/// The page's resources, inherited or its own, as an owned dictionary
fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited(doc, page_id, b"Resources")
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

fn sub_dictionary(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

/// Pick a resource name that is not already taken in `dict`
fn unique_name(dict: &Dictionary, base: &str) -> String {
    if !dict.has(base.as_bytes()) {
        return base.to_string();
    }
    let mut i = 2;
    loop {
        let candidate = format!("{}{}", base, i);
        if !dict.has(candidate.as_bytes()) {
            return candidate;
        }
        i += 1;
    }
}

/// The page's content stream references, flattening an indirect array
fn existing_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_object(page_id)?.as_dict()?;
    let contents = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    Ok(contents)
}

/// `q <original> Q <overlay>`, or just the overlay for a page with no content
fn wrap_contents(existing: Vec<Object>, shared: &SharedResources, overlay_id: ObjectId) -> Object {
    if existing.is_empty() {
        return Object::Reference(overlay_id);
    }

    let mut contents = Vec::with_capacity(existing.len() + 3);
    contents.push(Object::Reference(shared.save_state));
    contents.extend(existing);
    contents.push(Object::Reference(shared.restore_state));
    contents.push(Object::Reference(overlay_id));
    Object::Array(contents)
}
