//! Document information dictionary

use chrono::{DateTime, FixedOffset};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::error::Result;

/// Producer string written into annotated output
pub const PRODUCER: &str = concat!("logbook-maker ", env!("CARGO_PKG_VERSION"));

/// Format a timestamp as a PDF date string, e.g. `D:20261016093000+02'00'`
pub fn pdf_date(time: &DateTime<FixedOffset>) -> String {
    let offset = time.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.abs() / 60;
    format!(
        "{}{}{:02}'{:02}'",
        time.format("D:%Y%m%d%H%M%S"),
        sign,
        minutes / 60,
        minutes % 60
    )
}

/// Set `ModDate` and `Producer` in the Info dictionary, keeping other entries
///
/// Creates the Info dictionary if the document has none.
pub fn stamp_output_metadata(doc: &mut Document, now: DateTime<FixedOffset>) -> Result<()> {
    let mod_date = Object::String(pdf_date(&now).into_bytes(), StringFormat::Literal);
    let producer = Object::String(PRODUCER.as_bytes().to_vec(), StringFormat::Literal);

    let info_ref = doc.trailer.get(b"Info").ok().cloned();
    match info_ref {
        Some(Object::Reference(info_id)) => {
            let info = doc.get_object_mut(info_id)?.as_dict_mut()?;
            info.set("ModDate", mod_date);
            info.set("Producer", producer);
        }
        Some(Object::Dictionary(mut info)) => {
            info.set("ModDate", mod_date);
            info.set("Producer", producer);
            doc.trailer.set("Info", Object::Dictionary(info));
        }
        _ => {
            let mut info = Dictionary::new();
            info.set("ModDate", mod_date);
            info.set("Producer", producer);
            let info_id = doc.add_object(Object::Dictionary(info));
            doc.trailer.set("Info", Object::Reference(info_id));
        }
    }

    Ok(())
}

/// Read a text entry such as `Title` from the Info dictionary
pub fn info_entry(doc: &Document, key: &[u8]) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let bytes = info.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}
