//! Embedded page-image extraction for scanned PDFs.
//!
//! Vision models take images, not PDFs. A scanned PDF is almost always one
//! JPEG (DCTDecode) XObject per page, which is already a complete JPEG file
//! and is handed to the OCR engine as-is.

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::ExtractionError;

/// Largest encoded image of every page, in page order.
/// Pages without a usable image are skipped.
pub fn extract_page_images(pdf_bytes: &[u8]) -> Result<Vec<Vec<u8>>, ExtractionError> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| ExtractionError::OcrFailed(format!("Failed to parse PDF: {e}")))?;

    let page_ids: Vec<ObjectId> = doc.page_iter().collect();
    let mut images = Vec::with_capacity(page_ids.len());

    for (index, page_id) in page_ids.into_iter().enumerate() {
        match largest_page_image(&doc, page_id) {
            Some(bytes) => {
                tracing::debug!(page = index + 1, size = bytes.len(), "Extracted page image");
                images.push(bytes);
            }
            None => tracing::debug!(page = index + 1, "No encoded image on page"),
        }
    }

    Ok(images)
}

/// Walks: page dict → /Resources → /XObject → /Subtype /Image entries.
fn largest_page_image(doc: &Document, page_id: ObjectId) -> Option<Vec<u8>> {
    let page_dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    let resources = resolve_dict_entry(doc, page_dict, b"Resources")?;
    let xobjects = resolve_dict_entry(doc, resources, b"XObject")?;

    xobjects
        .iter()
        .filter_map(|(_name, obj)| match resolve_object(doc, obj) {
            Object::Stream(stream) if is_image_subtype(&stream.dict) => encoded_image(stream),
            _ => None,
        })
        .max_by_key(Vec::len)
}

fn is_image_subtype(dict: &Dictionary) -> bool {
    dict.get(b"Subtype")
        .map(|obj| matches!(obj, Object::Name(ref n) if n == b"Image"))
        .unwrap_or(false)
}

/// JPEG bytes for DCTDecode streams, or stream content that is already a
/// PNG/JPEG/TIFF file. Raw pixel data is not re-encoded.
fn encoded_image(stream: &lopdf::Stream) -> Option<Vec<u8>> {
    let is_dct = stream
        .dict
        .get(b"Filter")
        .map(|f| match f {
            Object::Name(n) => n == b"DCTDecode",
            Object::Array(arr) => arr
                .iter()
                .any(|o| matches!(o, Object::Name(ref n) if n == b"DCTDecode")),
            _ => false,
        })
        .unwrap_or(false);

    if is_dct {
        // Only DCTDecode alone leaves the raw stream as a JPEG file.
        return Some(
            stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
        );
    }

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    is_encoded_image(&content).then_some(content)
}

fn is_encoded_image(bytes: &[u8]) -> bool {
    matches!(
        bytes,
        [0xFF, 0xD8, 0xFF, ..]
            | [0x89, 0x50, 0x4E, 0x47, ..]
            | [0x49, 0x49, 0x2A, 0x00, ..]
            | [0x4D, 0x4D, 0x00, 0x2A, ..]
    )
}

/// Resolve a PDF object reference to its target, or return the object as-is.
fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn resolve_dict_entry<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    let obj = dict.get(key).ok()?;
    resolve_object(doc, obj).as_dict().ok()
}
