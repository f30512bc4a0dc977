//! Media kind detection for source artifacts.
//!
//! Magic bytes are checked first. When they are inconclusive the file
//! extension decides, against the same allow-lists the upload forms accept.

use std::path::Path;

use super::types::MediaKind;
use super::ExtractionError;

pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "ogg", "webm"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tiff"];
pub const TEXT_EXTENSIONS: &[&str] = &["txt"];

pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024; // 25MB
pub const MAX_DOCUMENT_BYTES: usize = 15 * 1024 * 1024; // 15MB

/// Map a declared MIME type to a media kind.
pub fn media_kind_from_mime(mime: &str) -> MediaKind {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/pdf" => MediaKind::Pdf,
        "image/png" | "image/jpeg" | "image/jpg" | "image/tiff" => MediaKind::Image,
        "text/plain" => MediaKind::PlainText,
        // Browsers record dictation as audio/webm or video/webm.
        "video/webm" => MediaKind::Audio,
        m if m.starts_with("audio/") => MediaKind::Audio,
        _ => MediaKind::Unsupported,
    }
}

/// Map a file name to a media kind by extension.
pub fn media_kind_from_extension(file_name: &str) -> MediaKind {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Audio
    } else if ext == "pdf" {
        MediaKind::Pdf
    } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Image
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::PlainText
    } else {
        MediaKind::Unsupported
    }
}

/// Detect the media kind from magic bytes, falling back to the file extension.
pub fn detect_media_kind(file_name: Option<&str>, bytes: &[u8]) -> MediaKind {
    if let Some(kind) = sniff_magic(bytes) {
        return kind;
    }

    match file_name.map(media_kind_from_extension) {
        Some(kind) if kind != MediaKind::Unsupported => kind,
        _ if is_likely_text(bytes) => MediaKind::PlainText,
        _ => MediaKind::Unsupported,
    }
}

fn sniff_magic(bytes: &[u8]) -> Option<MediaKind> {
    let kind = match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => MediaKind::Pdf,
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => MediaKind::Image,
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => MediaKind::Image,
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => MediaKind::Image,
        // WAV: RIFF....WAVE
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => MediaKind::Audio,
        // OGG
        [b'O', b'g', b'g', b'S', ..] => MediaKind::Audio,
        // MP3 with ID3 tag
        [b'I', b'D', b'3', ..] => MediaKind::Audio,
        // WebM / Matroska EBML header
        [0x1A, 0x45, 0xDF, 0xA3, ..] => MediaKind::Audio,
        // M4A: ISO base media with an audio brand
        [_, _, _, _, b'f', b't', b'y', b'p', b'M', b'4', b'A', ..] => MediaKind::Audio,
        _ => return None,
    };
    Some(kind)
}

/// Valid UTF-8 and mostly printable.
fn is_likely_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    let total = text.chars().count();
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable as f64 / total as f64 > 0.80
}

/// Enforce the per-kind upload size limit.
pub fn check_size_limit(kind: MediaKind, size: usize) -> Result<(), ExtractionError> {
    let limit = match kind {
        MediaKind::Audio => MAX_AUDIO_BYTES,
        MediaKind::Pdf | MediaKind::Image | MediaKind::PlainText => MAX_DOCUMENT_BYTES,
        MediaKind::Unsupported => return Ok(()),
    };
    if size > limit {
        return Err(ExtractionError::UnsupportedFormat(format!(
            "{} file of {} bytes exceeds the {} MB limit",
            kind.as_str(),
            size,
            limit / (1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_pdf_from_magic_bytes() {
        assert_eq!(detect_media_kind(None, b"%PDF-1.4\n"), MediaKind::Pdf);
    }

    #[test]
    fn detect_jpeg_and_png_from_magic_bytes() {
        assert_eq!(detect_media_kind(None, &[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), MediaKind::Image);
        assert_eq!(
            detect_media_kind(None, &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            MediaKind::Image
        );
    }

    #[test]
    fn detect_wav_from_magic_bytes() {
        let header = b"RIFF\x24\x00\x00\x00WAVEfmt ";
        assert_eq!(detect_media_kind(Some("note.bin"), header), MediaKind::Audio);
    }

    #[test]
    fn magic_bytes_win_over_extension() {
        assert_eq!(detect_media_kind(Some("scan.jpg"), b"%PDF-1.7"), MediaKind::Pdf);
    }

    #[test]
    fn extension_used_when_magic_unknown() {
        assert_eq!(detect_media_kind(Some("dictation.m4a"), &[0, 1, 2, 3]), MediaKind::Audio);
        assert_eq!(detect_media_kind(Some("scan.TIFF"), &[0, 1, 2, 3]), MediaKind::Image);
    }

    #[test]
    fn unknown_binary_is_unsupported() {
        assert_eq!(
            detect_media_kind(Some("archive.zip"), &[0x50, 0x4B, 0x03, 0x04, 0xFF, 0x00]),
            MediaKind::Unsupported
        );
    }

    #[test]
    fn utf8_without_extension_is_plain_text() {
        let text = "माननीय न्यायालय के समक्ष प्रार्थना पत्र".as_bytes();
        assert_eq!(detect_media_kind(None, text), MediaKind::PlainText);
    }

    #[test]
    fn docx_extension_is_unsupported() {
        assert_eq!(media_kind_from_extension("draft.docx"), MediaKind::Unsupported);
    }

    #[test]
    fn mime_mapping() {
        assert_eq!(media_kind_from_mime("application/pdf"), MediaKind::Pdf);
        assert_eq!(media_kind_from_mime("audio/webm;codecs=opus"), MediaKind::Audio);
        assert_eq!(media_kind_from_mime("video/webm"), MediaKind::Audio);
        assert_eq!(media_kind_from_mime("image/tiff"), MediaKind::Image);
        assert_eq!(media_kind_from_mime("text/plain; charset=utf-8"), MediaKind::PlainText);
        assert_eq!(media_kind_from_mime("application/msword"), MediaKind::Unsupported);
    }

    #[test]
    fn size_limits_per_kind() {
        assert!(check_size_limit(MediaKind::Audio, MAX_AUDIO_BYTES).is_ok());
        assert!(check_size_limit(MediaKind::Audio, MAX_AUDIO_BYTES + 1).is_err());
        assert!(check_size_limit(MediaKind::Pdf, 20 * 1024 * 1024).is_err());
        assert!(check_size_limit(MediaKind::Image, 1024).is_ok());
    }

    #[test]
    fn oversized_document_reports_unsupported_format() {
        let err = check_size_limit(MediaKind::Image, MAX_DOCUMENT_BYTES + 1).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("15 MB"));
    }
}
