pub mod types;
pub mod format;
pub mod sanitize;
pub mod language_detect;
pub mod pdf;
pub mod page_images;
pub mod ocr;
pub mod speech;
pub mod orchestrator;

pub use types::*;
pub use format::*;
pub use sanitize::*;
pub use pdf::*;
pub use ocr::*;
pub use speech::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Extracted text is too short ({length} characters, at least {minimum} required)")]
    InsufficientText { length: usize, minimum: usize },

    #[error("Optical recognition failed: {0}")]
    OcrFailed(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    /// Text-layer failure. The orchestrator recovers from it by running OCR.
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
