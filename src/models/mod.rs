pub mod enums;
pub mod metadata;

pub use enums::{DocumentType, ExportFormat, OutputLanguage, UnknownVariant};
pub use metadata::StructuredMetadata;
