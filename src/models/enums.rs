use serde::{Deserialize, Serialize};

/// Raised when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {field} value: {value}")]
pub struct UnknownVariant {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Kinds of legal document the metadata extractor may report.
    DocumentType {
        PoliceComplaint => "police_complaint",
        CourtPetition => "court_petition",
        Affidavit => "affidavit",
        AdjournmentApplication => "adjournment_application",
        GovernmentRequest => "government_request",
        BailApplication => "bail_application",
        WrittenStatement => "written_statement",
        Other => "other",
    }
);

impl DocumentType {
    /// All eight values, in the order the metadata instruction lists them.
    pub fn all() -> &'static [DocumentType] {
        &[
            Self::PoliceComplaint,
            Self::CourtPetition,
            Self::Affidavit,
            Self::AdjournmentApplication,
            Self::GovernmentRequest,
            Self::BailApplication,
            Self::WrittenStatement,
            Self::Other,
        ]
    }

    /// Map any tag to a document type, treating unknown tags as `Other`.
    pub fn from_tag(tag: &str) -> Self {
        tag.trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_")
            .parse()
            .unwrap_or(Self::Other)
    }

    /// Human readable label used for PDF subject lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PoliceComplaint => "Police Complaint",
            Self::CourtPetition => "Court Petition",
            Self::Affidavit => "Affidavit",
            Self::AdjournmentApplication => "Adjournment Application",
            Self::GovernmentRequest => "Government Request",
            Self::BailApplication => "Bail Application",
            Self::WrittenStatement => "Written Statement",
            Self::Other => "Legal Document",
        }
    }
}

str_enum!(
    /// Language of generated drafts, explanations and the disclaimer block.
    OutputLanguage {
        English => "english",
        Hindi => "hindi",
    }
);

impl Default for OutputLanguage {
    fn default() -> Self {
        Self::English
    }
}

impl OutputLanguage {
    /// Accepts full names and ISO codes ("hi", "hin", "Hindi"); anything else is English.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "hindi" | "hi" | "hin" | "hi-in" => Self::Hindi,
            _ => Self::English,
        }
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
        }
    }
}

str_enum!(
    /// Target container format for rendered documents.
    ExportFormat {
        Docx => "docx",
        Pdf => "pdf",
    }
);

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pdf => "application/pdf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn document_type_round_trip() {
        for dt in DocumentType::all() {
            assert_eq!(DocumentType::from_str(dt.as_str()).unwrap(), *dt);
        }
    }

    #[test]
    fn document_type_has_eight_values() {
        assert_eq!(DocumentType::all().len(), 8);
    }

    #[test]
    fn unknown_document_type_is_an_error_for_from_str() {
        let err = DocumentType::from_str("divorce_petition").unwrap_err();
        assert_eq!(err.value, "divorce_petition");
        assert_eq!(err.field, "DocumentType");
    }

    #[test]
    fn from_tag_normalizes_and_falls_back() {
        assert_eq!(DocumentType::from_tag("Bail Application"), DocumentType::BailApplication);
        assert_eq!(DocumentType::from_tag("police-complaint"), DocumentType::PoliceComplaint);
        assert_eq!(DocumentType::from_tag("lease_deed"), DocumentType::Other);
    }

    #[test]
    fn document_type_serializes_as_snake_case() {
        let json = serde_json::to_string(&DocumentType::GovernmentRequest).unwrap();
        assert_eq!(json, "\"government_request\"");
    }

    #[test]
    fn output_language_from_tag() {
        assert_eq!(OutputLanguage::from_tag("hi"), OutputLanguage::Hindi);
        assert_eq!(OutputLanguage::from_tag("Hindi"), OutputLanguage::Hindi);
        assert_eq!(OutputLanguage::from_tag("english"), OutputLanguage::English);
        assert_eq!(OutputLanguage::from_tag("marathi"), OutputLanguage::English);
    }

    #[test]
    fn export_format_extension_and_mime() {
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
        assert_eq!(ExportFormat::Docx.extension(), "docx");
        assert!(ExportFormat::Docx.mime_type().contains("wordprocessingml"));
    }
}
