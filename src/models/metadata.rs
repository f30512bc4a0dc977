//! Structured legal metadata extracted from free-form dictation.
//!
//! Every field is optional. The completion service is asked to emit `null`
//! for anything it cannot find, and absence is never an error here.

use serde::{Deserialize, Deserializer, Serialize};

use super::enums::DocumentType;

/// Fixed-schema record of legal facts derived from a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredMetadata {
    #[serde(default, deserialize_with = "lenient_document_type")]
    pub document_type: Option<DocumentType>,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub applicant_father_name: Option<String>,
    #[serde(default)]
    pub applicant_address: Option<String>,
    #[serde(default)]
    pub respondent_name: Option<String>,
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "free_text_list")]
    pub key_facts: Vec<String>,
    #[serde(default, deserialize_with = "free_text_list")]
    pub sections_cited: Vec<String>,
    #[serde(default, deserialize_with = "free_text_list")]
    pub dates_mentioned: Vec<String>,
    #[serde(default)]
    pub relief_sought: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl StructuredMetadata {
    /// The keys the completion service must return, in schema order.
    pub const KEYS: [&'static str; 13] = [
        "document_type",
        "applicant_name",
        "applicant_father_name",
        "applicant_address",
        "respondent_name",
        "authority",
        "subject",
        "key_facts",
        "sections_cited",
        "dates_mentioned",
        "relief_sought",
        "district",
        "state",
    ];

    /// Title for rendered output: the subject line when present.
    pub fn title(&self) -> Option<&str> {
        self.subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Number of populated fields, for logging.
    pub fn populated_fields(&self) -> usize {
        let scalars = [
            &self.applicant_name,
            &self.applicant_father_name,
            &self.applicant_address,
            &self.respondent_name,
            &self.authority,
            &self.subject,
            &self.relief_sought,
            &self.district,
            &self.state,
        ];
        scalars.iter().filter(|f| f.is_some()).count()
            + usize::from(self.document_type.is_some())
            + usize::from(!self.key_facts.is_empty())
            + usize::from(!self.sections_cited.is_empty())
            + usize::from(!self.dates_mentioned.is_empty())
    }
}

/// Unknown tags map to `DocumentType::Other`; `null` stays `None`.
fn lenient_document_type<'de, D>(deserializer: D) -> Result<Option<DocumentType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| DocumentType::from_tag(&s)))
}

/// Accepts `null`, a single string, or an array whose items are strings,
/// numbers or small objects (e.g. `{"date": "5 Jan", "context": "incident"}`),
/// flattening every item to one line of text.
fn free_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(vec![]),
        Value::String(s) => Ok(non_empty(s).into_iter().collect()),
        Value::Array(items) => Ok(items.into_iter().filter_map(flatten_item).collect()),
        other => Err(D::Error::custom(format!(
            "expected a list of strings, got {}",
            json_kind(&other)
        ))),
    }
}

fn flatten_item(value: serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => {
            let parts: Vec<String> = map
                .into_iter()
                .filter_map(|(k, v)| flatten_item(v).map(|v| format!("{k}: {v}")))
                .collect();
            non_empty(parts.join("; "))
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(flatten_item).collect();
            non_empty(parts.join(", "))
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_null_record_is_valid() {
        let json = r#"{
            "document_type": null, "applicant_name": null, "applicant_father_name": null,
            "applicant_address": null, "respondent_name": null, "authority": null,
            "subject": null, "key_facts": null, "sections_cited": null,
            "dates_mentioned": null, "relief_sought": null, "district": null, "state": null
        }"#;
        let meta: StructuredMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta, StructuredMetadata::default());
        assert_eq!(meta.populated_fields(), 0);
    }

    #[test]
    fn missing_keys_default_to_none() {
        let meta: StructuredMetadata = serde_json::from_str(r#"{"district": "Barabanki"}"#).unwrap();
        assert_eq!(meta.district.as_deref(), Some("Barabanki"));
        assert!(meta.applicant_name.is_none());
        assert!(meta.key_facts.is_empty());
    }

    #[test]
    fn police_complaint_record_parses() {
        let json = r#"{
            "document_type": "police_complaint",
            "applicant_name": "राजेश कुमार",
            "respondent_name": "सुरेश यादव",
            "authority": "SHO, थाना सिविल लाइन्स",
            "sections_cited": ["323 IPC", "452 IPC", "380 IPC"],
            "district": "बाराबंकी",
            "state": "उत्तर प्रदेश",
            "relief_sought": "FIR registration and action"
        }"#;
        let meta: StructuredMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.document_type, Some(DocumentType::PoliceComplaint));
        assert_eq!(meta.sections_cited.len(), 3);
        assert_eq!(meta.applicant_name.as_deref(), Some("राजेश कुमार"));
    }

    #[test]
    fn unknown_document_type_becomes_other() {
        let meta: StructuredMetadata =
            serde_json::from_str(r#"{"document_type": "legal_notice"}"#).unwrap();
        assert_eq!(meta.document_type, Some(DocumentType::Other));
    }

    #[test]
    fn dates_with_context_objects_are_flattened() {
        let json = r#"{"dates_mentioned": [
            {"date": "5 January 2025", "context": "incident"},
            "10 January 2025",
            null
        ]}"#;
        let meta: StructuredMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(
            meta.dates_mentioned,
            vec!["context: incident; date: 5 January 2025", "10 January 2025"]
        );
    }

    #[test]
    fn single_string_list_is_accepted() {
        let meta: StructuredMetadata =
            serde_json::from_str(r#"{"key_facts": "Neighbour broke into the house"}"#).unwrap();
        assert_eq!(meta.key_facts, vec!["Neighbour broke into the house"]);
    }

    #[test]
    fn numeric_list_field_is_rejected() {
        let result: Result<StructuredMetadata, _> = serde_json::from_str(r#"{"key_facts": 42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn title_ignores_blank_subject() {
        let meta = StructuredMetadata {
            subject: Some("   ".into()),
            ..Default::default()
        };
        assert!(meta.title().is_none());
    }
}
