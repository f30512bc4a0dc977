use serde_json::json;

use crate::models::{DocumentType, OutputLanguage, StructuredMetadata};

pub const METADATA_TEMPERATURE: f32 = 0.1;
pub const EXPLANATION_TEMPERATURE: f32 = 0.2;
pub const EXPLANATION_MAX_TOKENS: u32 = 3000;

pub const METADATA_SYSTEM_PROMPT: &str = r#"You are a legal metadata extraction assistant for Indian courts and government offices.
Extract structured information from the following Hindi/English legal dictation transcript.
Return a JSON object with these fields:
- document_type: one of ["police_complaint", "court_petition", "affidavit", "adjournment_application", "government_request", "bail_application", "written_statement", "other"]
- applicant_name: name of the person filing
- applicant_father_name: father's/husband's name if mentioned
- applicant_address: full address if mentioned
- respondent_name: opposing party or authority name
- authority: court/office/authority being addressed
- subject: brief subject line for the document
- key_facts: array of key factual points mentioned
- sections_cited: any legal sections mentioned (IPC, CrPC, BNS, etc.)
- dates_mentioned: any dates mentioned with context
- relief_sought: what the applicant wants
- district: district name if mentioned
- state: state name if mentioned

If a field is not found in the transcript, use null.
Return ONLY valid JSON, no markdown."#;

/// JSON schema handed to the completion service's structured-output mode.
pub fn metadata_schema() -> serde_json::Value {
    let nullable_string = json!({"type": ["string", "null"]});
    let nullable_list = json!({"type": ["array", "null"], "items": {"type": "string"}});
    let mut document_types: Vec<serde_json::Value> =
        DocumentType::all().iter().map(|t| json!(t.as_str())).collect();
    document_types.push(serde_json::Value::Null);

    let mut properties = serde_json::Map::new();
    for key in StructuredMetadata::KEYS {
        let schema = match key {
            "document_type" => json!({"type": ["string", "null"], "enum": document_types.clone()}),
            "key_facts" | "sections_cited" | "dates_mentioned" => nullable_list.clone(),
            _ => nullable_string.clone(),
        };
        properties.insert(key.to_string(), schema);
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": StructuredMetadata::KEYS,
    })
}

// ──────────────────────────────────────────────
// Explanation
// ──────────────────────────────────────────────

/// The six mandated headings, in order. Section parsing anchors on these.
pub const EXPLANATION_HEADINGS: [&str; 6] = [
    "## 1. WHAT THIS DOCUMENT IS ABOUT",
    "## 2. IMPORTANT POINTS",
    "## 3. DIRECTIONS / ORDERS",
    "## 4. DEADLINES AND DATES",
    "## 5. NEXT PROCEDURAL STEPS",
    "## 6. DISCLAIMER",
];

pub const EXPLANATION_DISCLAIMER: &str = "This explanation is AI-generated and is meant to assist in understanding the document. It does not constitute legal advice. Always consult a qualified advocate before taking any legal action based on this explanation.";

pub fn explanation_system_prompt(language: OutputLanguage) -> String {
    format!(
        r#"You are a legal document analyst specializing in Indian law. Your job is to read legal/court documents and explain them in simple, clear {language} that a common person or a junior lawyer in a small Indian town can understand.

You MUST structure your response in exactly these 6 sections using the exact headings below:

{h1}
Explain in 2-3 simple sentences what this document is: what type of document it is (court order, petition, notice, FIR, etc.), which court/authority issued it, between whom, and the case number if available.

{h2}
List the key substantive points from the document as numbered bullet points. Cover the main arguments, findings, or claims. Use simple language.

{h3}
List any specific orders, directions, or rulings given by the court or authority. If it's not a court order, list any demands, requests, or required actions stated in the document.

{h4}
List ALL dates mentioned in the document with their significance:
- Filing dates
- Hearing dates
- Compliance deadlines
- Limitation periods
If no dates are found, explicitly state "No specific dates or deadlines mentioned."

{h5}
Based on this document, advise what steps need to be taken next:
- What filings or responses are needed?
- By when must action be taken?
- Which court/office to approach?
- Any documents to prepare?
Be specific and practical.

{h6}
{disclaimer}

IMPORTANT: Be accurate. Do not fabricate information not present in the document. If something is unclear, say so. Use the exact section headings above, in English, even when writing the content in another language."#,
        language = language.as_str(),
        h1 = EXPLANATION_HEADINGS[0],
        h2 = EXPLANATION_HEADINGS[1],
        h3 = EXPLANATION_HEADINGS[2],
        h4 = EXPLANATION_HEADINGS[3],
        h5 = EXPLANATION_HEADINGS[4],
        h6 = EXPLANATION_HEADINGS[5],
        disclaimer = EXPLANATION_DISCLAIMER,
    )
}

pub fn explanation_user_prompt(document_text: &str) -> String {
    format!("Please analyze and explain the following legal document:\n\n{document_text}")
}
