//! Lightweight script-based language detection for extracted text.
//!
//! Legal input here is Hindi or English, so counting Devanagari against
//! Latin letters is enough. Returns Tesseract-style codes.

/// Minimum number of letters before a guess is made.
const MIN_LETTERS: usize = 10;

/// Share of Devanagari letters at which text counts as Hindi.
/// Hindi documents routinely embed English citations ("Section 323 IPC"),
/// so the threshold sits well below one half.
const DEVANAGARI_THRESHOLD: f64 = 0.3;

/// Detect the primary language of extracted text: `Some("hin")`,
/// `Some("eng")`, or `None` when there is too little text to tell.
pub fn detect_language(text: &str) -> Option<&'static str> {
    let mut devanagari = 0usize;
    let mut latin = 0usize;

    for ch in text.chars().filter(|c| c.is_alphabetic()) {
        if ('\u{0900}'..='\u{097F}').contains(&ch) {
            devanagari += 1;
        } else if ch.is_ascii_alphabetic() {
            latin += 1;
        }
    }

    let letters = devanagari + latin;
    if letters < MIN_LETTERS {
        return None;
    }

    if devanagari as f64 / letters as f64 >= DEVANAGARI_THRESHOLD {
        Some("hin")
    } else {
        Some("eng")
    }
}
