use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").expect("static numbered-line regex"));

/// One paragraph of the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Block {
    Heading(String),
    NumberedItem { index: u64, text: String },
    Body(String),
    Spacer,
}

impl Block {
    /// The text a serializer writes for this block.
    pub fn display_text(&self) -> String {
        match self {
            Self::Heading(text) | Self::Body(text) => text.clone(),
            Self::NumberedItem { index, text } => format!("{index}. {text}"),
            Self::Spacer => String::new(),
        }
    }
}

/// Paragraph model for a whole draft, one block per input line.
pub fn classify(text: &str) -> Vec<Block> {
    text.lines().map(classify_line).collect()
}

/// Rules apply in order: blank, all-caps heading, numbered item, body.
pub fn classify_line(line: &str) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Spacer;
    }

    if is_heading(trimmed) {
        return Block::Heading(trimmed.to_string());
    }

    if let Some(caps) = NUMBERED_LINE.captures(trimmed) {
        // Digit runs too long for u64 are treated as body text.
        if let Ok(index) = caps[1].parse::<u64>() {
            return Block::NumberedItem {
                index,
                text: caps[2].to_string(),
            };
        }
    }

    Block::Body(trimmed.to_string())
}

fn is_heading(trimmed: &str) -> bool {
    trimmed.chars().count() > 3
        && trimmed.chars().any(char::is_uppercase)
        && trimmed.to_uppercase() == trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_spacers() {
        assert_eq!(classify_line(""), Block::Spacer);
        assert_eq!(classify_line("   \t"), Block::Spacer);
    }

    #[test]
    fn all_caps_lines_are_headings() {
        assert_eq!(
            classify_line("  IN THE COURT OF THE CIVIL JUDGE, LUCKNOW  "),
            Block::Heading("IN THE COURT OF THE CIVIL JUDGE, LUCKNOW".into())
        );
        assert_eq!(classify_line("PRAYER"), Block::Heading("PRAYER".into()));
    }

    #[test]
    fn short_caps_are_body() {
        assert_eq!(classify_line("FIR"), Block::Body("FIR".into()));
    }

    #[test]
    fn caseless_lines_are_not_headings() {
        assert_eq!(classify_line("2025"), Block::Body("2025".into()));
        assert_eq!(
            classify_line("सेवा में, थानाध्यक्ष"),
            Block::Body("सेवा में, थानाध्यक्ष".into())
        );
        assert_eq!(classify_line("----"), Block::Body("----".into()));
    }

    #[test]
    fn numbered_lines_are_items() {
        assert_eq!(
            classify_line("12. That the accused fled the spot."),
            Block::NumberedItem {
                index: 12,
                text: "That the accused fled the spot.".into()
            }
        );
        assert_eq!(
            classify_line("3.No space after the dot"),
            Block::NumberedItem {
                index: 3,
                text: "No space after the dot".into()
            }
        );
    }

    #[test]
    fn heading_rule_wins_over_numbering() {
        assert_eq!(
            classify_line("1. FACTS OF THE CASE"),
            Block::Heading("1. FACTS OF THE CASE".into())
        );
    }

    #[test]
    fn mixed_case_is_body() {
        assert_eq!(
            classify_line("Respected Sir,"),
            Block::Body("Respected Sir,".into())
        );
    }

    #[test]
    fn classify_is_one_block_per_line() {
        let blocks = classify("AFFIDAVIT\n\n1. I am the deponent.\nVerified at Lucknow.");
        assert_eq!(blocks.len(), 4);
        assert!(matches!(blocks[0], Block::Heading(_)));
        assert_eq!(blocks[1], Block::Spacer);
        assert_eq!(blocks[2].display_text(), "1. I am the deponent.");
        assert_eq!(blocks[3], Block::Body("Verified at Lucknow.".into()));
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "NOTICE\n1. Appear on 5 May.\nThank you.";
        assert_eq!(classify(text), classify(text));
    }
}
