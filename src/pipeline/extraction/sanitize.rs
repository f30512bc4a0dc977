/// Sanitize extracted text before passing downstream.
/// Strips control characters, trims each line and collapses runs of blank
/// lines into one. Devanagari (including matras, virama and nukta, which are
/// not alphanumeric) and legal punctuation are preserved.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let filtered: String = raw.chars().filter(|c| is_kept(*c)).collect();

    let mut out: Vec<&str> = Vec::new();
    for line in filtered.lines().map(str::trim) {
        if line.is_empty() && out.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric()
        || c == '\n'
        || (c.is_whitespace() && !c.is_control())
        || c == '\t'
        || is_devanagari(c)
        || matches!(
            c,
            '.' | ','
                | ';'
                | ':'
                | '-'
                | '/'
                | '\\'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '+'
                | '='
                | '%'
                | '#'
                | '@'
                | '&'
                | '\''
                | '"'
                | '!'
                | '?'
                | '<'
                | '>'
                | '*'
                | '_'
                | '|'
                | '§'
                | '¶'
                | '₹'
                | '°'
                | '\u{2013}' // En-dash
                | '\u{2014}' // Em-dash
                | '\u{2018}'
                | '\u{2019}'
                | '\u{201C}'
                | '\u{201D}'
                | '\u{200C}' // ZWNJ, used in Devanagari conjuncts
                | '\u{200D}' // ZWJ
        )
}

/// Devanagari block, including danda (।) and double danda (॥).
fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}
