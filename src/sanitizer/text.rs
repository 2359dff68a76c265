use std::sync::OnceLock;

use regex::Regex;

struct TextPatterns {
    script_blocks: Regex,
    tags: Regex,
    octets: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static TextPatterns {
    static PATTERNS: OnceLock<TextPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TextPatterns {
        script_blocks: Regex::new(r"(?is)<(script|style)[^>]*?>.*?</(script|style)>").unwrap(),
        tags: Regex::new(r"<[^>]*>").unwrap(),
        octets: Regex::new(r"(?i)%[a-f0-9]{2}").unwrap(),
        whitespace: Regex::new(r"[\r\n\t ]+").unwrap(),
    })
}

/// Generic clean-up pass for a single line of untrusted text.
///
/// Drops markup (including the bodies of `script`/`style` blocks) and percent-encoded
/// octets, collapses whitespace runs into a single space and trims the result. A stray
/// `<` that does not open a tag is escaped. Other control characters are kept.
pub fn sanitize_text_field(raw: &str) -> String {
    let patterns = patterns();

    let mut text = raw.to_string();
    if text.contains('<') {
        text = patterns.script_blocks.replace_all(&text, "").into_owned();
        text = patterns.tags.replace_all(&text, "").into_owned();
        text = text.replace('<', "&lt;");
    }
    text = patterns.whitespace.replace_all(&text, " ").into_owned();

    // Removing one octet can expose another, e.g. "%%4141"
    while patterns.octets.is_match(&text) {
        text = patterns.octets.replace_all(&text, "").into_owned();
    }
    text = patterns.whitespace.replace_all(&text, " ").into_owned();

    text.trim().to_string()
}
