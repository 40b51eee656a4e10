//! Escaping of text and attribute content
//!
//! The five reserved characters are escaped with quick-xml. Characters that
//! XML 1.0 cannot carry at all (most C0 controls, lone surrogates are already
//! impossible in `str`, U+FFFE/U+FFFF) are replaced by U+FFFD so the output
//! is always well-formed.

use std::borrow::Cow;

use quick_xml::escape::escape;

/// Whether `c` may appear in an XML 1.0 document
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn sanitize(raw: &str) -> Cow<'_, str> {
    if raw.chars().all(is_xml_char) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(
            raw.chars()
                .map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' })
                .collect(),
        )
    }
}

/// Escape element text. `\r` is written as a character reference so that
/// line-ending normalization cannot alter it.
pub fn escape_text(raw: &str) -> Cow<'_, str> {
    escape_with(raw, &[('\r', "&#13;")])
}

/// Escape an attribute value. Whitespace other than space is written as
/// character references so that attribute-value normalization cannot alter it.
pub fn escape_attribute(raw: &str) -> Cow<'_, str> {
    escape_with(raw, &[('\r', "&#13;"), ('\n', "&#10;"), ('\t', "&#9;")])
}

fn escape_with<'a>(raw: &'a str, refs: &[(char, &str)]) -> Cow<'a, str> {
    let sanitized = sanitize(raw);
    let escaped: Cow<'_, str> = match &sanitized {
        Cow::Borrowed(s) => escape(s),
        Cow::Owned(s) => Cow::Owned(escape(s).into_owned()),
    };

    if !escaped.chars().any(|c| refs.iter().any(|(r, _)| *r == c)) {
        return match (sanitized, escaped) {
            (Cow::Borrowed(_), Cow::Borrowed(_)) => Cow::Borrowed(raw),
            (_, e) => Cow::Owned(e.into_owned()),
        };
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match refs.iter().find(|(r, _)| *r == c) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}
