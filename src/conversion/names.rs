//! Element name normalization
//!
//! Turns arbitrary column headers into names that are valid element tags:
//! accented Latin letters are folded to ASCII, everything outside
//! `[A-Za-z0-9_]` becomes `_`, the result is lower-cased, and a `col_`
//! prefix is added when it would otherwise start with a digit.

use std::collections::HashSet;

/// Prefix for names that would start with a digit (or be empty)
pub const DIGIT_PREFIX: &str = "col_";

/// Normalize a label into a valid element name.
///
/// Total and idempotent: `normalize_name(&normalize_name(x)) == normalize_name(x)`.
pub fn normalize_name(label: &str) -> String {
    let mut name = String::with_capacity(label.len() + DIGIT_PREFIX.len());

    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            name.push(ch.to_ascii_lowercase());
        } else if let Some(folded) = fold_latin(ch) {
            name.push_str(folded);
        } else {
            name.push('_');
        }
    }

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, DIGIT_PREFIX);
    }

    name
}

/// Whether `name` can be used as an element or attribute name
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '\u{B7}')
}

/// Lower-case ASCII spelling of an accented Latin letter
fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'À'..='Å' | 'à'..='å' | 'Ā' | 'ā' | 'Ă' | 'ă' | 'Ą' | 'ą' => "a",
        'Æ' | 'æ' => "ae",
        'Ç' | 'ç' | 'Ć' | 'ć' | 'Č' | 'č' => "c",
        'Ð' | 'ð' | 'Ď' | 'ď' | 'Đ' | 'đ' => "d",
        'È'..='Ë' | 'è'..='ë' | 'Ē' | 'ē' | 'Ė' | 'ė' | 'Ę' | 'ę' | 'Ě' | 'ě' => "e",
        'Ğ' | 'ğ' => "g",
        'Ì'..='Ï' | 'ì'..='ï' | 'Ī' | 'ī' | 'Į' | 'į' | 'İ' | 'ı' => "i",
        'Ł' | 'ł' => "l",
        'Ñ' | 'ñ' | 'Ń' | 'ń' | 'Ň' | 'ň' => "n",
        'Ò'..='Ö' | 'Ø' | 'ò'..='ö' | 'ø' | 'Ō' | 'ō' | 'Ő' | 'ő' => "o",
        'Œ' | 'œ' => "oe",
        'Ř' | 'ř' => "r",
        'Ś' | 'ś' | 'Ş' | 'ş' | 'Š' | 'š' => "s",
        'ß' => "ss",
        'Ţ' | 'ţ' | 'Ť' | 'ť' => "t",
        'Þ' | 'þ' => "th",
        'Ù'..='Ü' | 'ù'..='ü' | 'Ū' | 'ū' | 'Ů' | 'ů' | 'Ű' | 'ű' => "u",
        'Ý' | 'ý' | 'ÿ' | 'Ÿ' => "y",
        'Ź' | 'ź' | 'Ż' | 'ż' | 'Ž' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Hands out normalized names that are unique within one conversion.
///
/// The first label to claim a name keeps it; later collisions get `_2`,
/// `_3`, ... in the order they are registered.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `label` and make it unique among names issued so far
    pub fn unique(&mut self, label: &str) -> String {
        let base = normalize_name(label);
        if self.taken.insert(base.clone()) {
            return base;
        }

        let mut suffix = 2usize;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
