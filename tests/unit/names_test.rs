//! Unit tests for element name normalization
//!
//! Tests cover:
//! - Accent folding and character replacement
//! - Digit prefixes and empty labels
//! - Idempotence of normalization
//! - Collision suffixes within one conversion

use xmlconv::conversion::names::{is_valid_name, normalize_name, NameRegistry, DIGIT_PREFIX};

#[cfg(test)]
mod names_tests {
    use super::*;

    #[test]
    fn test_headers_become_valid_names() {
        let cases = [
            ("Código", "codigo"),
            ("Preço", "preco"),
            ("Unit Price ($)", "unit_price____"),
            ("e-mail", "e_mail"),
            ("Ação", "acao"),
        ];
        for (label, expected) in cases {
            assert_eq!(normalize_name(label), expected, "label {:?}", label);
            assert!(is_valid_name(&normalize_name(label)));
        }
    }

    #[test]
    fn test_digit_and_empty_labels_get_prefix() {
        assert_eq!(normalize_name("2024"), format!("{}2024", DIGIT_PREFIX));
        assert_eq!(normalize_name(""), DIGIT_PREFIX);
        assert!(is_valid_name(&normalize_name("")));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for label in ["Código", "1st", "  spaced  out ", "ÆØÅ", "__x__", "日本"] {
            let once = normalize_name(label);
            assert_eq!(normalize_name(&once), once, "label {:?}", label);
        }
    }

    #[test]
    fn test_registry_suffixes_in_order() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.unique("Nome"), "nome");
        assert_eq!(registry.unique("NOME"), "nome_2");
        assert_eq!(registry.unique("nome"), "nome_3");
        assert_eq!(registry.unique("outro"), "outro");
    }

    #[test]
    fn test_registry_skips_taken_suffixes() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.unique("a_2"), "a_2");
        assert_eq!(registry.unique("a"), "a");
        assert_eq!(registry.unique("A"), "a_3");
    }

    #[test]
    fn test_name_validity() {
        assert!(is_valid_name("record"));
        assert!(is_valid_name("xs:element"));
        assert!(!is_valid_name("1record"));
        assert!(!is_valid_name("two words"));
        assert!(!is_valid_name(""));
    }
}
