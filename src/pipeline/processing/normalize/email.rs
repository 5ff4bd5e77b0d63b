use unicode_normalization::UnicodeNormalization;

const ZERO_WIDTH_SPACE: char = '\u{200B}';
const NO_BREAK_SPACE: char = '\u{00A0}';

/// Canonicalize an email into the key used for joining and duplicate checks.
///
/// Drops zero-width and no-break spaces anywhere in the string, applies
/// NFKC, then lower-cases and trims. Lower-casing after NFKC also folds
/// capitals produced by compatibility mappings. An absent email stays absent.
pub fn normalize_email(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let composed: String = raw
        .chars()
        .filter(|c| *c != ZERO_WIDTH_SPACE && *c != NO_BREAK_SPACE)
        .nfkc()
        .collect();
    Some(composed.to_lowercase().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_email_stays_absent() {
        assert_eq!(normalize_email(None), None);
    }

    #[test]
    fn test_trims_lowercases_and_strips_invisible_characters() {
        assert_eq!(
            normalize_email(Some(" Foo@BAR.com\u{200B} ")),
            Some("foo@bar.com".to_string())
        );
        assert_eq!(
            normalize_email(Some("jane\u{00A0}@test.com")),
            Some("jane@test.com".to_string())
        );
    }

    #[test]
    fn test_applies_compatibility_composition() {
        // Fullwidth letters and a decomposed accent
        assert_eq!(
            normalize_email(Some("ｊａｎｅ@test.com")),
            Some("jane@test.com".to_string())
        );
        assert_eq!(
            normalize_email(Some("jose\u{0301}@test.com")),
            Some("jos\u{00E9}@test.com".to_string())
        );
    }

    #[test]
    fn test_compatibility_capitals_are_lowercased() {
        // U+210C BLACK-LETTER CAPITAL H maps to a plain "H" under NFKC
        let once = normalize_email(Some("\u{210C}ello@x.com"));
        assert_eq!(once.as_deref(), Some("hello@x.com"));
        assert_eq!(normalize_email(once.as_deref()), once);
        assert_eq!(normalize_email(Some("\u{2160}@x.com")).as_deref(), Some("i@x.com"));
    }

    #[test]
    fn test_whitespace_only_email_becomes_empty_key() {
        assert_eq!(normalize_email(Some("   ")), Some(String::new()));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let samples = [
            "Jane@Test.com",
            " Foo@BAR.com\u{200B} ",
            "\u{00A0}MIXED.Case+tag@Example.ORG",
            "ｊａｎｅ@test.com",
            "jose\u{0301}@test.com",
            "\u{210C}ello@x.com",
            "\u{2003}Padded@x.com\u{3000}",
            "",
        ];
        for sample in samples {
            let once = normalize_email(Some(sample));
            let twice = normalize_email(once.as_deref());
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }
}
