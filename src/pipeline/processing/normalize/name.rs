use once_cell::sync::Lazy;
use regex::Regex;

/// Honorifics and suffixes removed as whole words. Case-sensitive.
static HONORIFIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(Dr\.?|Mr\.?|Ms\.?|Mrs\.?|Jr\.?|Sr\.?)\b").expect("honorific pattern is valid")
});

/// First and last name pulled out of a full-name string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    pub last: String,
}

impl NameParts {
    fn new(first: &str, last: &str) -> Self {
        Self {
            first: first.to_string(),
            last: last.to_string(),
        }
    }
}

/// Split a full name into first and last tokens.
///
/// Middle tokens are dropped. A single token becomes the first name and an
/// empty input yields two empty strings.
pub fn split_name(full_name: &str) -> NameParts {
    let stripped = HONORIFIC_RE.replace_all(full_name, "");
    let cleaned = stripped.replace('.', " ");
    let tokens: Vec<&str> = cleaned
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c == ',' || c == '.'))
        .collect();

    match tokens.as_slice() {
        [] => NameParts::default(),
        [only] => NameParts::new(only, ""),
        [first, .., last] => NameParts::new(first, last),
    }
}

/// Same as [`split_name`] with an absent name treated as empty
pub fn split_optional_name(full_name: Option<&str>) -> NameParts {
    split_name(full_name.unwrap_or_default())
}
