//! Pluralization service injected into the mapping builder

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Turns a singular name into its plural form
pub trait PluralizationService {
    fn pluralize(&self, name: &str) -> String;
}

/// Leaves names untouched (pluralization disabled)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPluralization;

impl PluralizationService for NoPluralization {
    fn pluralize(&self, name: &str) -> String {
        name.to_string()
    }
}

static IRREGULAR_PLURALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("person", "people"),
        ("man", "men"),
        ("woman", "women"),
        ("child", "children"),
        ("mouse", "mice"),
        ("goose", "geese"),
        ("foot", "feet"),
        ("tooth", "teeth"),
        ("ox", "oxen"),
        ("datum", "data"),
        ("index", "indices"),
        ("matrix", "matrices"),
        ("criterion", "criteria"),
        ("analysis", "analyses"),
    ])
});

/// Nouns whose plural equals the singular
static UNCOUNTABLE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "equipment",
        "information",
        "rice",
        "money",
        "species",
        "series",
        "fish",
        "sheep",
        "deer",
        "news",
        "staff",
    ]
});

/// English rule-based pluralization.
///
/// Only the trailing word of a compound identifier (`OrderLine`,
/// `order_line`) is pluralized and its leading capitalization is preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishPluralizationService;

impl EnglishPluralizationService {
    pub fn new() -> Self {
        Self
    }

    /// Index where the last word of `name` starts
    fn last_word_start(name: &str) -> usize {
        let mut start = 0;
        let mut prev: Option<char> = None;
        for (i, c) in name.char_indices() {
            if let Some(p) = prev {
                if c.is_uppercase() && p.is_lowercase() {
                    start = i;
                } else if p == '_' || !p.is_alphanumeric() {
                    start = i;
                }
            }
            prev = Some(c);
        }
        start
    }

    fn pluralize_word(word: &str) -> String {
        let lower = word.to_lowercase();

        if UNCOUNTABLE.contains(&lower.as_str()) || lower.is_empty() {
            return word.to_string();
        }

        if let Some(plural) = IRREGULAR_PLURALS.get(lower.as_str()) {
            return match_case(word, plural);
        }

        if IRREGULAR_PLURALS.values().any(|p| *p == lower) {
            return word.to_string();
        }

        let ends_with = |suffix: &str| lower.ends_with(suffix);

        if ends_with("s") && (ends_with("ss") || ends_with("us") || ends_with("is")) {
            if ends_with("is") {
                return format!("{}es", &word[..word.len() - 2]);
            }
            return format!("{}es", word);
        }
        if ends_with("s") {
            // already plural
            return word.to_string();
        }
        if ends_with("x") || ends_with("z") || ends_with("ch") || ends_with("sh") {
            return format!("{}es", word);
        }
        if ends_with("y") && !is_vowel_before_last(&lower) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
        if ends_with("fe") {
            return format!("{}ves", &word[..word.len() - 2]);
        }
        if ends_with("lf") || ends_with("af") {
            return format!("{}ves", &word[..word.len() - 1]);
        }
        format!("{}s", word)
    }
}

fn is_vowel_before_last(lower: &str) -> bool {
    let mut chars = lower.chars().rev();
    chars.next();
    matches!(chars.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

/// Carry the capitalization of the first letter of `original` onto `replacement`
fn match_case(original: &str, replacement: &str) -> String {
    let upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if !upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl PluralizationService for EnglishPluralizationService {
    fn pluralize(&self, name: &str) -> String {
        let start = Self::last_word_start(name);
        let (head, word) = name.split_at(start);
        format!("{}{}", head, Self::pluralize_word(word))
    }
}
