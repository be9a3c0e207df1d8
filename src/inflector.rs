//! Word inflections used when naming resources and translation keys.
//!
//! A compact port of the common English pluralization rules; irregular and
//! uncountable words are handled before the suffix rules are tried.

use convert_case::{Case, Casing};
use once_cell::sync::Lazy;
use regex::Regex;

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("zombie", "zombies"),
];

/// Suffix rules, most specific first
static PLURAL_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)(quiz)$", "${1}zes"),
        (r"(?i)^(oxen)$", "${1}"),
        (r"(?i)^(ox)$", "${1}en"),
        (r"(?i)^(m|l)(?:ice|ouse)$", "${1}ice"),
        (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
        (r"(?i)(x|ch|ss|sh)$", "${1}es"),
        (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
        (r"(?i)(hive)$", "${1}s"),
        (r"(?i)(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
        (r"(?i)sis$", "ses"),
        (r"(?i)([ti])a$", "${1}a"),
        (r"(?i)([ti])um$", "${1}a"),
        (r"(?i)(buffal|tomat)o$", "${1}oes"),
        (r"(?i)(bu)s$", "${1}ses"),
        (r"(?i)(alias|status)$", "${1}es"),
        (r"(?i)(octop|vir)(?:us|i)$", "${1}i"),
        (r"(?i)^(ax|test)is$", "${1}es"),
        (r"(?i)s$", "s"),
    ]
    .iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid plural rule"),
            *replacement,
        )
    })
    .collect()
});

/// Plural form of the last word in `word`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let (head, last) = match word.rfind(|c: char| !c.is_alphanumeric()) {
        Some(pos) => word.split_at(pos + 1),
        None => ("", word),
    };
    if last.is_empty() {
        return word.to_string();
    }

    let lower = last.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return format!("{}{}", head, plural);
    }

    for (rule, replacement) in PLURAL_RULES.iter() {
        if rule.is_match(last) {
            return format!("{}{}", head, rule.replace(last, *replacement));
        }
    }

    format!("{}s", word)
}

/// Snake-cased, `/`-separated form of a module path (`MyApp::WidgetAPI` → `my_app/widget_api`).
pub fn underscore(name: &str) -> String {
    name.split("::")
        .map(|segment| segment.to_case(Case::Snake))
        .collect::<Vec<_>>()
        .join("/")
}

/// Translation scope of a named class: its underscored name with `.` separators
pub fn translation_scope(name: &str) -> String {
    underscore(name).replace('/', ".")
}
