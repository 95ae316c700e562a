//! English inflection helpers for system codes
//!
//! System codes and generated binding names are derived from display names
//! and field names by convention ("Priorities" → `priority`, `high` →
//! `highs`). Only the final `_`-separated word of an identifier is inflected,
//! so `ticket_priorities` singularizes to `ticket_priority`.
//!
//! The rule tables cover the regular English forms plus the handful of
//! irregular and uncountable words that show up in vocabulary names. They are
//! evaluated first-match-wins.

use heck::ToSnakeCase;
use regex::Regex;
use std::sync::OnceLock;

/// Words that are the same in singular and plural form
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
    "news",
    "staff",
];

/// (singular, plural) pairs matched against the end of a word
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("move", "moves"),
    ("zombie", "zombies"),
];

const PLURAL_RULES: &[(&str, &str)] = &[
    (r"(?i)(quiz)$", "${1}zes"),
    (r"(?i)^(ox)$", "${1}en"),
    (r"(?i)([ml])ouse$", "${1}ice"),
    (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    (r"(?i)(x|ch|ss|sh)$", "${1}es"),
    (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
    (r"(?i)(hive)$", "${1}s"),
    (r"(?i)([lr])f$", "${1}ves"),
    (r"(?i)([^f])fe$", "${1}ves"),
    (r"(?i)sis$", "ses"),
    (r"(?i)([ti])a$", "${1}a"),
    (r"(?i)([ti])um$", "${1}a"),
    (r"(?i)(buffal|tomat)o$", "${1}oes"),
    (r"(?i)(bu)s$", "${1}ses"),
    (r"(?i)(alias|status)$", "${1}es"),
    (r"(?i)(octop|vir)us$", "${1}i"),
    (r"(?i)(ax|test)is$", "${1}es"),
    (r"(?i)s$", "s"),
];

const SINGULAR_RULES: &[(&str, &str)] = &[
    (r"(?i)(quiz)zes$", "${1}"),
    (r"(?i)(matr)ices$", "${1}ix"),
    (r"(?i)(vert|ind)ices$", "${1}ex"),
    (r"(?i)^(ox)en$", "${1}"),
    (r"(?i)(alias|status)(es)?$", "${1}"),
    (r"(?i)(octop|vir)(us|i)$", "${1}us"),
    (r"(?i)^(a)x[ie]s$", "${1}xis"),
    (r"(?i)(cris|test)(is|es)$", "${1}is"),
    (r"(?i)(shoe)s$", "${1}"),
    (r"(?i)(o)es$", "${1}"),
    (r"(?i)(bus)(es)?$", "${1}"),
    (r"(?i)([ml])ice$", "${1}ouse"),
    (r"(?i)(x|ch|ss|sh)es$", "${1}"),
    (r"(?i)(m)ovies$", "${1}ovie"),
    (r"(?i)([^aeiouy]|qu)ies$", "${1}y"),
    (r"(?i)([lr])ves$", "${1}f"),
    (r"(?i)(tive)s$", "${1}"),
    (r"(?i)(hive)s$", "${1}"),
    (r"(?i)([^f])ves$", "${1}fe"),
    (r"(?i)(analy|ba|diagno|parenthe|progno|synop|the)(sis|ses)$", "${1}sis"),
    (r"(?i)(ss)$", "${1}"),
    (r"(?i)s$", ""),
];

fn compile(rules: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
        .collect()
}

fn plural_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| compile(PLURAL_RULES))
}

fn singular_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| compile(SINGULAR_RULES))
}

/// Split an identifier into everything up to the last `_` and the last word
fn split_last_word(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(idx) => (&word[..=idx], &word[idx + 1..]),
        None => ("", word),
    }
}

fn inflect(word: &str, rules: &[(Regex, &'static str)], to_plural: bool) -> String {
    let (head, last) = split_last_word(word);
    if last.is_empty() {
        return word.to_string();
    }

    let lower = last.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    for (singular, plural) in IRREGULAR {
        let (from, to) = if to_plural {
            (singular, plural)
        } else {
            (plural, singular)
        };
        if lower.ends_with(from) {
            let stem = &last[..last.len() - from.len()];
            return format!("{}{}{}", head, stem, to);
        }
        // Already in the target form
        if lower.ends_with(to) {
            return word.to_string();
        }
    }

    for (pattern, replacement) in rules {
        if pattern.is_match(last) {
            return format!("{}{}", head, pattern.replace(last, *replacement));
        }
    }

    if to_plural {
        format!("{}s", word)
    } else {
        word.to_string()
    }
}

/// Pluralize the last word of an identifier (`priority_high` → `priority_highs`)
pub fn pluralize(word: &str) -> String {
    inflect(word, plural_rules(), true)
}

/// Singularize the last word of an identifier (`priorities` → `priority`)
pub fn singularize(word: &str) -> String {
    inflect(word, singular_rules(), false)
}

/// Collapse every run of two or more underscores into one
pub fn collapse_underscores(code: &str) -> String {
    static UNDERSCORES: OnceLock<Regex> = OnceLock::new();
    let re = UNDERSCORES.get_or_init(|| Regex::new(r"_{2,}").unwrap());
    re.replace_all(code, "_").into_owned()
}

/// Normalize a display name into a system code fragment
///
/// Lowercases into underscore form, singularizes the last word and replaces
/// every character outside `[a-zA-Z0-9_]` with `_` (`Café` → `caf_`). The
/// result is not prefixed with a parent code; callers do that.
pub fn code_fragment(name: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let non_word = NON_WORD.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]").unwrap());

    let snake = name.to_snake_case();
    let singular = singularize(&snake);
    non_word.replace_all(&singular, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize_regular_and_irregular() {
        assert_eq!(singularize("priorities"), "priority");
        assert_eq!(singularize("priority"), "priority");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("classes"), "class");
        assert_eq!(singularize("board_chairmen"), "board_chairman");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("news"), "news");
    }

    #[test]
    fn test_singularize_latin_and_greek_forms() {
        assert_eq!(singularize("analysis"), "analysis");
        assert_eq!(singularize("analyses"), "analysis");
        assert_eq!(singularize("diagnoses"), "diagnosis");
        assert_eq!(singularize("crisis"), "crisis");
        assert_eq!(singularize("axes"), "axis");
        assert_eq!(singularize("taxes"), "tax");
        // No -a to -um rule
        assert_eq!(singularize("media"), "media");
        assert_eq!(singularize("medium"), "medium");
    }

    #[test]
    fn test_pluralize_last_word_only() {
        assert_eq!(pluralize("ticket_priority_high"), "ticket_priority_highs");
        assert_eq!(pluralize("priority"), "priorities");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("chairman"), "chairmen");
        assert_eq!(pluralize("series"), "series");
        assert_eq!(pluralize("priority_medium"), "priority_media");
        assert_eq!(pluralize("datum"), "data");
        assert_eq!(pluralize("axis"), "axes");
        assert_eq!(pluralize("analysis"), "analyses");
    }

    #[test]
    fn test_code_fragment() {
        assert_eq!(code_fragment("Board Chairman"), "board_chairman");
        assert_eq!(code_fragment("CEO"), "ceo");
        assert_eq!(code_fragment("Head Janitor"), "head_janitor");
        assert_eq!(code_fragment("Priorities"), "priority");
        assert_eq!(code_fragment("Analysis"), "analysis");
        assert_eq!(code_fragment("Café"), "caf_");
        assert_eq!(code_fragment("Re-open"), "re_open");
    }

    #[test]
    fn test_collapse_underscores() {
        assert_eq!(collapse_underscores("a__b___c"), "a_b_c");
        assert_eq!(collapse_underscores("a_b"), "a_b");
    }
}
