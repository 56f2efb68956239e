//! Text normalization for comparison
//!
//! Maps superficially different spellings to one comparable form:
//! - case folding, `ё` folds to `е`, Latin diacritics stripped
//! - quote and dash unification
//! - parenthesized content stripped
//! - common abbreviations expanded (`им.` -> `имени`, `г.` -> `город`, ...)
//! - numbering marks expanded (`№5` -> `номер 5`)
//! - punctuation dropped, whitespace collapsed
//! - leading organizational prefixes (`уо`, `гуо`, ...) stripped
//!
//! `normalize` is pure and idempotent; an empty result is valid.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PARENTHESIZED: Regex = Regex::new(r"\([^)]*\)").unwrap();
    static ref NUMBERING_MARK: Regex = Regex::new(r"[№#]\s*(\d+)").unwrap();

    /// Abbreviations expanded when followed by a period and whitespace.
    static ref ABBREVIATIONS: Vec<(Regex, &'static str)> = [
        (r"\bим\.\s+", "имени "),
        (r"\bг\.\s+", "город "),
        (r"\bул\.\s+", "улица "),
        (r"\bобл\.\s+", "область "),
        (r"\bпос\.\s+", "поселок "),
    ]
    .into_iter()
    .map(|(pattern, full)| (Regex::new(pattern).unwrap(), full))
    .collect();

    /// Organizational prefixes dropped when they open the string.
    static ref ORG_PREFIX: Regex = Regex::new(r"^(?:гуо|чуо|уо|го)\s+").unwrap();
}

/// Normalize a string for comparison.
pub fn normalize(text: &str) -> String {
    let mut result = text.to_lowercase();

    result = fold_characters(&result);
    result = PARENTHESIZED.replace_all(&result, "").into_owned();

    for (pattern, full) in ABBREVIATIONS.iter() {
        result = pattern.replace_all(&result, *full).into_owned();
    }

    result = NUMBERING_MARK.replace_all(&result, "номер $1").into_owned();

    // Strip Latin diacritics (NFKD can surface uppercase compatibility forms
    // such as № -> "No", so lowercase once more), then drop punctuation and
    // collapse whitespace.
    result = strip_latin_diacritics(&result).to_lowercase();
    result = result
        .chars()
        .map(|c| {
            // NFC can recompose a decomposed е + diaeresis into ё, so fold
            // once more after recomposition.
            if c == 'ё' {
                'е'
            } else if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    result = collapse_whitespace(result.trim());

    // Prefixes can stack ("уо го ...") so strip to a fixed point.
    loop {
        let stripped = ORG_PREFIX.replace(&result, "").into_owned();
        if stripped == result {
            break;
        }
        result = stripped;
    }

    result
}

/// Keywords of the normalized form with at least `min_len` characters.
///
/// Used by the filter consumer as a fallback when a filter string does not
/// name a group representative.
pub fn extract_keywords(text: &str, min_len: usize) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .filter(|w| w.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

/// Unify quotes and dashes and fold `ё` to `е`. `ё` is folded here by an
/// explicit mapping rather than by decomposition so it cannot take other
/// Cyrillic letters with it.
fn fold_characters(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '«' | '»' | '“' | '”' | '„' | '‟' | '‘' | '’' | '‚' | '‹' | '›' | '`' | '´' => '"',
            '‐' | '‒' | '–' | '—' | '―' | '−' => '-',
            'ё' => 'е',
            other => other,
        })
        .collect()
}

/// Decompose with NFKD and drop combining marks, but only after a Latin
/// base character. Cyrillic letters such as `й` (и + combining breve) are
/// distinct letters, not accented variants, and must survive; retained
/// marks are recomposed with NFC.
fn strip_latin_diacritics(s: &str) -> String {
    let mut latin_base = false;
    s.nfkd()
        .filter(|c| {
            if is_combining_mark(*c) {
                !latin_base
            } else {
                latin_base = c.is_ascii_alphabetic();
                true
            }
        })
        .nfc()
        .collect()
}

/// Collapse whitespace runs into single spaces.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c);
            prev_was_space = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Школа-интернат!"), "школа интернат");
        assert_eq!(normalize("ГОМЕЛЬ"), "гомель");
    }

    #[test]
    fn strips_parenthesized_content() {
        assert_eq!(normalize("школа (бывшая СШ 3)"), "школа");
        assert_eq!(normalize("университет (филиал) имени Скорины"), "университет имени скорины");
    }

    #[test]
    fn expands_abbreviations() {
        assert_eq!(normalize("школа им. Пушкина"), "школа имени пушкина");
        assert_eq!(normalize("ул. Советская"), "улица советская");
        assert_eq!(normalize("г. Гомель"), "город гомель");
    }

    #[test]
    fn expands_numbering_marks() {
        assert_eq!(normalize("Школа №5"), "школа номер 5");
        assert_eq!(normalize("школа № 5"), "школа номер 5");
        assert_eq!(normalize("школа #5"), "школа номер 5");
        assert_eq!(normalize("Школа №5"), normalize("школа номер 5"));
    }

    #[test]
    fn strips_organizational_prefixes() {
        assert_eq!(normalize("УО Гомельский колледж"), "гомельский колледж");
        assert_eq!(normalize("ГУО СШ №5"), "сш номер 5");
        // Stacked prefixes strip to a fixed point
        assert_eq!(normalize("уо го школа"), "школа");
    }

    #[test]
    fn folds_yo_and_diacritics() {
        assert_eq!(normalize("Семёновка"), normalize("Семеновка"));
        assert_eq!(normalize("café"), "cafe");
        // decomposed ё (е + combining diaeresis) folds too
        assert_eq!(normalize("Сем\u{0435}\u{0308}новка"), "семеновка");
    }

    #[test]
    fn short_i_survives_decomposition() {
        // й is its own letter; it must not collapse into и
        assert_eq!(normalize("Гомельский"), "гомельский");
        assert_eq!(normalize("район"), "район");
        assert_ne!(normalize("гомельский"), normalize("гомельскии"));
        // and a decomposed й (и + combining breve) recomposes
        assert_eq!(normalize("гомельски\u{0438}\u{0306}"), "гомельский");
    }

    #[test]
    fn unifies_quotes_and_dashes() {
        assert_eq!(
            normalize("школа «Радуга»"),
            normalize("школа \"Радуга\"")
        );
        assert_eq!(
            normalize("торгово–экономический"),
            normalize("торгово-экономический")
        );
    }

    #[test]
    fn empty_and_blank_are_valid() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("()!?"), "");
    }

    #[rstest]
    #[case("Школа №5")]
    #[case("УО «Гомельский государственный университет им. Ф. Скорины»")]
    #[case("г. Гомель, ул. Ленина")]
    #[case("")]
    #[case("No5 (brackets) — dash")]
    fn idempotent(#[case] input: &str) {
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn keywords_respect_min_length() {
        let kws = extract_keywords("УО школа им. Пушкина №5", 3);
        assert_eq!(kws, vec!["школа", "имени", "пушкина", "номер"]);
    }
}
