//! Abbreviation detection and expansion matching
//!
//! Detects abbreviation-shaped strings (acronyms, dotted initials, short
//! uppercase runs) and pairs each with the input strings that plausibly
//! spell it out. The heuristics are deliberately permissive; overlapping
//! groups are reconciled by the merger.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::GrouperConfig;
use crate::error::StageError;
use crate::group::{Group, GroupSet};

lazy_static! {
    /// Letters separated by periods: "А.Б.В." or "A.B.C".
    static ref DOTTED_LETTERS: Regex = Regex::new(r"^\p{Lu}(?:\.\p{Lu})+\.?$").unwrap();
    /// Uppercase run optionally trailed by digits/punctuation: "СШ №5".
    static ref CAPS_RUN_TAIL: Regex = Regex::new(r"^\p{Lu}{2,}[\s\d\p{P}\p{S}]*$").unwrap();
    /// Uppercase run followed by one or two words: "СШ Пушкина".
    static ref CAPS_RUN_WORDS: Regex = Regex::new(r"^\p{Lu}{2,}(?:\s+\S+){1,2}$").unwrap();
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();

    /// Short connective words ignored when building initialisms.
    static ref STOPWORDS: HashSet<&'static str> = [
        "и", "в", "на", "по", "за", "из", "для", "при", "им", "имени", "г", "уо", "гуо",
    ]
    .into_iter()
    .collect();

    /// Keywords marking education-domain strings for the bigram heuristic.
    static ref EDUCATION_KEYWORDS: &'static [&'static str] = &[
        "университет", "институт", "академия", "колледж", "школа",
        "гимназия", "лицей", "техникум", "училище",
    ];
}

/// Organizational markers that may prefix an abbreviated name.
const ORG_MARKERS: &[&str] = &["УО", "ГУО", "ГО", "ЧУО"];

/// Does the string look like an abbreviation?
pub fn is_candidate_abbreviation(s: &str, config: &GrouperConfig) -> bool {
    let s = s.trim();
    let len = s.chars().count();
    if len < 2 {
        return false;
    }

    // Entirely uppercase letters: "ГГУ", "МГУ".
    if len <= config.max_acronym_len && s.chars().all(|c| c.is_alphabetic() && c.is_uppercase()) {
        return true;
    }

    if DOTTED_LETTERS.is_match(s) {
        return true;
    }

    if len <= config.max_acronym_len && CAPS_RUN_TAIL.is_match(s) {
        return true;
    }

    if len <= config.max_abbreviation_len && CAPS_RUN_WORDS.is_match(s) {
        return true;
    }

    // Multi-word string of capitalized words whose initials form an acronym.
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() >= 2
        && words.len() <= config.max_acronym_len
        && words
            .iter()
            .all(|w| w.chars().next().is_some_and(char::is_uppercase))
    {
        return true;
    }

    // Organizational marker followed by an uppercase-led remainder.
    if words.len() >= 2
        && ORG_MARKERS.contains(&words[0].to_uppercase().as_str())
        && words[1].chars().next().is_some_and(char::is_uppercase)
    {
        return true;
    }

    false
}

/// Reduce an abbreviation to its comparable core: drop a leading
/// organizational marker, keep uppercase letters, lowercase the result.
pub(crate) fn cleaned(s: &str) -> String {
    let s = s.trim();
    let rest = match s.split_once(char::is_whitespace) {
        Some((first, rest)) if ORG_MARKERS.contains(&first.to_uppercase().as_str()) => rest,
        _ => s,
    };
    rest.chars()
        .filter(|c| c.is_uppercase())
        .collect::<String>()
        .to_lowercase()
}

/// Is `full` a plausible expansion of the cleaned abbreviation?
fn expands_to(cleaned_abbrev: &str, full: &str, config: &GrouperConfig) -> bool {
    let full_lower = full.to_lowercase();
    let words: Vec<&str> = WORD
        .find_iter(&full_lower)
        .map(|m| m.as_str())
        .collect();

    // Whole-word occurrence
    if words.iter().any(|w| *w == cleaned_abbrev) {
        return true;
    }

    // Initialism over all words
    let initials: String = words
        .iter()
        .filter_map(|w| w.chars().next())
        .collect();
    if initials.contains(cleaned_abbrev) {
        return true;
    }

    // Initialism over significant words only
    let significant: String = words
        .iter()
        .filter(|w| w.chars().count() > 3 && !STOPWORDS.contains(*w))
        .filter_map(|w| w.chars().next())
        .collect();
    if significant == cleaned_abbrev || significant.contains(cleaned_abbrev) {
        return true;
    }

    if is_subsequence(cleaned_abbrev, &full_lower) {
        return true;
    }

    // Education-domain strings tolerate partial overlap of the
    // abbreviation's 2-character windows.
    if EDUCATION_KEYWORDS.iter().any(|k| full_lower.contains(k)) {
        let chars: Vec<char> = cleaned_abbrev.chars().collect();
        let windows: Vec<String> = chars.windows(2).map(|w| w.iter().collect()).collect();
        if !windows.is_empty() {
            let present = windows
                .iter()
                .filter(|w| full_lower.contains(w.as_str()))
                .count();
            if present as f64 / windows.len() as f64 >= config.bigram_overlap_ratio {
                return true;
            }
        }
    }

    false
}

/// Every character of `needle` occurs in `haystack` in increasing order.
fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}

/// Pair abbreviation candidates with their plausible expansions.
pub fn match_abbreviations(
    strings: &[String],
    config: &GrouperConfig,
) -> Result<GroupSet, StageError> {
    let mut groups = GroupSet::new();

    for (i, a) in strings.iter().enumerate() {
        if !is_candidate_abbreviation(a, config) {
            continue;
        }
        let core = cleaned(a);
        if core.chars().count() < 2 {
            continue;
        }

        let mut members: Vec<&str> = vec![a.as_str()];
        for (j, full) in strings.iter().enumerate() {
            if i == j || full.chars().count() < core.chars().count() {
                continue;
            }
            if expands_to(&core, full, config) {
                members.push(full.as_str());
            }
        }

        if members.len() >= 2 {
            // Longest member names the group; ties go to input order, so
            // only a strictly longer member displaces the current pick.
            let mut representative = members[0];
            for &m in &members[1..] {
                if m.chars().count() > representative.chars().count() {
                    representative = m;
                }
            }
            groups.insert(Group::with_members(representative, members));
        }
    }

    Ok(groups)
}
