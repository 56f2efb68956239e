//! Similarity metric, clustering, and representative selection
//!
//! The metric blends character n-gram cosine overlap with normalized
//! Levenshtein distance. Strings are preprocessed first: normalized, domain
//! stopwords stripped, and a few long domain words substituted with short
//! canonical forms so synonymous phrasings share more character grams.
//!
//! Clustering builds an undirected graph with an edge wherever pairwise
//! similarity exceeds the threshold (strict), then takes connected
//! components via iterative union-find.

use std::collections::{BTreeMap, HashMap, HashSet};

use lazy_static::lazy_static;
use strsim::normalized_levenshtein;

use crate::config::GrouperConfig;
use crate::error::StageError;
use crate::group::{Group, GroupSet};
use crate::normalize::normalize;

lazy_static! {
    /// Filler words that carry no identity in institution names.
    static ref DOMAIN_STOPWORDS: HashSet<&'static str> = [
        "учреждение",
        "учреждения",
        "образования",
        "образовательное",
        "имени",
        "города",
        "района",
        "области",
    ]
    .into_iter()
    .collect();
}

/// Long domain words replaced by a short canonical form (prefix match, so
/// gender/case endings collapse too).
const DOMAIN_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("государственн", "гос"),
    ("общеобразовательн", "общеобр"),
    ("профессиональн", "проф"),
    ("специализированн", "спец"),
];

/// Pairwise similarity of two raw strings, in `[0, 1]`, symmetric,
/// 1.0 for strings with identical preprocessed forms.
pub fn similarity(a: &str, b: &str) -> f64 {
    score_processed(&preprocess(a), &preprocess(b))
}

/// Normalize and compact a string for similarity comparison.
pub(crate) fn preprocess(s: &str) -> String {
    normalize(s)
        .split_whitespace()
        .filter(|w| !DOMAIN_STOPWORDS.contains(w))
        .map(|w| {
            for (long, short) in DOMAIN_SUBSTITUTIONS {
                if w.starts_with(long) {
                    return *short;
                }
            }
            w
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score two already-preprocessed strings.
pub(crate) fn score_processed(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let cosine = ngram_cosine(a, b);
    let lev = normalized_levenshtein(a, b);

    clamp_unit(cosine * 0.6 + lev * 0.4)
}

/// Character n-gram (2..=3) cosine similarity over space-padded strings.
fn ngram_cosine(a: &str, b: &str) -> f64 {
    let counts_a = ngram_counts(a);
    let counts_b = ngram_counts(b);

    let dot: f64 = counts_a
        .iter()
        .filter_map(|(gram, &ca)| counts_b.get(gram).map(|&cb| ca * cb))
        .sum();
    let norm_a: f64 = counts_a.values().map(|c| c * c).sum::<f64>().sqrt();
    let norm_b: f64 = counts_b.values().map(|c| c * c).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

// BTreeMap keeps summation order fixed; HashMap iteration order would make
// the floating-point score depend on hasher state.
fn ngram_counts(s: &str) -> BTreeMap<String, f64> {
    let padded: Vec<char> = format!(" {} ", s).chars().collect();
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();

    for n in 2..=3 {
        if padded.len() < n {
            continue;
        }
        for window in padded.windows(n) {
            *counts.entry(window.iter().collect()).or_insert(0.0) += 1.0;
        }
    }

    counts
}

/// Floating-point artifacts outside `[0, 1]` are corrected, never surfaced.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Cluster strings by thresholded pairwise similarity.
///
/// Components of size 1 are not emitted; they fall through to the
/// orchestrator's singleton pass.
pub fn cluster(strings: &[String], config: &GrouperConfig) -> Result<GroupSet, StageError> {
    // Scores are clamped to [0, 1]; a threshold outside that range (or NaN)
    // cannot cluster anything, so surface the misconfiguration instead of
    // silently producing singletons.
    if !(0.0..=1.0).contains(&config.similarity_threshold) {
        return Err(StageError::Similarity(format!(
            "similarity threshold {} is outside [0, 1]",
            config.similarity_threshold
        )));
    }

    if strings.len() < 2 {
        return Ok(GroupSet::new());
    }

    let processed: Vec<String> = strings.iter().map(|s| preprocess(s)).collect();
    let mut components = UnionFind::new(strings.len());

    for i in 0..strings.len() {
        for j in (i + 1)..strings.len() {
            let score = score_processed(&processed[i], &processed[j]);
            if score > config.similarity_threshold {
                components.union(i, j);
            }
        }
    }

    let mut buckets: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..strings.len() {
        buckets.entry(components.find(i)).or_default().push(i);
    }

    let empty_labels = HashSet::new();
    let mut groups = GroupSet::new();
    for indices in buckets.values() {
        if indices.len() < 2 {
            continue;
        }
        let members: Vec<&str> = indices.iter().map(|&i| strings[i].as_str()).collect();
        let representative = select_representative(&members, &empty_labels, config);
        groups.insert(Group::with_members(representative, members));
    }

    Ok(groups)
}

/// Pick the display label for a group of members.
///
/// A member equal to a known canonical label wins unconditionally.
/// Otherwise each member is scored on length closeness, uppercase density,
/// letters-and-spaces fraction, and mean similarity to the other members;
/// ties go to the earliest member.
pub fn select_representative(
    members: &[&str],
    known_labels: &HashSet<String>,
    config: &GrouperConfig,
) -> String {
    if let Some(known) = members.iter().find(|m| known_labels.contains(**m)) {
        return (*known).to_string();
    }
    if members.len() == 1 {
        return members[0].to_string();
    }

    let processed: Vec<String> = members.iter().map(|m| preprocess(m)).collect();
    let optimal = config.optimal_representative_len as f64;

    let mut best_index = 0;
    let mut best_score = f64::MIN;

    for (i, member) in members.iter().enumerate() {
        let total = member.chars().count() as f64;
        let length_score = 1.0 - (total - optimal).abs() / optimal.max(total);
        let (upper, clean) = if total > 0.0 {
            let upper = member.chars().filter(|c| c.is_uppercase()).count() as f64 / total;
            let clean = member
                .chars()
                .filter(|c| c.is_alphabetic() || c.is_whitespace())
                .count() as f64
                / total;
            (upper, clean)
        } else {
            (0.0, 0.0)
        };
        let centrality = processed
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, other)| score_processed(&processed[i], other))
            .sum::<f64>()
            / (members.len() - 1) as f64;

        let score = config.length_weight * length_score
            + config.uppercase_weight * upper
            + config.clean_weight * clean
            + config.centrality_weight * centrality;

        if score > best_score {
            best_score = score;
            best_index = i;
        }
    }

    members[best_index].to_string()
}

/// Iterative union-find with path halving.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
