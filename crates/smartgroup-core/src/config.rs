//! Engine configuration
//!
//! The heuristics were hand-tuned against Russian educational-institution
//! names; the thresholds live here rather than inline so callers can adjust
//! them for a different corpus without forking the matchers.

/// Tunable thresholds and weights for the grouping pipeline.
#[derive(Debug, Clone)]
pub struct GrouperConfig {
    /// Minimum pairwise similarity for an edge in the clustering graph
    /// (strict inequality).
    pub similarity_threshold: f64,
    /// Fraction of an abbreviation's 2-character windows that must occur in
    /// a candidate expansion for the bigram-overlap heuristic.
    pub bigram_overlap_ratio: f64,
    /// Longest string still considered an abbreviation candidate.
    pub max_abbreviation_len: usize,
    /// Longest bare acronym (uppercase run, optionally with digits).
    pub max_acronym_len: usize,
    /// Representative scoring prefers strings near this length.
    pub optimal_representative_len: usize,
    /// Representative scoring: weight of length closeness.
    pub length_weight: f64,
    /// Representative scoring: weight of uppercase density.
    pub uppercase_weight: f64,
    /// Representative scoring: weight of the letters-and-spaces fraction.
    pub clean_weight: f64,
    /// Representative scoring: weight of mean similarity to other members.
    pub centrality_weight: f64,
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            bigram_overlap_ratio: 0.7,
            max_abbreviation_len: 15,
            max_acronym_len: 10,
            optimal_representative_len: 50,
            length_weight: 0.2,
            uppercase_weight: 0.3,
            clean_weight: 0.2,
            centrality_weight: 0.3,
        }
    }
}
