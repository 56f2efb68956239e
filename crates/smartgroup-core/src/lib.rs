//! smartgroup-core: fuzzy grouping of free-text column values.
//!
//! Given the unique values of a text column (organization names entered
//! inconsistently across rows), the engine partitions them into clusters of
//! semantically-equivalent spellings, each with one representative label.
//! A filter UI can then offer one entry per cluster and resolve a chosen
//! label back into every spelling it covers.
//!
//! The pipeline runs fixed stages in priority order: seed table, curated
//! regex patterns, normalization buckets, abbreviation expansion, and
//! finally similarity clustering over whatever is left. Overlapping stage
//! output is merged by member intersection before singletons are filled in.
//!
//! The engine is synchronous and stateless across calls; a [`Grouper`] is
//! cheap to share between threads.

pub mod abbrev;
pub mod config;
pub mod error;
pub mod exact;
pub mod filter;
pub mod group;
pub mod normalize;
pub mod orchestration;
pub mod patterns;
pub mod seeds;
pub mod similarity;

pub use config::GrouperConfig;
pub use error::StageError;
pub use filter::{matches_keywords, resolve_filter, FilterMatch};
pub use group::{Group, GroupSet};
pub use normalize::{extract_keywords, normalize};
pub use orchestration::Grouper;
pub use patterns::PatternTable;
pub use seeds::SeedTable;
pub use similarity::similarity;
