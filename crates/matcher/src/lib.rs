//! `cpumark-matcher`: tiered lookup of CPU benchmark marks by free-text name.
//!
//! Pure engine crate: receives pre-loaded reference rows, returns match results.
//! No CLI or file IO; callers read files and hand over the contents.

pub mod assessor;
pub mod calibrate;
pub mod cascade;
pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod tokenize;

pub use assessor::Assessor;
pub use calibrate::{evaluate, Calibration, History};
pub use cascade::match_query;
pub use config::MarksConfig;
pub use error::MarkError;
pub use index::ReferenceIndex;
pub use model::{MarkRecord, MatchResult, MatchTier, QueryReport, ReferenceTable};
