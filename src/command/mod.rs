//! Command classification
//!
//! Maps a spoken utterance to a [`CommandCategory`] by scanning ordered
//! keyword-pattern sets. Categories are evaluated in their declared order
//! and the first category with a matching trigger wins.

mod category;
mod classifier;
mod utterance;

pub use category::CommandCategory;
pub use classifier::{PatternClassifier, PatternSet};
pub use utterance::Utterance;
