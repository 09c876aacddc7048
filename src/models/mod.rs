//! Core data models: match records and the statistics derived from them.

mod ids;
mod match_record;
mod season;
mod stats;

pub use ids::*;
pub use match_record::*;
pub use season::*;
pub use stats::*;
