// src/extractors/mod.rs
pub mod section;
pub mod table;

// Re-export key extraction types for convenience
pub use section::{BettingOdds, ConsensusOdds, ParsedDocument, SectionedCsvParser};
pub use table::{Table, TableBlock};
