// src/lib.rs
//! Fetches halftime export documents from the `halftime_exports` table and
//! splits their `csv_content` into metadata, betting odds and play-by-play.

pub mod extractors;
pub mod pipeline;
pub mod storage;
pub mod supabase;
pub mod utils;

pub use extractors::{BettingOdds, ConsensusOdds, ParsedDocument, SectionedCsvParser, Table, TableBlock};
pub use utils::AppError;
