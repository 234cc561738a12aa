// src/supabase/mod.rs
pub mod client;
pub mod config;
pub mod models;
pub mod source;

pub use client::{ExportQuery, SupabaseClient};
pub use config::SupabaseConfig;
pub use models::{ExportFilename, ExportSummary, HalftimeExport};
pub use source::{DocumentSource, MemorySource};
