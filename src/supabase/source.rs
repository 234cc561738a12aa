// src/supabase/source.rs
use crate::supabase::client::SupabaseClient;
use crate::utils::error::SupabaseError;
use std::collections::HashMap;

/// Anything that can hand over the full text of one export by game id.
/// `Ok(None)` means the document does not exist (or has no content).
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    async fn fetch_document(&self, game_id: &str) -> Result<Option<String>, SupabaseError>;
}

impl DocumentSource for SupabaseClient {
    async fn fetch_document(&self, game_id: &str) -> Result<Option<String>, SupabaseError> {
        self.csv_content(game_id).await
    }
}

/// Documents held in memory, keyed by game id. Backs local files in the CLI.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, game_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(game_id.into(), text.into());
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for MemorySource {
    async fn fetch_document(&self, game_id: &str) -> Result<Option<String>, SupabaseError> {
        Ok(self.documents.get(game_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_lookup() {
        let source = MemorySource::new().with_document("g1", "Play-by-Play Data\nQ,P\n1,Run");
        assert_eq!(source.len(), 1);

        let found = tokio_test::block_on(source.fetch_document("g1")).unwrap();
        assert!(found.unwrap().starts_with("Play-by-Play Data"));

        let missing = tokio_test::block_on(source.fetch_document("g2")).unwrap();
        assert!(missing.is_none());
    }
}
