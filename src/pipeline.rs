// src/pipeline.rs
use crate::extractors::{ParsedDocument, SectionedCsvParser, Table};
use crate::supabase::DocumentSource;
use crate::utils::AppError;

/// Fetches a document and runs every extractor over it.
/// `Ok(None)` when the source has no document for `game_id`.
pub async fn fetch_parsed<S: DocumentSource>(
    source: &S,
    parser: &SectionedCsvParser,
    game_id: &str,
) -> Result<Option<ParsedDocument>, AppError> {
    let Some(text) = source.fetch_document(game_id).await? else {
        tracing::info!("No document found for game_id: {}", game_id);
        return Ok(None);
    };
    tracing::debug!("Fetched document for {} ({} bytes)", game_id, text.len());
    Ok(Some(parser.parse_document(&text)))
}

/// Fetch, slice out the play-by-play section, and read it as a table.
/// A missing document or section is `Ok(None)`; malformed rows are errors.
pub async fn load_play_by_play<S: DocumentSource>(
    source: &S,
    parser: &SectionedCsvParser,
    game_id: &str,
) -> Result<Option<Table>, AppError> {
    let Some(text) = source.fetch_document(game_id).await? else {
        tracing::info!("No document found for game_id: {}", game_id);
        return Ok(None);
    };

    let Some(block) = parser.extract_play_by_play(&text) else {
        tracing::info!("Could not find 'Play-by-Play Data' section for game_id: {}", game_id);
        return Ok(None);
    };

    let table = block.to_table()?;
    tracing::info!("Loaded {} plays for game {}", table.len(), game_id);
    Ok(Some(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::MemorySource;
    use crate::utils::error::TableError;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_document("good", "Game Metadata\nGame ID,good\n\nPlay-by-Play Data\nQuarter,Play\n1,Kickoff\n2,Rush\n")
            .with_document("no-plays", "Game Metadata\nGame ID,no-plays\n")
            .with_document("bad", "Play-by-Play Data\nQuarter,Play\n1,Kickoff,Touchback\n")
    }

    #[test]
    fn test_load_play_by_play_table() {
        let parser = SectionedCsvParser::new();
        let table = tokio_test::block_on(load_play_by_play(&source(), &parser, "good"))
            .unwrap()
            .unwrap();
        assert_eq!(table.columns, vec!["Quarter", "Play"]);
        assert_eq!(table.column("Play"), Some(vec!["Kickoff", "Rush"]));
    }

    #[test]
    fn test_missing_document_and_section_are_none() {
        let parser = SectionedCsvParser::new();
        let src = source();
        assert!(tokio_test::block_on(load_play_by_play(&src, &parser, "absent")).unwrap().is_none());
        assert!(tokio_test::block_on(load_play_by_play(&src, &parser, "no-plays")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_rows_propagate() {
        let parser = SectionedCsvParser::new();
        let err = tokio_test::block_on(load_play_by_play(&source(), &parser, "bad")).unwrap_err();
        assert!(matches!(err, AppError::Table(TableError::MalformedRow { .. })));
    }

    #[test]
    fn test_fetch_parsed() {
        let parser = SectionedCsvParser::new();
        let doc = tokio_test::block_on(fetch_parsed(&source(), &parser, "good"))
            .unwrap()
            .unwrap();
        assert_eq!(doc.metadata_value("Game ID"), Some("good"));
        assert!(doc.betting_odds.is_none());
        assert_eq!(doc.play_by_play.unwrap().rows.len(), 3);
    }
}
