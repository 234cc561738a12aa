// src/storage/mod.rs
use crate::extractors::{ParsedDocument, TableBlock};
use crate::supabase::ExportSummary;
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    // /base_dir/{year}/week_{week}/, "unknown" for missing parts
    fn target_dir(&self, summary: &ExportSummary) -> Result<PathBuf, StorageError> {
        let year = summary.year.map_or_else(|| "unknown".to_string(), |y| y.to_string());
        let week = summary.week.map_or_else(|| "unknown".to_string(), |w| w.to_string());
        let target_dir = self.base_dir.join(year).join(format!("week_{}", week));

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Writes the play-by-play block as a standalone CSV file.
    pub fn save_play_by_play(&self, summary: &ExportSummary, block: &TableBlock) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(summary)?.join(summary.plays_filename());

        let mut contents = block.to_csv_string();
        contents.push('\n');
        fs::write(&file_path, contents).map_err(StorageError::IoError)?;

        tracing::info!("Saved play-by-play to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the non-tabular parts of a document as JSON next to the plays file.
    pub fn save_document_metadata(&self, summary: &ExportSummary, document: &ParsedDocument) -> Result<PathBuf, StorageError> {
        let plays_name = summary.plays_filename();
        let stem = plays_name.strip_suffix(".csv").unwrap_or(&plays_name);
        let file_path = self.target_dir(summary)?.join(format!("{}_meta.json", stem));

        let metadata: Vec<serde_json::Value> = document
            .metadata
            .iter()
            .flatten()
            .map(|(field, value)| serde_json::json!({ "field": field, "value": value }))
            .collect();
        let odds = document.betting_odds.as_ref();

        let record = serde_json::json!({
            "game_id": summary.game_id,
            "year": summary.year,
            "week": summary.week,
            "matchup": summary.matchup(),
            "game_date": summary.game_date,
            "metadata": metadata,
            "consensus": odds.and_then(|o| o.consensus.as_ref()),
            "second_half_consensus": odds.and_then(|o| o.second_half_consensus.as_ref()),
            "sportsbook_count": odds.and_then(|o| o.sportsbooks.as_ref()).map_or(0, |b| b.rows.len()),
            "second_half_sportsbook_count": odds
                .and_then(|o| o.second_half_sportsbooks.as_ref())
                .map_or(0, |b| b.rows.len()),
            "play_count": document
                .play_by_play
                .as_ref()
                .map_or(0, |b| b.rows.iter().filter(|r| !r.trim().is_empty()).count()),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::SectionedCsvParser;
    use crate::supabase::HalftimeExport;

    const DOC: &str = "Game Metadata\nGame ID,401772938\nVenue,Arrowhead\n\nBetting Odds\nSpread,-3.5\n\nPlay-by-Play Data\nQuarter,Play\n1,Kickoff\n2,Rush\n";

    fn summary() -> ExportSummary {
        ExportSummary::from(&HalftimeExport {
            game_id: "401772938".to_string(),
            csv_filename: "NFL2025_8_KCvWSH_plays.csv".to_string(),
            email_status: "success".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_save_play_by_play_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();
        let block = SectionedCsvParser::new().extract_play_by_play(DOC).unwrap();

        let path = storage.save_play_by_play(&summary(), &block).unwrap();
        assert_eq!(path, dir.path().join("out/2025/week_8/NFL2025_8_KCvWSH_plays.csv"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Quarter,Play\n1,Kickoff\n2,Rush"));
    }

    #[test]
    fn test_stored_file_name_cannot_leave_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out");
        let storage = StorageManager::new(&base).unwrap();
        let summary = ExportSummary::from(&HalftimeExport {
            game_id: "401772938".to_string(),
            year: Some(2025),
            week: Some(8),
            csv_filename: "../../../escape.csv".to_string(),
            ..Default::default()
        });
        let block = SectionedCsvParser::new().extract_play_by_play(DOC).unwrap();

        let path = storage.save_play_by_play(&summary, &block).unwrap();
        assert_eq!(path, base.join("2025/week_8/escape.csv"));
        assert!(!dir.path().join("escape.csv").exists());
    }

    #[test]
    fn test_save_document_metadata_json() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let document = SectionedCsvParser::new().parse_document(DOC);

        let path = storage.save_document_metadata(&summary(), &document).unwrap();
        assert!(path.ends_with("NFL2025_8_KCvWSH_plays_meta.json"));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["matchup"], "WSH @ KC");
        assert_eq!(json["metadata"][1]["value"], "Arrowhead");
        assert_eq!(json["consensus"]["Spread"], "-3.5");
        assert!(json["second_half_consensus"].is_null());
        assert_eq!(json["play_count"], 2);
    }
}
