// src/supabase/models.rs
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One row of the `halftime_exports` table.
/// Every column defaults so that narrow `select=` lists still deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HalftimeExport {
    pub id: String,
    pub game_id: String,
    pub year: Option<i32>,
    pub week: Option<i32>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub game_date: Option<String>,
    pub csv_filename: String,
    pub csv_path: Option<String>,
    pub csv_content: Option<String>,
    pub email_status: String,
    pub emailed_at: Option<DateTime<Utc>>,
    pub recipient_email: String,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl HalftimeExport {
    pub fn is_successful(&self) -> bool {
        self.email_status == "success"
    }
}

// NFL{year}_{week}_{HOME}v{AWAY}_plays.csv
static EXPORT_FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^NFL(\d{4})_(\d{1,2})_([A-Za-z0-9]+)v([A-Za-z0-9]+)_plays\.csv$")
        .expect("Failed to compile EXPORT_FILENAME_RE")
});

/// Fields encoded in a successful export's file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFilename {
    pub year: i32,
    pub week: i32,
    pub home_abbr: String,
    pub away_abbr: String,
}

impl ExportFilename {
    pub fn parse(name: &str) -> Option<Self> {
        let caps = EXPORT_FILENAME_RE.captures(name.trim())?;
        Some(Self {
            year: caps[1].parse().ok()?,
            week: caps[2].parse().ok()?,
            home_abbr: caps[3].to_string(),
            away_abbr: caps[4].to_string(),
        })
    }
}

/// Display-oriented view of a row, for listings and output paths.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub game_id: String,
    pub year: Option<i32>,
    pub week: Option<i32>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub game_date: Option<String>,
    pub csv_filename: String,
    pub email_status: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&HalftimeExport> for ExportSummary {
    fn from(row: &HalftimeExport) -> Self {
        // Older rows lack year/week/team columns; the file name still has them.
        let from_name = ExportFilename::parse(&row.csv_filename);
        let fallback = from_name.as_ref();
        Self {
            game_id: row.game_id.clone(),
            year: row.year.or(fallback.map(|f| f.year)),
            week: row.week.or(fallback.map(|f| f.week)),
            home_team: row.home_team.clone().or(fallback.map(|f| f.home_abbr.clone())),
            away_team: row.away_team.clone().or(fallback.map(|f| f.away_abbr.clone())),
            game_date: row.game_date.clone(),
            csv_filename: row.csv_filename.clone(),
            email_status: row.email_status.clone(),
            created_at: row.created_at,
        }
    }
}

impl ExportSummary {
    /// "Away @ Home"
    pub fn matchup(&self) -> String {
        format!(
            "{} @ {}",
            self.away_team.as_deref().unwrap_or("?"),
            self.home_team.as_deref().unwrap_or("?")
        )
    }

    /// File name to store the play-by-play under. Only the last path
    /// component of the stored name is used, so it stays inside the output directory.
    pub fn plays_filename(&self) -> String {
        let stored = Path::new(self.csv_filename.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty());
        match stored {
            Some(name) => name.to_string(),
            None => {
                let id: String = self
                    .game_id
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
                    .collect();
                format!("NFL_{}_plays.csv", id)
            }
        }
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.year.map_or_else(|| "?".to_string(), |y| y.to_string());
        let week = self.week.map_or_else(|| "?".to_string(), |w| w.to_string());
        write!(f, "{} Week {}: {} [{}]", year, week, self.matchup(), self.email_status)
    }
}
