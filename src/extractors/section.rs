// src/extractors/section.rs

// --- Imports ---
use crate::extractors::table::TableBlock;
use serde::Serialize;

// --- Section Markers ---
// Matched against the trimmed line, exact and case-sensitive.
pub const GAME_METADATA: &str = "Game Metadata";
pub const BETTING_ODDS: &str = "Betting Odds";
pub const FULL_GAME_SPORTSBOOKS: &str = "Individual Sportsbook Odds (Full Game)";
pub const SECOND_HALF_CONSENSUS: &str = "Second Half Consensus";
pub const SECOND_HALF_SPORTSBOOKS: &str = "Individual Sportsbook Odds (Second Half)";
pub const PLAY_BY_PLAY: &str = "Play-by-Play Data";

pub const MARKERS: [&str; 6] = [
    GAME_METADATA,
    BETTING_ODDS,
    FULL_GAME_SPORTSBOOKS,
    SECOND_HALF_CONSENSUS,
    SECOND_HALF_SPORTSBOOKS,
    PLAY_BY_PLAY,
];

// --- Consensus Keys ---
pub const HOME_MONEYLINE: &str = "Home Moneyline";
pub const AWAY_MONEYLINE: &str = "Away Moneyline";
pub const SPREAD: &str = "Spread";
pub const TOTAL: &str = "Total (Over/Under)";

// Informational lines inside the odds block; never odds even with a comma.
const EXCLUDED_PREFIXES: [&str; 3] = ["Odds Source", "Game State", "Last Updated"];

// Full-game sportsbook rows stop at the second-half heading lines.
const SECOND_HALF_PREFIX: &str = "Second Half";

// --- Data Structures ---

/// One aggregated set of betting lines (full game or second half).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsensusOdds {
    #[serde(rename = "Home Moneyline", skip_serializing_if = "Option::is_none")]
    pub home_moneyline: Option<String>,
    #[serde(rename = "Away Moneyline", skip_serializing_if = "Option::is_none")]
    pub away_moneyline: Option<String>,
    #[serde(rename = "Spread", skip_serializing_if = "Option::is_none")]
    pub spread: Option<String>,
    #[serde(rename = "Total (Over/Under)", skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

impl ConsensusOdds {
    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            HOME_MONEYLINE => Some(&mut self.home_moneyline),
            AWAY_MONEYLINE => Some(&mut self.away_moneyline),
            SPREAD => Some(&mut self.spread),
            TOTAL => Some(&mut self.total),
            _ => None,
        }
    }

    /// Looks a value up by its document label, e.g. `"Spread"`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Present entries in fixed key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (HOME_MONEYLINE, &self.home_moneyline),
            (AWAY_MONEYLINE, &self.away_moneyline),
            (SPREAD, &self.spread),
            (TOTAL, &self.total),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything found under the "Betting Odds" marker. Each part is only
/// present when its own marker was found and yielded content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BettingOdds {
    pub consensus: Option<ConsensusOdds>,
    pub sportsbooks: Option<TableBlock>,
    pub second_half_consensus: Option<ConsensusOdds>,
    pub second_half_sportsbooks: Option<TableBlock>,
}

impl BettingOdds {
    pub fn is_empty(&self) -> bool {
        self.consensus.is_none()
            && self.sportsbooks.is_none()
            && self.second_half_consensus.is_none()
            && self.second_half_sportsbooks.is_none()
    }
}

/// All sections of one export, each independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub metadata: Option<Vec<(String, String)>>,
    pub betting_odds: Option<BettingOdds>,
    pub play_by_play: Option<TableBlock>,
}

impl ParsedDocument {
    /// First metadata value recorded under `field`.
    pub fn metadata_value(&self, field: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }
}

// --- Line Helpers ---

// Splits on '\n' (not `lines()`) so trailing blank lines survive; tolerates CRLF.
fn document_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn is_marker(line: &str) -> bool {
    MARKERS.contains(&line.trim())
}

fn find_marker(lines: &[&str], marker: &str, from: usize) -> Option<usize> {
    lines
        .iter()
        .skip(from)
        .position(|line| line.trim() == marker)
        .map(|offset| offset + from)
}

// Splits on the first comma only; values may contain commas.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let (field, value) = line.split_once(',')?;
    Some((field.trim(), value.trim()))
}

// --- Main Parser ---

/// Extracts the labelled sections of an exported halftime document.
///
/// Every call is a fresh linear scan over the text it is given; the parser
/// holds no state, so one instance can be shared freely across threads.
/// A missing section is `None`, and so is a section whose marker was found
/// but which produced no pairs or rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionedCsvParser;

impl SectionedCsvParser {
    pub fn new() -> Self { Self }

    /// `field,value` pairs after "Game Metadata", in document order.
    pub fn extract_metadata(&self, text: &str) -> Option<Vec<(String, String)>> {
        let lines = document_lines(text);
        let Some(start) = find_marker(&lines, GAME_METADATA, 0) else {
            tracing::debug!("No '{}' marker in document", GAME_METADATA);
            return None;
        };

        let mut pairs = Vec::new();
        for line in &lines[start + 1..] {
            let trimmed = line.trim();
            // "Betting Odds" normally closes the block; any later marker does too.
            if is_marker(trimmed) {
                break;
            }
            if trimmed.is_empty() {
                continue;
            }
            if let Some((field, value)) = split_pair(trimmed) {
                pairs.push((field.to_string(), value.to_string()));
            }
        }

        if pairs.is_empty() {
            tracing::debug!("'{}' marker found but no pairs collected", GAME_METADATA);
            return None;
        }
        tracing::trace!("Extracted {} metadata pairs", pairs.len());
        Some(pairs)
    }

    /// Consensus and per-sportsbook odds for the full game and second half.
    /// `None` only when the "Betting Odds" marker is absent.
    pub fn extract_betting_odds(&self, text: &str) -> Option<BettingOdds> {
        let lines = document_lines(text);
        let Some(start) = find_marker(&lines, BETTING_ODDS, 0) else {
            tracing::debug!("No '{}' marker in document", BETTING_ODDS);
            return None;
        };

        let consensus = scan_consensus(&lines[start + 1..], false);

        let sportsbooks = find_marker(&lines, FULL_GAME_SPORTSBOOKS, start + 1)
            .and_then(|idx| {
                scan_sportsbooks(&lines, idx, |row| {
                    row.starts_with(SECOND_HALF_PREFIX) || row == PLAY_BY_PLAY
                })
            });

        let second_half_consensus = find_marker(&lines, SECOND_HALF_CONSENSUS, start + 1)
            .and_then(|idx| scan_consensus(&lines[idx + 1..], true));

        let second_half_sportsbooks = find_marker(&lines, SECOND_HALF_SPORTSBOOKS, start + 1)
            .and_then(|idx| scan_sportsbooks(&lines, idx, |row| row == PLAY_BY_PLAY));

        let odds = BettingOdds {
            consensus,
            sportsbooks,
            second_half_consensus,
            second_half_sportsbooks,
        };
        if odds.is_empty() {
            tracing::debug!("'{}' marker found but no odds sections extracted", BETTING_ODDS);
        }
        Some(odds)
    }

    /// Header and rows after "Play-by-Play Data", running to end of document.
    pub fn extract_play_by_play(&self, text: &str) -> Option<TableBlock> {
        let lines = document_lines(text);
        let Some(start) = find_marker(&lines, PLAY_BY_PLAY, 0) else {
            tracing::debug!("No '{}' marker in document", PLAY_BY_PLAY);
            return None;
        };
        let Some(header) = lines.get(start + 1) else {
            tracing::debug!("'{}' is the last line, no header follows", PLAY_BY_PLAY);
            return None;
        };

        let rows: Vec<String> = lines[start + 2..].iter().map(|l| l.to_string()).collect();
        // Blank trailing rows are kept, but blanks alone are not data.
        if rows.iter().all(|row| row.trim().is_empty()) {
            tracing::debug!("'{}' has a header but no rows", PLAY_BY_PLAY);
            return None;
        }
        tracing::trace!("Extracted {} play-by-play rows", rows.len());
        Some(TableBlock::new(*header, rows))
    }

    /// Runs every extractor over the same text.
    pub fn parse_document(&self, text: &str) -> ParsedDocument {
        ParsedDocument {
            metadata: self.extract_metadata(text),
            betting_odds: self.extract_betting_odds(text),
            play_by_play: self.extract_play_by_play(text),
        }
    }
}

/// Collects recognised odds keys until the next marker (or a blank line
/// when `stop_at_blank`). Later duplicates overwrite earlier ones.
fn scan_consensus(lines: &[&str], stop_at_blank: bool) -> Option<ConsensusOdds> {
    let mut odds = ConsensusOdds::default();
    for line in lines {
        let trimmed = line.trim();
        if is_marker(trimmed) || (stop_at_blank && trimmed.is_empty()) {
            break;
        }
        if EXCLUDED_PREFIXES.iter().any(|prefix| trimmed.starts_with(prefix)) {
            continue;
        }
        if let Some((key, value)) = split_pair(trimmed) {
            if let Some(slot) = odds.slot_mut(key) {
                *slot = Some(value.to_string());
            }
        }
    }

    if odds.is_empty() { None } else { Some(odds) }
}

/// Header is the line right after the marker; rows run until a blank line
/// or a line for which `ends_table` holds.
fn scan_sportsbooks(
    lines: &[&str],
    marker_idx: usize,
    ends_table: impl Fn(&str) -> bool,
) -> Option<TableBlock> {
    let header = lines.get(marker_idx + 1)?.trim();
    if header.is_empty() || is_marker(header) {
        tracing::debug!("Sportsbook marker at line {} has no header", marker_idx + 1);
        return None;
    }

    let rows: Vec<String> = lines[marker_idx + 2..]
        .iter()
        .map(|line| line.trim())
        .take_while(|row| !row.is_empty() && !ends_table(row))
        .map(str::to_string)
        .collect();

    if rows.is_empty() {
        return None;
    }
    Some(TableBlock::new(header, rows))
}
