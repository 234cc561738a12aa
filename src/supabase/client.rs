// src/supabase/client.rs
use crate::supabase::config::SupabaseConfig;
use crate::supabase::models::HalftimeExport;
use crate::utils::error::SupabaseError;
use reqwest::header;
use std::time::Duration;

const USER_AGENT: &str = concat!("halftime_exports/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Filters for the exports table, mapped onto PostgREST query parameters.
#[derive(Debug, Clone, Default)]
pub struct ExportQuery {
    select: Option<String>,
    game_id: Option<String>,
    year: Option<i32>,
    week: Option<i32>,
    team: Option<String>,
    successful_only: bool,
    limit: Option<usize>,
}

impl ExportQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma-separated column list; `*` when unset.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn game_id(mut self, game_id: &str) -> Self {
        self.game_id = Some(game_id.to_string());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn week(mut self, week: i32) -> Self {
        self.week = Some(week);
        self
    }

    /// Case-insensitive substring match on either team.
    pub fn team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }

    pub fn successful_only(mut self) -> Self {
        self.successful_only = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.select.clone().unwrap_or_else(|| "*".to_string()),
        )];

        if let Some(game_id) = &self.game_id {
            params.push(("game_id".to_string(), format!("eq.{}", game_id)));
        }
        if let Some(year) = self.year {
            params.push(("year".to_string(), format!("eq.{}", year)));
        }
        if let Some(week) = self.week {
            params.push(("week".to_string(), format!("eq.{}", week)));
        }
        if let Some(team) = &self.team {
            // PostgREST reserves these inside or=(...)
            let term: String = team
                .chars()
                .filter(|c| !matches!(c, ',' | '(' | ')' | '"'))
                .collect();
            params.push((
                "or".to_string(),
                format!("(home_team.ilike.*{0}*,away_team.ilike.*{0}*)", term.trim()),
            ));
        }
        if self.successful_only {
            params.push(("email_status".to_string(), "eq.success".to_string()));
        }
        params.push(("order".to_string(), "created_at.desc".to_string()));
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// REST client for the exports table.
pub struct SupabaseClient {
    http: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn request(&self, query: &ExportQuery) -> reqwest::RequestBuilder {
        self.http
            .get(self.config.rest_url())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .query(&query.to_params())
    }

    /// Fetches all rows matching `query`.
    pub async fn list_exports(&self, query: &ExportQuery) -> Result<Vec<HalftimeExport>, SupabaseError> {
        let url = self.config.rest_url();
        tracing::info!("Querying {} with {:?}", url, query);

        let response = self.request(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                tracing::warn!("Received {} - check the API key.", status);
                return Err(SupabaseError::Unauthorized);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                tracing::warn!("Received 404 Not Found for URL: {}", url);
                return Err(SupabaseError::NotFound(url));
            }
            return Err(SupabaseError::Http(status));
        }

        let body = response.text().await?;
        let rows: Vec<HalftimeExport> =
            serde_json::from_str(&body).map_err(|e| SupabaseError::Parse(e.to_string()))?;
        tracing::debug!("Received {} rows ({} bytes)", rows.len(), body.len());
        Ok(rows)
    }

    pub async fn all_exports(&self) -> Result<Vec<HalftimeExport>, SupabaseError> {
        self.list_exports(&ExportQuery::new()).await
    }

    pub async fn exports_by_week(&self, year: i32, week: i32) -> Result<Vec<HalftimeExport>, SupabaseError> {
        self.list_exports(&ExportQuery::new().year(year).week(week)).await
    }

    pub async fn exports_by_team(&self, team: &str) -> Result<Vec<HalftimeExport>, SupabaseError> {
        self.list_exports(&ExportQuery::new().team(team)).await
    }

    pub async fn successful_exports(&self) -> Result<Vec<HalftimeExport>, SupabaseError> {
        self.list_exports(&ExportQuery::new().successful_only()).await
    }

    /// The stored export text for one game; `None` when there is no row
    /// or the row has no content (failed exports).
    pub async fn csv_content(&self, game_id: &str) -> Result<Option<String>, SupabaseError> {
        let query = ExportQuery::new().select("csv_content").game_id(game_id).limit(1);
        let rows = self.list_exports(&query).await?;
        let content = rows.into_iter().next().and_then(|row| row.csv_content);
        if content.is_none() {
            tracing::info!("No CSV content found for game_id: {}", game_id);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_query_selects_everything() {
        let params = ExportQuery::new().to_params();
        assert_eq!(param(&params, "select"), Some("*"));
        assert_eq!(param(&params, "order"), Some("created_at.desc"));
        assert_eq!(param(&params, "limit"), None);
    }

    #[test]
    fn test_week_and_success_filters() {
        let params = ExportQuery::new().year(2025).week(8).successful_only().to_params();
        assert_eq!(param(&params, "year"), Some("eq.2025"));
        assert_eq!(param(&params, "week"), Some("eq.8"));
        assert_eq!(param(&params, "email_status"), Some("eq.success"));
    }

    #[test]
    fn test_team_filter_matches_either_side() {
        let params = ExportQuery::new().team("Chiefs, (KC)").to_params();
        assert_eq!(
            param(&params, "or"),
            Some("(home_team.ilike.*Chiefs KC*,away_team.ilike.*Chiefs KC*)")
        );
    }

    #[test]
    fn test_content_query_shape() {
        let params = ExportQuery::new().select("csv_content").game_id("401772938").limit(1).to_params();
        assert_eq!(param(&params, "select"), Some("csv_content"));
        assert_eq!(param(&params, "game_id"), Some("eq.401772938"));
        assert_eq!(param(&params, "limit"), Some("1"));
    }

    #[test]
    fn test_request_carries_credentials() {
        let client = SupabaseClient::new(SupabaseConfig::new("https://example.supabase.co", "anon-key")).unwrap();
        let request = client.request(&ExportQuery::new().week(3)).build().unwrap();

        assert_eq!(request.url().path(), "/rest/v1/halftime_exports");
        assert!(request.url().query().unwrap().contains("week=eq.3"));
        assert_eq!(request.headers()["apikey"], "anon-key");
        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer anon-key");
    }
}
