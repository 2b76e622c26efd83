// src/fetch/mod.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{ExportError, Result};
use crate::transform::CellGrid;

/// OAuth2 token acquisition for a service account.
pub mod auth {
    use google_cloud_auth::{
        credentials::CredentialsFile,
        project::{create_token_source_from_credentials, Config},
        token_source::TokenSource,
    };

    use crate::error::Result;

    pub const SCOPES: [&str; 1] = ["https://www.googleapis.com/auth/spreadsheets.readonly"];

    /// Exchange the service-account credentials for a read-only access token.
    pub async fn access_token(credentials: &CredentialsFile) -> Result<String> {
        let config = Config::default().with_scopes(&SCOPES);
        let source = create_token_source_from_credentials(credentials, &config).await?;
        let token = source.token().await?;
        Ok(token.access_token)
    }
}

/// Body of `spreadsheets.values.get`. `values` is omitted entirely when the
/// range is empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn into_grid(self) -> CellGrid {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `{base}/v4/spreadsheets/{sheet_id}/values/{range}`, each segment escaped.
pub fn values_url(base: &Url, sheet_id: &str, range: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ExportError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", sheet_id, "values", range]);
    Ok(url)
}

/// GET one range with an already-acquired bearer token.
pub async fn fetch_values(client: &Client, url: &Url, token: &str) -> Result<CellGrid> {
    let remote = |source| ExportError::Remote {
        url: url.to_string(),
        source,
    };

    debug!(%url, "requesting values");
    let body: ValueRange = client
        .get(url.clone())
        .bearer_auth(token)
        .send()
        .await
        .map_err(remote)?
        .error_for_status()
        .map_err(remote)?
        .json()
        .await
        .map_err(remote)?;

    debug!(range = ?body.range, rows = body.values.len(), "values received");
    Ok(body.into_grid())
}

/// Read the configured range with `token`.
#[instrument(
    level = "info",
    skip(client, cfg, token),
    fields(sheet = %cfg.sheet_id, range = %cfg.range)
)]
pub async fn fetch_grid(client: &Client, cfg: &Config, token: &str) -> Result<CellGrid> {
    let url = values_url(&cfg.api_base, &cfg.sheet_id, &cfg.range)?;
    let grid = fetch_values(client, &url, token).await?;
    info!(rows = grid.len(), "fetched grid");
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve_once;

    #[test]
    fn test_values_url() {
        let base = Url::parse("https://sheets.googleapis.com").unwrap();
        let url = values_url(&base, "abc123", "Stevner").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Stevner"
        );
    }

    #[test]
    fn test_values_url_escapes_range() {
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        let url = values_url(&base, "abc", "My Sheet/2024").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/v4/spreadsheets/abc/values/My%20Sheet%2F2024"
        );
    }

    #[test]
    fn test_missing_values_is_empty_grid() {
        let body: ValueRange =
            serde_json::from_str(r#"{"range":"Stevner!A1:Z1000","majorDimension":"ROWS"}"#)
                .unwrap();
        assert!(body.into_grid().is_empty());
    }

    #[test]
    fn test_jagged_rows_and_non_string_cells() {
        let body: ValueRange = serde_json::from_str(
            r#"{"values":[["Name","Date","Count"],["Alice","2024-01-01",3],["Bob",null]]}"#,
        )
        .unwrap();
        let grid = body.into_grid();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], vec!["Alice", "2024-01-01", "3"]);
        assert_eq!(grid[2], vec!["Bob", ""]);
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_token() {
        let (base, request) = serve_once(
            "200 OK",
            r#"{"range":"Stevner!A1:B3","values":[["Name","Date"],["Alice","2024-01-01"]]}"#,
        )
        .await;
        let url = values_url(&base, "sheet-1", "Stevner").unwrap();

        let grid = fetch_values(&Client::new(), &url, "test-token").await.unwrap();
        assert_eq!(grid, vec![vec!["Name", "Date"], vec!["Alice", "2024-01-01"]]);

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /v4/spreadsheets/sheet-1/values/stevner http/1.1"));
        assert!(request.contains("authorization: bearer test-token"));
    }

    #[tokio::test]
    async fn test_fetch_without_values_is_empty() {
        let (base, _request) = serve_once("200 OK", r#"{"range":"Stevner"}"#).await;
        let url = values_url(&base, "sheet-1", "Stevner").unwrap();

        let grid = fetch_values(&Client::new(), &url, "test-token").await.unwrap();
        assert!(grid.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_remote_error() {
        let (base, _request) =
            serve_once("500 Internal Server Error", r#"{"error":{"code":500}}"#).await;
        let url = values_url(&base, "sheet-1", "Stevner").unwrap();

        let err = fetch_values(&Client::new(), &url, "test-token")
            .await
            .unwrap_err();
        match err {
            ExportError::Remote { url: failed, source } => {
                assert_eq!(failed, url.to_string());
                assert_eq!(source.status().map(|s| s.as_u16()), Some(500));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_remote_error() {
        let (base, _request) = serve_once("200 OK", "<html>quota</html>").await;
        let url = values_url(&base, "sheet-1", "Stevner").unwrap();

        let err = fetch_values(&Client::new(), &url, "test-token")
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Remote { .. }));
    }
}
