//! Google Sheets ledger (Sheets API v4, `spreadsheets.values`)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::TokenSource;
use crate::traits::{Spreadsheet, StoreError, StoreResult};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Client bound to one spreadsheet.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    http_client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    base_url: String,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    /// # Arguments
    /// * `base_url` - API origin, `https://sheets.googleapis.com` in production
    pub fn new(
        http_client: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
        base_url: String,
        spreadsheet_id: String,
    ) -> Self {
        Self {
            http_client,
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id,
        }
    }

    /// `.../values/{range}{suffix}` with the range percent-encoded as one path segment.
    fn values_url(&self, range: &str, suffix: &str) -> StoreResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/v4/spreadsheets/{}/values",
            self.base_url, self.spreadsheet_id
        ))
        .map_err(|e| StoreError::ConfigError(format!("Invalid Sheets API URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| StoreError::ConfigError("Sheets API URL cannot be a base".to_string()))?
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn ensure_success(
    response: reqwest::Response,
    make_error: fn(String) -> StoreError,
) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(make_error(format!(
        "Sheets API returned {}: {}",
        status, error_text
    )))
}

#[async_trait]
impl Spreadsheet for GoogleSheetsClient {
    #[tracing::instrument(skip(self))]
    async fn read_range(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http_client
            .get(self.values_url(range, "")?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        let body: ValueRange = ensure_success(response, StoreError::ReadFailed)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::ReadFailed(format!("Invalid value range: {}", e)))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    #[tracing::instrument(skip(self, rows), fields(row_count = rows.len()))]
    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http_client
            .put(self.values_url(range, "")?)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": rows }))
            .send()
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        ensure_success(response, StoreError::WriteFailed).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, row))]
    async fn append_row(&self, range: &str, row: Vec<String>) -> StoreResult<()> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http_client
            .post(self.values_url(range, ":append")?)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        ensure_success(response, StoreError::WriteFailed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenSource;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> GoogleSheetsClient {
        GoogleSheetsClient::new(
            reqwest::Client::new(),
            Arc::new(StaticTokenSource("test-token".to_string())),
            server.url(),
            "sheet-1".to_string(),
        )
    }

    #[test]
    fn test_range_is_one_encoded_segment() {
        let client = GoogleSheetsClient::new(
            reqwest::Client::new(),
            Arc::new(StaticTokenSource("t".to_string())),
            "https://sheets.googleapis.com".to_string(),
            "sheet-1".to_string(),
        );
        let url = client.values_url("Contas a Pagar!A:G", ":append").unwrap();
        assert_eq!(
            url.path(),
            "/v4/spreadsheets/sheet-1/values/Contas%20a%20Pagar!A:G:append"
        );
    }

    #[tokio::test]
    async fn test_read_range_missing_values_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v4/spreadsheets/sheet-1/values/Lancamentos!A1:G1")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(r#"{"range":"Lancamentos!A1:G1","majorDimension":"ROWS"}"#)
            .create_async()
            .await;

        let rows = client(&server).read_range("Lancamentos!A1:G1").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_read_range_stringifies_cells() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v4/spreadsheets/sheet-1/values/Lancamentos!A1:G1")
            .with_status(200)
            .with_body(r#"{"values":[["DATA",1500,null]]}"#)
            .create_async()
            .await;

        let rows = client(&server).read_range("Lancamentos!A1:G1").await.unwrap();
        assert_eq!(rows, vec![vec!["DATA".to_string(), "1500".to_string(), String::new()]]);
    }

    #[tokio::test]
    async fn test_append_row_uses_insert_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v4/spreadsheets/sheet-1/values/Lancamentos!A:G:append")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("valueInputOption".into(), "USER_ENTERED".into()),
                Matcher::UrlEncoded("insertDataOption".into(), "INSERT_ROWS".into()),
            ]))
            .match_body(Matcher::Json(serde_json::json!({"values": [["a", "b"]]})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(&server)
            .append_row("Lancamentos!A:G", vec!["a".into(), "b".into()])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/v4/spreadsheets/sheet-1/values/Lancamentos!A1:G1")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("backend error")
            .create_async()
            .await;

        let err = client(&server)
            .write_range("Lancamentos!A1:G1", vec![vec!["DATA".into()]])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
    }
}
