// ABOUTME: HTTP client for the HubDB tables API
// ABOUTME: Implements HubDbApi over reqwest with bearer-token auth

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::api::HubDbApi;
use super::models::{
    BatchResponse, BatchSummary, PageRequest, PublishResponse, RowId, RowInput, RowPage, Table,
    TableHandle, TableId,
};
use crate::config::Account;
use crate::document::TableSchema;
use crate::error::{Error, Result};

/// Default HubSpot API base URL
pub const DEFAULT_API_URL: &str = "https://api.hubapi.com";

const HUBDB_API_PATH: &str = "cms/v3/hubdb";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Wrapper for batch request bodies
#[derive(Debug, Serialize)]
struct BatchInput<'a, T> {
    inputs: &'a [T],
}

/// HubDB API client bound to one account
pub struct HubDbClient {
    client: Client,
    api_base_url: Url,
    account_id: u64,
    access_token: String,
}

impl HubDbClient {
    /// Create a new client for an account
    ///
    /// # Arguments
    ///
    /// * `account` - Account whose id and access token sign every request.
    ///   Its `api_base_url` defaults to https://api.hubapi.com
    ///
    /// # Returns
    ///
    /// A client rooted at `<base>/cms/v3/hubdb/`, or `InvalidUrl` for a bad base URL
    pub fn new(account: &Account) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| Error::Transport {
                operation: "build HTTP client",
                source,
            })?;

        let base = account
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/');
        let api_base_url = Url::parse(&format!("{}/{}/", base, HUBDB_API_PATH))?;

        Ok(Self {
            client,
            api_base_url,
            account_id: account.account_id,
            access_token: account.access_token.clone(),
        })
    }

    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.api_base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
            .query(&[("portalId", self.account_id)])
    }

    /// Send a request and return the response when the status is a success.
    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
        subject: &str,
    ) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| Error::Transport { operation, source })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(subject.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http {
                operation,
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
        subject: &str,
    ) -> Result<T> {
        let response = self.send(request, operation, subject).await?;
        response
            .json()
            .await
            .map_err(|source| Error::Transport { operation, source })
    }
}

#[async_trait]
impl HubDbApi for HubDbClient {
    async fn create_table(&self, schema: &TableSchema) -> Result<TableHandle> {
        let url = self.url("tables")?;
        let request = self.client.post(url).json(schema);
        self.send_json(request, "create table", &format!("Table {}", schema.name))
            .await
    }

    async fn update_table(&self, table_id: &TableId, schema: &TableSchema) -> Result<TableHandle> {
        let url = self.url(&format!("tables/{}/draft", table_id))?;
        let request = self.client.patch(url).json(schema);
        self.send_json(request, "update table", &format!("Table {}", table_id))
            .await
    }

    async fn fetch_table(&self, table_id: &TableId) -> Result<Table> {
        let url = self.url(&format!("tables/{}", table_id))?;
        let request = self.client.get(url);
        self.send_json(request, "fetch table", &format!("Table {}", table_id))
            .await
    }

    async fn fetch_rows(&self, table_id: &TableId, page: &PageRequest) -> Result<RowPage> {
        let url = self.url(&format!("tables/{}/rows/draft", table_id))?;
        let request = self.client.get(url).query(&page.query());
        self.send_json(request, "fetch rows", &format!("Table {}", table_id))
            .await
    }

    async fn create_rows(&self, table_id: &TableId, rows: &[RowInput]) -> Result<BatchResponse> {
        let url = self.url(&format!("tables/{}/rows/draft/batch/create", table_id))?;
        let request = self.client.post(url).json(&BatchInput { inputs: rows });
        self.send_json(request, "create rows", &format!("Table {}", table_id))
            .await
    }

    async fn update_rows(&self, table_id: &TableId, rows: &[RowInput]) -> Result<BatchResponse> {
        let url = self.url(&format!("tables/{}/rows/draft/batch/update", table_id))?;
        let request = self.client.post(url).json(&BatchInput { inputs: rows });
        self.send_json(request, "update rows", &format!("Table {}", table_id))
            .await
    }

    async fn delete_rows(&self, table_id: &TableId, row_ids: &[RowId]) -> Result<BatchResponse> {
        let url = self.url(&format!("tables/{}/rows/draft/batch/purge", table_id))?;
        let request = self.client.post(url).json(&BatchInput { inputs: row_ids });
        let response = self
            .send(request, "delete rows", &format!("Table {}", table_id))
            .await?;

        // Purge answers 204 with no body when every id was removed
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(BatchResponse::Summary(BatchSummary {
                row_ids: Some(
                    row_ids
                        .iter()
                        .map(|id| serde_json::Value::String(id.to_string()))
                        .collect(),
                ),
                ..BatchSummary::default()
            }));
        }

        response.json().await.map_err(|source| Error::Transport {
            operation: "delete rows",
            source,
        })
    }

    async fn publish_table(&self, table_id: &TableId) -> Result<PublishResponse> {
        let url = self.url(&format!("tables/{}/draft/publish", table_id))?;
        let request = self.client.post(url);
        self.send_json(request, "publish table", &format!("Table {}", table_id))
            .await
    }

    async fn delete_table(&self, table_id: &TableId) -> Result<()> {
        let url = self.url(&format!("tables/{}", table_id))?;
        let request = self.client.delete(url);
        self.send(request, "delete table", &format!("Table {}", table_id))
            .await?;
        Ok(())
    }
}
