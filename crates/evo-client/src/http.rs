//! Low-level HTTP access to the Evolution API
//!
//! Every request carries the `apikey` header and JSON content headers. Error
//! statuses become [`EvolutionError::Api`]; an empty or `null` body is
//! returned as an empty JSON object.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::{EvolutionError, Result};
use crate::settings::ApiSettings;

/// Header carrying the global API key
pub const API_KEY_HEADER: &str = "apikey";

/// Shared HTTP client bound to one gateway and instance
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    instance: String,
}

impl HttpClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let api_key = HeaderValue::from_str(&settings.api_key)
            .map_err(|e| EvolutionError::Config(format!("invalid API key: {}", e)))?;
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            instance: settings.instance.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Instance name used in instance-scoped endpoints
    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.request(Method::GET, endpoint, query, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, endpoint, &[], Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, endpoint, &[], Some(body)).await
    }

    /// PUT without a body
    pub async fn put_empty(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::PUT, endpoint, &[], None).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::DELETE, endpoint, &[], None).await
    }

    /// DELETE with a JSON body
    pub async fn delete_with<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.request(Method::DELETE, endpoint, &[], Some(body)).await
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(method = %method, url = %url, "Evolution API request");

        let mut request = self.client.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::handle_response(method, &url, response).await
    }

    async fn handle_response(method: Method, url: &str, response: Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_client_error() || status.is_server_error() {
            error!(method = %method, url = %url, status = status.as_u16(), "Evolution API error: {}", text);
            return Err(EvolutionError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        let value: Value = serde_json::from_str(&text)?;
        if value.is_null() {
            return Ok(Value::Object(Map::new()));
        }
        Ok(value)
    }
}
