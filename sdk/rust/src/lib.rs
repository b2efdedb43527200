//! HTTP client for the status board API.

use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL {0:?}")]
    InvalidBaseUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The board answered with an error body.
    #[error("status board returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// One requested check status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckUpdate {
    pub title: String,
    pub status: i64,
    #[serde(default)]
    pub details: String,
}

/// Body of the PATCH endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub name: String,
    pub health_checks: Vec<CheckUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedCheck {
    pub service_name: String,
    pub check_title: String,
    pub check_details: String,
}

/// 202 body of the PATCH endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchResult {
    pub message: String,
    pub service: String,
    pub applied: usize,
    pub health_checks: Vec<Value>,
    pub failed_updates: Vec<FailedCheck>,
}

pub struct BoardClient {
    client: Client,
    base_url: Url,
}

impl BoardClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// `base_url` joined with percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let res = self.client.get(self.url(&["health"])).send().await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn list_services(&self, summary: bool) -> Result<Vec<Value>, ClientError> {
        let mut req = self.client.get(self.url(&["services"]));
        if summary {
            req = req.query(&[("view", "summary")]);
        }
        Ok(check(req.send().await?).await?.json().await?)
    }

    pub async fn get_service(&self, name: &str) -> Result<Value, ClientError> {
        let res = self.client.get(self.url(&["services", name])).send().await?;
        Ok(check(res).await?.json().await?)
    }

    /// Create a service and return its id.
    pub async fn create_service<T: Serialize>(&self, service: &T) -> Result<i64, ClientError> {
        let res = self.client.post(self.url(&["services"])).json(service).send().await?;
        let body: Value = check(res).await?.json().await?;
        parse_id(&body)
    }

    pub async fn update_service<T: Serialize>(&self, name: &str, update: &T) -> Result<(), ClientError> {
        let res = self.client.put(self.url(&["services", name])).json(update).send().await?;
        check(res).await?;
        Ok(())
    }

    /// `Ok(false)` when the service did not exist.
    pub async fn delete_service(&self, name: &str) -> Result<bool, ClientError> {
        let res = self.client.delete(self.url(&["services", name])).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(res).await?;
        Ok(true)
    }

    /// Push check statuses for one service.
    pub async fn push_checks(&self, update: &StatusUpdate) -> Result<PatchResult, ClientError> {
        let res = self.client.patch(self.url(&["update"])).json(update).send().await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn dependencies(&self, name: &str) -> Result<Vec<Value>, ClientError> {
        let res = self
            .client
            .get(self.url(&["services", name, "dependencies"]))
            .send()
            .await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn add_dependency(&self, parent_id: i64, child_id: i64) -> Result<i64, ClientError> {
        let body = serde_json::json!({ "parent_id": parent_id, "child_id": child_id });
        let res = self.client.post(self.url(&["dependencies"])).json(&body).send().await?;
        let body: Value = check(res).await?.json().await?;
        parse_id(&body)
    }

    /// `Ok(false)` when no edge had this id.
    pub async fn remove_dependency(&self, id: i64) -> Result<bool, ClientError> {
        let id = id.to_string();
        let res = self.client.delete(self.url(&["dependencies", id.as_str()])).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(res).await?;
        Ok(true)
    }
}

async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);
    Err(ClientError::Api { status, message })
}

fn parse_id(body: &Value) -> Result<i64, ClientError> {
    body.get("id")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ClientError::Api {
            status: StatusCode::OK,
            message: format!("response carried no id: {}", body),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_percent_encoded() {
        let client = BoardClient::new("http://localhost:9091").unwrap();
        let url = client.url(&["services", "CI/CD framework"]);
        assert_eq!(url.as_str(), "http://localhost:9091/services/CI%2FCD%20framework");
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = BoardClient::new("http://localhost:9091/board/").unwrap();
        assert_eq!(client.url(&["health"]).as_str(), "http://localhost:9091/board/health");
    }

    #[test]
    fn test_rejects_bad_base() {
        assert!(matches!(BoardClient::new("not a url"), Err(ClientError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(&serde_json::json!({"id": "12"})).unwrap(), 12);
        assert!(parse_id(&serde_json::json!({"id": 12})).is_err());
    }
}
