use crate::domain::ports::DocumentStore;
use crate::utils::error::{Result, SyncError};
use reqwest::{Client, Response};
use serde_json::Value;

/// Firebase-style REST store: every key path maps to `{base}{path}.json`.
#[derive(Debug, Clone)]
pub struct RestDocumentStore {
    base_url: String,
    client: Client,
}

impl RestDocumentStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SyncError::Http {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

impl DocumentStore for RestDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url_for(path);
        tracing::debug!("Remote GET {}", url);
        let response = check_status(self.client.get(&url).send().await?)?;
        // 不存在的節點回傳 JSON null
        match response.json::<Value>().await? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn put(&self, path: &str, data: &Value) -> Result<()> {
        let url = self.url_for(path);
        tracing::debug!("Remote PUT {}", url);
        check_status(self.client.put(&url).json(data).send().await?)?;
        Ok(())
    }

    async fn post(&self, path: &str, data: &Value) -> Result<()> {
        let url = self.url_for(path);
        tracing::debug!("Remote POST {}", url);
        check_status(self.client.post(&url).json(data).send().await?)?;
        Ok(())
    }
}
