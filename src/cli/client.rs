use anyhow::{anyhow, Context};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Thin HTTP client for the SalesDesk API
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        url::Url::parse(base_url).with_context(|| format!("invalid API URL '{}'", base_url))?;

        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("salesdesk-cli/", env!("CARGO_PKG_VERSION")))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Request a protected route; the `data` field of the success envelope
    pub async fn data(&self, method: Method, path: &str, body: Option<&Value>) -> anyhow::Result<Value> {
        if self.token.is_none() {
            return Err(anyhow!("No token set. Run `salesdesk login` and pass --token or SALESDESK_TOKEN"));
        }

        let (status, mut body) = self.send(method, path, body).await?;
        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return Err(anyhow!("{} ({})", message, status));
        }
        Ok(body.get_mut("data").map(Value::take).unwrap_or(Value::Null))
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        let status = response.status();
        let text = response.text().await?;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, value))
    }
}
