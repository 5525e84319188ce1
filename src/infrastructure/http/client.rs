//! Shared HTTP client for the remote API
//!
//! All calls ride on the session cookie held in the client's cookie jar.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::session_file::SessionFile;
use crate::application::ports::ApiError;
use crate::domain::config::DEFAULT_UPLOAD_PATH;

/// Error body shapes the server uses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    details: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

fn value_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Pick the human-readable message out of an error response:
/// `detail`, then `details`, then `error`, else `API Error: <status>`.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .detail
        .and_then(value_text)
        .or_else(|| parsed.details.and_then(value_text))
        .or_else(|| parsed.error.and_then(value_text))
        .unwrap_or_else(|| format!("API Error: {}", status))
}

/// Cookie-session client for the recording service
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    upload_path: String,
    jar: Arc<Jar>,
    session_file: Option<SessionFile>,
}

impl ApiClient {
    /// Create a client for `base_url` with an empty cookie jar
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Request(format!("Invalid API URL '{}': {}", base_url, e)))?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(concat!("voicedrop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base,
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            jar,
            session_file: None,
        })
    }

    /// Override the upload endpoint path
    pub fn with_upload_path(mut self, path: impl Into<String>) -> Self {
        self.upload_path = path.into();
        self
    }

    /// Restore a stored session and keep it updated on login/logout
    pub fn with_session_file(mut self, file: SessionFile) -> Self {
        if let Some(header) = file.load() {
            for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                self.jar.add_cookie_str(pair, &self.base);
            }
            tracing::debug!(path = %file.path().display(), "restored session cookie");
        }
        self.session_file = Some(file);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn upload_path(&self) -> &str {
        &self.upload_path
    }

    /// Absolute URL for an API path
    pub(crate) fn url(&self, path: &str) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Send a request, turning non-success statuses into `ApiError::Status`
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), %message, "API call failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a request and decode its JSON body
    pub(crate) async fn send_json<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Current `Cookie` header for the API origin
    pub fn session_cookie(&self) -> Option<String> {
        self.jar
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Write the current cookies to the session file, if one is configured
    pub(crate) fn persist_session(&self) {
        let (Some(file), Some(cookies)) = (&self.session_file, self.session_cookie()) else {
            return;
        };
        if let Err(e) = file.save(&cookies) {
            tracing::warn!(error = %e, path = %file.path().display(), "failed to store session");
        }
    }

    /// Expire every cookie in the jar and delete the session file
    pub(crate) fn forget_session(&self) {
        if let Some(header) = self.session_cookie() {
            for name in header
                .split(';')
                .filter_map(|pair| pair.split('=').next())
                .map(str::trim)
                .filter(|name| !name.is_empty())
            {
                self.jar
                    .add_cookie_str(&format!("{}=; Max-Age=0; Path=/", name), &self.base);
            }
        }
        if let Some(file) = &self.session_file {
            if let Err(e) = file.remove() {
                tracing::warn!(error = %e, "failed to remove session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_precedence() {
        assert_eq!(
            extract_error_message(400, r#"{"detail":"Invalid credentials","error":"x"}"#),
            "Invalid credentials"
        );
        assert_eq!(
            extract_error_message(500, r#"{"details":"bucket missing","error":"Upload failed"}"#),
            "bucket missing"
        );
        assert_eq!(
            extract_error_message(500, r#"{"error":"Upload failed"}"#),
            "Upload failed"
        );
        assert_eq!(extract_error_message(502, "<html>bad gateway</html>"), "API Error: 502");
        assert_eq!(extract_error_message(404, r#"{"detail":null}"#), "API Error: 404");
    }

    #[test]
    fn structured_detail_is_stringified() {
        let message = extract_error_message(422, r#"{"detail":[{"msg":"field required"}]}"#);
        assert!(message.contains("field required"));
    }

    #[test]
    fn url_joins_paths() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/api/auth/me"), "http://localhost:8000/api/auth/me");
        assert_eq!(client.url("recordings"), "http://localhost:8000/recordings");
        assert_eq!(client.upload_path(), "/api/audio/upload");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::Request(_))));
    }

    #[test]
    fn session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::with_path(dir.path().join("session"));
        file.save("session_id=xyz").unwrap();

        let client = ApiClient::new("http://localhost:8000")
            .unwrap()
            .with_session_file(file.clone());
        assert_eq!(client.session_cookie().as_deref(), Some("session_id=xyz"));

        client.forget_session();
        assert!(client.session_cookie().is_none());
        assert!(file.load().is_none());
    }
}
