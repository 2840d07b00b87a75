//! Crittercism symbol-upload HTTP API.
//!
//! Three calls with `Authorization: Bearer <token>`:
//! - `POST {files}/applications/{app}/symbol-uploads` → `{"resource-id": ..}`
//! - `PUT  {files}/applications/{app}/symbol-uploads/{id}` (multipart file)
//! - `POST {app}/app/{app}/symbols/uploads` (JSON)

use std::path::Path;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client as BlockingClient, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::error::{SymbolUploadError, SymbolUploadResult, UploadStep};
use crate::config::CrittercismSettings;

const INVALID_TOKEN_MARKER: &str = "Invalid token specified";

/// Symbol upload endpoints
pub trait SymbolApi: Send + Sync {
    /// Open an upload and return its resource id.
    fn create_upload(&self, app_id: &str) -> SymbolUploadResult<String>;

    fn upload_file(&self, app_id: &str, resource_id: &str, zip_path: &Path) -> SymbolUploadResult<()>;

    /// Ask the service to process the uploaded archive.
    fn process(&self, app_id: &str, resource_id: &str, filename: &str) -> SymbolUploadResult<()>;
}

#[derive(Debug, Deserialize)]
struct CreateUploadResponse {
    #[serde(rename = "resource-id")]
    resource_id: String,
}

/// Parse the create response body.
pub fn parse_resource_id(body: &str) -> SymbolUploadResult<String> {
    if body.contains(INVALID_TOKEN_MARKER) {
        return Err(SymbolUploadError::InvalidToken);
    }
    let response: CreateUploadResponse =
        serde_json::from_str(body).map_err(|e| SymbolUploadError::Decode(e.to_string()))?;
    Ok(response.resource_id)
}

/// Blocking `reqwest` implementation
pub struct HttpSymbolApi {
    http: BlockingClient,
    files_url: String,
    app_url: String,
    verbose: bool,
}

impl HttpSymbolApi {
    pub fn new(settings: &CrittercismSettings, oauth_token: &str, verbose: bool) -> SymbolUploadResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", oauth_token))
            .map_err(|_| SymbolUploadError::InvalidToken)?;
        headers.insert(AUTHORIZATION, bearer);

        let http = BlockingClient::builder()
            .default_headers(headers)
            .timeout(settings.http_timeout)
            .build()
            .map_err(|source| SymbolUploadError::Transport {
                step: UploadStep::Create,
                source,
            })?;

        Ok(Self {
            http,
            files_url: settings.files_url.trim_end_matches('/').to_string(),
            app_url: settings.app_url.trim_end_matches('/').to_string(),
            verbose,
        })
    }

    fn uploads_url(&self, app_id: &str) -> String {
        format!("{}/applications/{}/symbol-uploads", self.files_url, app_id)
    }

    /// Read the body and fail on a non-2xx status.
    fn finish(&self, step: UploadStep, response: Response) -> SymbolUploadResult<String> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|source| SymbolUploadError::Transport { step, source })?;

        if self.verbose {
            info!(%step, status = status.as_u16(), body = %body, "Crittercism response");
        } else {
            debug!(%step, status = status.as_u16(), "Crittercism response");
        }

        if !status.is_success() {
            if body.contains(INVALID_TOKEN_MARKER) {
                return Err(SymbolUploadError::InvalidToken);
            }
            return Err(SymbolUploadError::Api {
                step,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl SymbolApi for HttpSymbolApi {
    fn create_upload(&self, app_id: &str) -> SymbolUploadResult<String> {
        let step = UploadStep::Create;
        let response = self
            .http
            .post(self.uploads_url(app_id))
            .send()
            .map_err(|source| SymbolUploadError::Transport { step, source })?;
        let body = self.finish(step, response)?;
        parse_resource_id(&body)
    }

    fn upload_file(&self, app_id: &str, resource_id: &str, zip_path: &Path) -> SymbolUploadResult<()> {
        let step = UploadStep::Transfer;
        let form = Form::new()
            .text("name", "symbolUpload")
            .file("filedata", zip_path)
            .map_err(|source| SymbolUploadError::Io {
                path: zip_path.to_path_buf(),
                source,
            })?;

        let response = self
            .http
            .put(format!("{}/{}", self.uploads_url(app_id), resource_id))
            .multipart(form)
            .send()
            .map_err(|source| SymbolUploadError::Transport { step, source })?;
        self.finish(step, response)?;
        Ok(())
    }

    fn process(&self, app_id: &str, resource_id: &str, filename: &str) -> SymbolUploadResult<()> {
        let step = UploadStep::Process;
        let response = self
            .http
            .post(format!("{}/app/{}/symbols/uploads", self.app_url, app_id))
            .json(&json!({"uploadUuid": resource_id, "filename": filename}))
            .send()
            .map_err(|source| SymbolUploadError::Transport { step, source })?;
        self.finish(step, response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_id() {
        let id = parse_resource_id(r#"{"resource-id": "abc-123", "status": "created"}"#).unwrap();
        assert_eq!(id, "abc-123");
    }

    #[test]
    fn test_parse_invalid_token() {
        let err = parse_resource_id(r#"{"message": "Invalid token specified"}"#).unwrap_err();
        assert!(matches!(err, SymbolUploadError::InvalidToken));
    }

    #[test]
    fn test_parse_missing_resource_id() {
        assert!(matches!(
            parse_resource_id(r#"{"status": "ok"}"#),
            Err(SymbolUploadError::Decode(_))
        ));
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let settings = CrittercismSettings {
            files_url: "https://files.example.com/api/v1/".to_string(),
            app_url: "https://app.example.com/v1.0".to_string(),
            http_timeout: None,
            oauth_token: None,
            app_id: None,
        };
        let api = HttpSymbolApi::new(&settings, "token", false).unwrap();
        assert_eq!(
            api.uploads_url("app-1"),
            "https://files.example.com/api/v1/applications/app-1/symbol-uploads"
        );
    }

    fn mock_settings(uri: &str) -> CrittercismSettings {
        CrittercismSettings {
            files_url: format!("{}/api/v1", uri),
            app_url: format!("{}/v1.0", uri),
            http_timeout: None,
            oauth_token: None,
            app_id: None,
        }
    }

    #[tokio::test]
    async fn test_three_calls_on_the_wire() {
        use wiremock::matchers::{body_json, body_string_contains, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        let settings = mock_settings(&mock_server.uri());
        let dir = tempfile::tempdir().unwrap();
        let zip = dir.path().join("MyApp.app.dSYM.zip");
        std::fs::write(&zip, b"PK zipped dwarf").unwrap();

        Mock::given(method("POST"))
            .and(path("/api/v1/applications/app-1/symbol-uploads"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"resource-id": "res-9"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/applications/app-1/symbol-uploads/res-9"))
            .and(header("authorization", "Bearer tok-123"))
            .and(body_string_contains("name=\"name\""))
            .and(body_string_contains("symbolUpload"))
            .and(body_string_contains("name=\"filedata\""))
            .and(body_string_contains("PK zipped dwarf"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1.0/app/app-1/symbols/uploads"))
            .and(header("authorization", "Bearer tok-123"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "uploadUuid": "res-9",
                "filename": "MyApp.app.dSYM.zip"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = tokio::task::spawn_blocking(move || {
            let api = HttpSymbolApi::new(&settings, "tok-123", false).unwrap();
            let resource_id = api.create_upload("app-1")?;
            api.upload_file("app-1", &resource_id, &zip)?;
            api.process("app-1", &resource_id, "MyApp.app.dSYM.zip")?;
            Ok::<_, SymbolUploadError>(resource_id)
        })
        .await
        .unwrap();

        assert_eq!(result.unwrap(), "res-9");
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn test_invalid_token_response() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        let settings = mock_settings(&mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"message": "Invalid token specified"}"#),
            )
            .mount(&mock_server)
            .await;

        let result = tokio::task::spawn_blocking(move || {
            let api = HttpSymbolApi::new(&settings, "bad", false).unwrap();
            api.create_upload("app-1")
        })
        .await
        .unwrap();

        assert!(matches!(result, Err(SymbolUploadError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_non_success_status_fails_step() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        let settings = mock_settings(&mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
            .mount(&mock_server)
            .await;

        let result = tokio::task::spawn_blocking(move || {
            let api = HttpSymbolApi::new(&settings, "tok", false).unwrap();
            api.process("app-1", "res-1", "MyApp.app.dSYM.zip")
        })
        .await
        .unwrap();

        match result {
            Err(SymbolUploadError::Api { step, status, body }) => {
                assert_eq!(step, UploadStep::Process);
                assert_eq!(status, 500);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }
}
