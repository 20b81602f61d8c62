//! GitHub REST client for release creation.

use super::{CreateReleaseRequest, ReleaseHost, ReleaseReceipt};
use crate::error::{RemoteReleaseError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

/// Public GitHub API root
pub const GITHUB_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Authenticated GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GitHubClient {
    /// Build a client. GitHub rejects requests without a User-Agent.
    pub fn new(token: &str, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| RemoteReleaseError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: GITHUB_API_URL.to_string(),
            token: token.to_string(),
        })
    }

    /// Point the client at another API root (GitHub Enterprise).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn releases_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/releases", self.api_base, owner, repo)
    }
}

#[async_trait]
impl ReleaseHost for GitHubClient {
    async fn create_release(&self, request: &CreateReleaseRequest) -> Result<ReleaseReceipt> {
        let url = self.releases_url(&request.owner, &request.repo);
        log::debug!("POST {} (tag {})", url, request.tag_name);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteReleaseError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let receipt = response
                .json::<ReleaseReceipt>()
                .await
                .map_err(|e| RemoteReleaseError::Network(e.to_string()))?;
            log::info!("Created release {} at {}", receipt.tag_name, receipt.html_url);
            return Ok(receipt);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<body unreadable: {}>", e));
        Err(classify_failure(status, &request.tag_name, body).into())
    }
}

/// Map a failed response to a [`RemoteReleaseError`].
///
/// GitHub reports a duplicate tag as `422` with an `already_exists`
/// validation error on the `tag_name` field.
pub fn classify_failure(status: StatusCode, tag: &str, body: String) -> RemoteReleaseError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteReleaseError::Unauthorized {
            status: status.as_u16(),
            body,
        },
        StatusCode::UNPROCESSABLE_ENTITY if reports_existing_tag(&body) => {
            RemoteReleaseError::Conflict {
                tag: tag.to_string(),
                body,
            }
        }
        _ => RemoteReleaseError::Rejected {
            status: status.as_u16(),
            body,
        },
    }
}

fn reports_existing_tag(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };

    value
        .get("errors")
        .and_then(|errors| errors.as_array())
        .is_some_and(|errors| {
            errors.iter().any(|e| {
                e.get("code").and_then(|c| c.as_str()) == Some("already_exists")
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXISTING_TAG: &str = r#"{"message":"Validation Failed","errors":[{"resource":"Release","code":"already_exists","field":"tag_name"}]}"#;

    #[test]
    fn duplicate_tag_is_conflict() {
        let err = classify_failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "android-cp-8",
            EXISTING_TAG.to_string(),
        );
        match err {
            RemoteReleaseError::Conflict { tag, body } => {
                assert_eq!(tag, "android-cp-8");
                assert_eq!(body, EXISTING_TAG);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn other_validation_failures_are_rejections() {
        let body = r#"{"message":"Validation Failed","errors":[{"code":"invalid","field":"target_commitish"}]}"#;
        let err = classify_failure(StatusCode::UNPROCESSABLE_ENTITY, "ios-cp-2", body.into());
        assert!(matches!(err, RemoteReleaseError::Rejected { status: 422, .. }));
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        let err = classify_failure(
            StatusCode::UNAUTHORIZED,
            "ios-cp-2",
            r#"{"message":"Bad credentials"}"#.into(),
        );
        assert!(matches!(err, RemoteReleaseError::Unauthorized { status: 401, .. }));
    }

    #[test]
    fn request_serializes_without_path_parameters() {
        let request = CreateReleaseRequest {
            owner: "acme".into(),
            repo: "app".into(),
            tag_name: "android-cp-8".into(),
            target_commitish: "a".repeat(40),
            name: "Android Codepush v8".into(),
            body: "body".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tag_name"], "android-cp-8");
        assert!(json.get("owner").is_none());
        assert!(json.get("repo").is_none());
    }

    /// Serve one canned HTTP response on a local port; returns the API base.
    async fn serve_once(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request() -> CreateReleaseRequest {
        CreateReleaseRequest {
            owner: "acme".into(),
            repo: "app".into(),
            tag_name: "android-cp-8".into(),
            target_commitish: "a".repeat(40),
            name: "Android Codepush v8".into(),
            body: "body".into(),
        }
    }

    #[tokio::test]
    async fn conflict_response_over_http() {
        const RESPONSE: &str = concat!(
            "HTTP/1.1 422 Unprocessable Entity\r\n",
            "Content-Type: application/json\r\n",
            "Content-Length: 57\r\n",
            "Connection: close\r\n\r\n",
            r#"{"errors":[{"code":"already_exists","field":"tag_name"}]}"#
        );
        let base = serve_once(RESPONSE).await;
        let client = GitHubClient::new("token", "dymo-test")
            .unwrap()
            .with_api_base(&base);

        let err = client.create_release(&request()).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn truncated_error_body_is_reported() {
        const RESPONSE: &str = concat!(
            "HTTP/1.1 500 Internal Server Error\r\n",
            "Content-Length: 100\r\n",
            "Connection: close\r\n\r\n",
            "partial"
        );
        let base = serve_once(RESPONSE).await;
        let client = GitHubClient::new("token", "dymo-test")
            .unwrap()
            .with_api_base(&base);

        let err = client.create_release(&request()).await.unwrap_err();
        match err {
            crate::error::ReleaseError::RemoteRelease(RemoteReleaseError::Rejected {
                status,
                body,
            }) => {
                assert_eq!(status, 500);
                assert!(body.starts_with("<body unreadable:"), "body was {body:?}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_redacts_token() {
        let client = GitHubClient::new("secret-token", "dymo-test").unwrap();
        assert!(!format!("{client:?}").contains("secret-token"));
    }
}
