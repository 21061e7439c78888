//! Service credential handling.
//!
//! The adapter authenticates with a service credential stored as a JSON
//! file under the host's private storage area: the OAuth client pair plus
//! a long-lived refresh token. The file is re-read on every adapter
//! operation and exchanged for a short-lived bearer token, so credential
//! rotation needs no process restart.

use std::path::Path;

use reqwest::Client;
use serde::Deserialize;

use crate::error::AuthError;

/// Default token endpoint for Google-issued credentials.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Contents of the credential file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCredential {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Token endpoint; credential files issued for other deployments may
    /// override it.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_ENDPOINT.to_string()
}

impl ServiceCredential {
    /// Read and parse the credential file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CredentialFile` when the file cannot be read and
    /// `AuthError::MalformedCredential` when it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AuthError::CredentialFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|source| AuthError::MalformedCredential {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Exchange the stored credential for a bearer token.
pub async fn access_token(http: &Client, credential: &ServiceCredential) -> Result<String, AuthError> {
    let params = [
        ("client_id", credential.client_id.as_str()),
        ("client_secret", credential.client_secret.as_str()),
        ("refresh_token", credential.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let body: serde_json::Value = http
        .post(&credential.token_uri)
        .form(&params)
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = body.get("error") {
        return Err(AuthError::TokenExchange(error.to_string()));
    }

    match body["access_token"].as_str() {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::TokenExchange(
            "missing access_token in response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_file_missing_is_credential_file_error() {
        let err = ServiceCredential::from_file(Path::new("/nonexistent/cred.json")).unwrap_err();
        assert!(matches!(err, AuthError::CredentialFile { .. }));
    }

    #[test]
    fn from_file_garbage_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = ServiceCredential::from_file(&path).unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredential { .. }));
    }

    #[test]
    fn token_uri_defaults_to_google() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.json");
        std::fs::write(
            &path,
            r#"{"client_id":"id","client_secret":"secret","refresh_token":"refresh"}"#,
        )
        .unwrap();
        let cred = ServiceCredential::from_file(&path).unwrap();
        assert_eq!(cred.token_uri, GOOGLE_TOKEN_ENDPOINT);
    }

    #[tokio::test]
    async fn token_exchange_returns_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                mockito::Matcher::UrlEncoded("refresh_token".into(), "refresh".into()),
            ]))
            .with_body(r#"{"access_token":"tok-1","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let cred = ServiceCredential {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: "refresh".into(),
            token_uri: format!("{}/token", server.url()),
        };
        let token = access_token(&Client::new(), &cred).await.unwrap();
        assert_eq!(token, "tok-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn token_exchange_error_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Token revoked"}"#)
            .create_async()
            .await;

        let cred = ServiceCredential {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: "refresh".into(),
            token_uri: format!("{}/token", server.url()),
        };
        let err = access_token(&Client::new(), &cred).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(_)));
    }
}
