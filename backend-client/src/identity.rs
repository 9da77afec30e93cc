//! Anonymous sign-in against the Identity Toolkit REST surface. A sign-up
//! request with no credentials creates an anonymous user; the returned id
//! token gates document-store reads.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use paperdeck_core::error::AuthError;
use paperdeck_core::provider::Identity;
use paperdeck_core::provider::IdentityProvider;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    signed_in: RwLock<Option<Identity>>,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            signed_in: RwLock::new(None),
        }
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    local_id: String,
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    fn current_identity(&self) -> Option<Identity> {
        self.signed_in
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
        let url = format!(
            "{}/v1/accounts:signUp?key={}",
            self.base_url, self.api_key
        );
        let resp = self
            .http
            .post(url)
            .json(&SignUpRequest {
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(format!("{status}: {body}")));
        }
        let parsed: SignUpResponse = resp
            .json()
            .await
            .map_err(|err| AuthError::Decode(err.to_string()))?;

        let identity = Identity {
            uid: parsed.local_id,
            token: parsed.id_token,
        };
        info!(uid = %identity.uid, "anonymous sign-in succeeded");
        *self
            .signed_in
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(identity.clone());
        Ok(identity)
    }
}
