//! Supabase GoTrue identity provider client.
//!
//! Speaks the GoTrue HTTP API: sign-up, the password grant, OTP dispatch
//! and verification, password recovery, and the federated authorize
//! redirect. The client holds no session state; it reports each call's
//! outcome and the flow decides what it means.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::provider::{IdentityProvider, ProviderError, ProviderErrorKind};

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a GoTrue auth endpoint.
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

/// User metadata attached at sign-up.
#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    username: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct OtpBody<'a> {
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyBody<'a> {
    phone: &'a str,
    token: &'a str,
    #[serde(rename = "type")]
    otp_type: &'a str,
}

#[derive(Debug, Serialize)]
struct RecoverBody<'a> {
    email: &'a str,
}

impl GoTrueClient {
    /// Creates a client for the given project base URL and anon key.
    pub fn new(base_url: &str, anon_key: &str) -> anyhow::Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed)
            .map_err(|e| anyhow::anyhow!("Invalid provider base URL {trimmed}: {e}"))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// Builds the federated authorize URL for a full-page redirect.
    pub fn authorize_url(
        &self,
        provider: &str,
        redirect_url: &str,
    ) -> Result<String, ProviderError> {
        let mut url = Url::parse(&self.endpoint("authorize")).map_err(|e| {
            ProviderError::new(ProviderErrorKind::Parse, format!("Invalid authorize URL: {e}"))
        })?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_url)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url.to_string())
    }

    /// Posts a JSON body and maps non-2xx responses to [`ProviderError`].
    ///
    /// Response bodies are not decoded: the flow only needs success or a
    /// displayable failure; tokens and sessions belong to the provider.
    async fn post(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &impl Serialize,
    ) -> Result<(), ProviderError> {
        debug!(path, "gotrue request");
        let response = self
            .http
            .post(self.endpoint(path))
            .query(query)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::http_status(status.as_u16(), &body))
    }
}

impl IdentityProvider for GoTrueClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<(), ProviderError> {
        let body = SignUpBody {
            email,
            password,
            data: SignUpMetadata { username },
        };
        self.post("signup", &[], &body).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), ProviderError> {
        let body = PasswordGrantBody { email, password };
        self.post("token", &[("grant_type", "password")], &body).await
    }

    async fn send_otp(&self, phone_e164: &str) -> Result<(), ProviderError> {
        let body = OtpBody { phone: phone_e164 };
        self.post("otp", &[], &body).await
    }

    async fn verify_otp(&self, phone_e164: &str, code: &str) -> Result<(), ProviderError> {
        let body = VerifyBody {
            phone: phone_e164,
            token: code,
            otp_type: "sms",
        };
        self.post("verify", &[], &body).await
    }

    async fn reset_password(&self, email: &str, redirect_url: &str) -> Result<(), ProviderError> {
        let body = RecoverBody { email };
        self.post("recover", &[("redirect_to", redirect_url)], &body)
            .await
    }

    async fn federated_sign_in(
        &self,
        provider: &str,
        redirect_url: &str,
    ) -> Result<(), ProviderError> {
        let url = self.authorize_url(provider, redirect_url)?;
        debug!(%url, "opening browser for federated sign-in");
        open::that(&url).map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::Network,
                format!("Failed to open browser for {provider} login: {e}"),
            )
        })
    }
}

fn request_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout("Request timed out")
    } else {
        ProviderError::new(ProviderErrorKind::Network, err.to_string())
    }
}
