use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ActivationSettings, ConfigError, Credentials, site_domain};
use crate::host::{Sleeper, StatusSink};

pub const LOGIN_PATH: &str = "/Authenticate/login";
pub const ACTIVATION_PATH: &str = "/Payments/admin-set-free-subscription";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build request: {0}")]
    Request(String),
    #[error("network request failed: {0}")]
    Network(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    #[error("no product configured for {domain}")]
    UnsupportedDomain { domain: String },
    #[error("activation credentials are not configured")]
    MissingCredentials,
    #[error("login failed{}", status_suffix(.status))]
    AuthFailed { status: Option<u16> },
    #[error("activation failed ({status})")]
    ActivationFailed { status: u16 },
    #[error("network error: {0}")]
    Transport(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |status| format!(" ({status})"))
}

impl From<TransportError> for ActivationError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error.to_string())
    }
}

/// A JSON `POST`. `body` is already serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRequest {
    pub url: String,
    pub bearer: Option<String>,
    pub body: String,
    /// Send cookies along with the request.
    pub with_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonReply {
    pub status: u16,
    pub body: String,
}

impl JsonReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait HttpTransport {
    async fn post_json(&self, request: JsonRequest) -> Result<JsonReply, TransportError>;
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    async fn post_json(&self, request: JsonRequest) -> Result<JsonReply, TransportError> {
        (**self).post_json(request).await
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginReply {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GrantRequest<'a> {
    user_id: &'a str,
    product_id: &'a str,
}

/// Two-step login then grant call against the site's admin API.
pub struct RemoteActivationClient<T> {
    transport: T,
    settings: ActivationSettings,
}

impl<T: HttpTransport> RemoteActivationClient<T> {
    pub fn new(transport: T, settings: ActivationSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Grants the free subscription for `hostname` to `user_id`. Nothing is
    /// sent when the domain has no product or no credentials are set.
    pub async fn activate(&self, hostname: &str, user_id: &str) -> Result<(), ActivationError> {
        let Some(product_id) = self.settings.product_for(hostname) else {
            return Err(ActivationError::UnsupportedDomain {
                domain: site_domain(hostname).to_string(),
            });
        };
        let credentials = self
            .settings
            .credentials
            .as_ref()
            .ok_or(ActivationError::MissingCredentials)?;
        let api_base = self.settings.api_base(hostname)?;

        let token = self.login(&api_base, credentials).await?;
        self.grant(&api_base, &token, user_id, product_id).await
    }

    async fn login(
        &self,
        api_base: &str,
        credentials: &Credentials,
    ) -> Result<String, ActivationError> {
        let body = encode(&LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        })?;
        let reply = self
            .transport
            .post_json(JsonRequest {
                url: format!("{api_base}{LOGIN_PATH}"),
                bearer: None,
                body,
                with_credentials: true,
            })
            .await?;

        let status = Some(reply.status);
        if !reply.is_success() {
            return Err(ActivationError::AuthFailed { status });
        }
        serde_json::from_str::<LoginReply>(&reply.body)
            .ok()
            .and_then(|login| login.access_token)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ActivationError::AuthFailed { status })
    }

    async fn grant(
        &self,
        api_base: &str,
        token: &str,
        user_id: &str,
        product_id: &str,
    ) -> Result<(), ActivationError> {
        let body = encode(&GrantRequest {
            user_id,
            product_id,
        })?;
        let reply = self
            .transport
            .post_json(JsonRequest {
                url: format!("{api_base}{ACTIVATION_PATH}"),
                bearer: Some(token.to_string()),
                body,
                with_credentials: false,
            })
            .await?;
        if !reply.is_success() {
            return Err(ActivationError::ActivationFailed {
                status: reply.status,
            });
        }
        Ok(())
    }
}

fn encode<B: Serialize>(body: &B) -> Result<String, TransportError> {
    serde_json::to_string(body).map_err(|error| TransportError::Request(error.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActivationState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(ActivationError),
}

impl ActivationState {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "🎁 Activate subscription".to_string(),
            Self::Pending => "⏳ Activating...".to_string(),
            Self::Succeeded => "✅ Activated! Refresh the page".to_string(),
            Self::Failed(error) => format!("❌ {error}"),
        }
    }

    /// Only an idle control accepts a new trigger.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// The activation button of one panel instance.
///
/// Failures are shown for `failure_window` and then revert to idle. Success
/// is terminal for the instance.
pub struct ActivationControl<T, K, Z> {
    client: RemoteActivationClient<T>,
    sink: K,
    sleeper: Z,
    failure_window: Duration,
    state: RefCell<ActivationState>,
}

impl<T, K, Z> ActivationControl<T, K, Z>
where
    T: HttpTransport,
    K: StatusSink<ActivationState>,
    Z: Sleeper,
{
    pub fn new(
        client: RemoteActivationClient<T>,
        sink: K,
        sleeper: Z,
        failure_window: Duration,
    ) -> Self {
        Self {
            client,
            sink,
            sleeper,
            failure_window,
            state: RefCell::new(ActivationState::Idle),
        }
    }

    #[must_use]
    pub fn state(&self) -> ActivationState {
        self.state.borrow().clone()
    }

    /// Runs one activation. Returns `false` without doing anything when the
    /// control is not idle.
    pub async fn trigger(&self, hostname: &str, user_id: &str) -> bool {
        if !self.state.borrow().is_enabled() {
            debug!("activation control is busy or already succeeded");
            return false;
        }
        self.transition(ActivationState::Pending);

        match self.client.activate(hostname, user_id).await {
            Ok(()) => {
                info!(user_id, "subscription activated");
                self.transition(ActivationState::Succeeded);
            }
            Err(error) => {
                warn!(%error, user_id, "subscription activation failed");
                self.transition(ActivationState::Failed(error));
                self.sleeper.sleep(self.failure_window).await;
                self.transition(ActivationState::Idle);
            }
        }
        true
    }

    fn transition(&self, next: ActivationState) {
        self.sink.show(&next);
        *self.state.borrow_mut() = next;
    }
}
