use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{Config, error::TokenError};

pub mod authorizer;
pub mod guard;
pub mod route;

pub use authorizer::RequestAuthorizer;
pub use guard::{GuardDecision, RouteGuard};
pub use route::Route;

/// Source of bearer credentials for the signed-in session.
#[async_trait]
pub trait TokenProvider: Send + Sync + Debug {
    async fn access_token(&self) -> Result<String, TokenError>;
}

/// Authentication state of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The identity provider has not settled yet.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Answers "is the user signed in right now?" for the route guard.
#[async_trait]
pub trait SessionProbe: Send + Sync + Debug {
    async fn status(&self) -> anyhow::Result<SessionStatus>;
}

/// Hands out a token that was issued elsewhere (config file or environment).
#[derive(Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.access_token().map(str::to_owned))
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, TokenError> {
        self.token.clone().ok_or(TokenError::Missing)
    }
}

/// Session probe that treats "a token can be obtained" as signed in.
#[derive(Debug, Clone)]
pub struct TokenSession {
    tokens: Arc<dyn TokenProvider>,
}

impl TokenSession {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl SessionProbe for TokenSession {
    async fn status(&self) -> anyhow::Result<SessionStatus> {
        match self.tokens.access_token().await {
            Ok(_) => Ok(SessionStatus::Authenticated),
            Err(TokenError::Missing) => Ok(SessionStatus::Unauthenticated),
            Err(e) => {
                tracing::debug!(error = %e, "token provider rejected session");
                Ok(SessionStatus::Unauthenticated)
            }
        }
    }
}
