use std::{sync::Arc, time::Duration};

use super::{Route, SessionProbe, SessionStatus};

/// Outcome of a navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Blocks protected routes until the session is known to be authenticated.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<dyn SessionProbe>,
    timeout: Duration,
}

impl RouteGuard {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(session: Arc<dyn SessionProbe>) -> Self {
        Self {
            session,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Decide whether navigation to `route` may proceed.
    ///
    /// Public routes are always allowed. For protected routes, a session that
    /// is still loading, a probe error and a probe timeout all deny.
    pub async fn check(&self, route: &Route) -> GuardDecision {
        if !route.is_protected() {
            return GuardDecision::Allow;
        }

        let status = match tokio::time::timeout(self.timeout, self.session.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                tracing::warn!(route = %route, error = %e, "session check failed");
                SessionStatus::Unauthenticated
            }
            Err(_) => {
                tracing::warn!(route = %route, timeout = ?self.timeout, "session check timed out");
                SessionStatus::Loading
            }
        };

        match status {
            SessionStatus::Authenticated => GuardDecision::Allow,
            SessionStatus::Loading | SessionStatus::Unauthenticated => {
                tracing::debug!(route = %route, ?status, "navigation denied");
                GuardDecision::Redirect(Route::Login)
            }
        }
    }
}
