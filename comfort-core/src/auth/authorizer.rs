use std::sync::Arc;

use reqwest::{
    Request, Url,
    header::{AUTHORIZATION, HeaderValue},
};

use super::TokenProvider;

/// Attaches bearer credentials to requests bound for the weather API.
///
/// A request is in scope when it shares the API base URL's origin and its
/// path lies under `<base path>/weather`. Everything else passes through
/// untouched. Token failures never abort a request: it is sent without
/// credentials and the failure is logged.
#[derive(Debug, Clone)]
pub struct RequestAuthorizer {
    tokens: Arc<dyn TokenProvider>,
    base: Url,
    path_prefix: String,
}

impl RequestAuthorizer {
    pub fn new(base: &Url, tokens: Arc<dyn TokenProvider>) -> Self {
        let path_prefix = format!("{}/weather", base.path().trim_end_matches('/'));

        Self {
            tokens,
            base: base.clone(),
            path_prefix,
        }
    }

    pub fn covers(&self, url: &Url) -> bool {
        if url.origin() != self.base.origin() {
            return false;
        }

        let path = url.path();
        path == self.path_prefix
            || path
                .strip_prefix(self.path_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub async fn authorize(&self, mut request: Request) -> Request {
        if !self.covers(request.url()) {
            return request;
        }

        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    url = %request.url(),
                    error = %e,
                    "could not obtain access token, sending request unauthenticated"
                );
                return request;
            }
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => {
                tracing::warn!(
                    url = %request.url(),
                    error = %e,
                    "access token is not a valid header value, sending request unauthenticated"
                );
            }
        }

        request
    }
}
