//! Session checks for report requests.

use std::collections::HashSet;

use async_trait::async_trait;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

/// Cookie carrying the portal session token
pub const SESSION_COOKIE: &str = "session";

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
}

/// Decides whether a request carries a valid session
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Token from `Authorization: Bearer ...`, else from the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

/// Accepts a fixed set of tokens
#[derive(Debug, Clone, Default)]
pub struct TokenSessionVerifier {
    tokens: HashSet<String>,
}

impl TokenSessionVerifier {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl SessionVerifier for TokenSessionVerifier {
    async fn verify(&self, headers: &HeaderMap) -> Option<Session> {
        let token = session_token(headers)?;
        self.tokens.contains(token).then(|| Session {
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(axum::http::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_bearer_token() {
        let map = headers(&[(AUTHORIZATION, "Bearer abc123")]);
        assert_eq!(session_token(&map), Some("abc123"));
    }

    #[test]
    fn test_cookie_token() {
        let map = headers(&[(COOKIE, "theme=dark; session=xyz; lang=en")]);
        assert_eq!(session_token(&map), Some("xyz"));

        let map = headers(&[(COOKIE, "theme=dark"), (COOKIE, "session=later")]);
        assert_eq!(session_token(&map), Some("later"));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        assert_eq!(session_token(&headers(&[(AUTHORIZATION, "Basic dXNlcg==")])), None);
        assert_eq!(session_token(&headers(&[(COOKIE, "session=")])), None);
    }

    #[tokio::test]
    async fn test_verifier() {
        let verifier = TokenSessionVerifier::new(["good"]);

        let ok = verifier.verify(&headers(&[(AUTHORIZATION, "Bearer good")])).await;
        assert_eq!(ok.map(|s| s.token), Some("good".to_string()));

        assert!(verifier.verify(&headers(&[(AUTHORIZATION, "Bearer bad")])).await.is_none());
        assert!(TokenSessionVerifier::default().verify(&HeaderMap::new()).await.is_none());
    }
}
