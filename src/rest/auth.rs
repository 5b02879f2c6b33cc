use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use rand::{rngs::OsRng, RngCore};

use crate::error::ContentError;

/// Opaque bearer tokens handed out at login. Kept in memory only.
#[derive(Clone, Default)]
pub struct SessionTokens {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl SessionTokens {
    pub fn issue(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone());
        token
    }

    pub fn contains(&self, token: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(token)
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Returns the presented token when it was issued by this server.
pub fn authorize<'a>(
    tokens: &SessionTokens,
    headers: &'a HeaderMap,
) -> Result<&'a str, ContentError> {
    match bearer(headers) {
        Some(token) if tokens.contains(token) => Ok(token),
        _ => Err(ContentError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn issued_tokens_are_unique_hex() {
        let tokens = SessionTokens::default();
        let a = tokens.issue();
        let b = tokens.issue();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn authorize_accepts_only_issued_bearer_tokens() {
        let tokens = SessionTokens::default();
        let token = tokens.issue();

        assert_eq!(
            authorize(&tokens, &headers(&format!("Bearer {token}"))).unwrap(),
            token
        );
        assert!(authorize(&tokens, &headers(&token)).is_err());
        assert!(authorize(&tokens, &headers("Bearer nope")).is_err());
        assert!(authorize(&tokens, &HeaderMap::new()).is_err());

        assert!(tokens.revoke(&token));
        assert!(authorize(&tokens, &headers(&format!("Bearer {token}"))).is_err());
    }
}
