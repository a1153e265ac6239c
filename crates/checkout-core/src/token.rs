//! Checkout Session Tokens
//!
//! A token authorizes access to the order confirmation page for one checkout.
//! Tokens are either issued by the API or synthesized locally when issuance
//! fails; both are usable downstream.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checkout::CheckoutId;
use crate::error::{CheckoutError, Result};

/// Where a session token came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenOrigin {
    ApiIssued,
    LocallySynthesized,
}

/// Opaque session token scoped to one checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    value: String,
    checkout_id: CheckoutId,
    origin: TokenOrigin,
}

impl SessionToken {
    /// Wrap a token returned by the API
    pub fn issued(value: impl Into<String>, checkout_id: CheckoutId) -> Self {
        Self {
            value: value.into(),
            checkout_id,
            origin: TokenOrigin::ApiIssued,
        }
    }

    /// Synthesize a fallback token: `{unix_millis}-{checkout prefix}-{random}`
    ///
    /// Only the prefix is derived from the checkout; two calls never collide.
    pub fn synthesize(checkout_id: CheckoutId) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let value = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            checkout_id.prefix(8),
            &suffix[..8]
        );
        Self {
            value,
            checkout_id,
            origin: TokenOrigin::LocallySynthesized,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub const fn checkout_id(&self) -> &CheckoutId {
        &self.checkout_id
    }

    pub const fn origin(&self) -> TokenOrigin {
        self.origin
    }

    pub fn is_synthesized(&self) -> bool {
        self.origin == TokenOrigin::LocallySynthesized
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Inner object of the nested token shape
#[derive(Debug, Deserialize)]
pub struct NestedToken {
    #[serde(rename = "checkoutToken")]
    pub checkout_token: String,
}

/// Accepted shapes of a token issuance response
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TokenResponse {
    /// `{"token": "..."}`
    Flat { token: String },

    /// `{"data": {"checkoutToken": "..."}}`
    Nested { data: NestedToken },
}

impl TokenResponse {
    /// Decode a 2xx body, rejecting unrecognized shapes and empty tokens
    pub fn decode(body: &serde_json::Value) -> Result<Self> {
        let parsed = Self::deserialize(body).map_err(|_| {
            CheckoutError::MalformedResponse(
                "expected `token` or `data.checkoutToken` in token response".into(),
            )
        })?;

        if parsed.token().trim().is_empty() {
            return Err(CheckoutError::MalformedResponse(
                "token response contained an empty token".into(),
            ));
        }
        Ok(parsed)
    }

    pub fn token(&self) -> &str {
        match self {
            Self::Flat { token } => token,
            Self::Nested { data } => &data.checkout_token,
        }
    }

    pub fn into_token(self) -> String {
        match self {
            Self::Flat { token } => token,
            Self::Nested { data } => data.checkout_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_flat_and_nested() {
        let flat = TokenResponse::decode(&json!({"token": "abc"})).unwrap();
        assert!(matches!(flat, TokenResponse::Flat { .. }));
        assert_eq!(flat.token(), "abc");

        let nested = TokenResponse::decode(&json!({"data": {"checkoutToken": "xyz"}})).unwrap();
        assert!(matches!(nested, TokenResponse::Nested { .. }));
        assert_eq!(nested.into_token(), "xyz");
    }

    #[test]
    fn test_decode_unrecognized_shape() {
        for body in [
            json!({"data": {"token": "abc"}}),
            json!({"checkoutToken": "abc"}),
            json!("plain text"),
            json!({"token": ""}),
        ] {
            let err = TokenResponse::decode(&body).unwrap_err();
            assert!(matches!(err, CheckoutError::MalformedResponse(_)), "body: {body}");
        }
    }

    #[test]
    fn test_synthesized_token_format() {
        let id = CheckoutId::new("306d57d7-124e-4112-82cd-35e060c0d4d9");
        let token = SessionToken::synthesize(id.clone());

        assert!(token.is_synthesized());
        assert_eq!(token.checkout_id(), &id);

        let parts: Vec<&str> = token.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[1], "306d57d7");
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_synthesized_tokens_differ() {
        let id = CheckoutId::new("306d57d7-124e-4112-82cd-35e060c0d4d9");
        let a = SessionToken::synthesize(id.clone());
        let b = SessionToken::synthesize(id);
        assert_ne!(a.as_str(), b.as_str());
    }
}
