//! Token Provider
//!
//! Obtains a checkout session token, degrading to a locally synthesized one
//! when the API cannot issue it. Token issuance is not available for every
//! checkout type, so failures here never abort the flow.

use std::sync::Arc;
use std::time::Duration;

use checkout_core::{
    CheckoutError, CheckoutId, CommerceGateway, FlowLog, Result, SessionToken, Stage,
    StoreCredentials, TokenResponse,
};

use super::bounded;

pub struct TokenProvider {
    gateway: Arc<dyn CommerceGateway>,
    timeout: Duration,
}

impl TokenProvider {
    pub fn new(gateway: Arc<dyn CommerceGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Issue a token for `checkout_id`
    ///
    /// Only missing inputs produce an error. Upstream failures of any kind
    /// are logged and answered with a synthesized token.
    pub async fn issue(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
        log: &mut FlowLog,
    ) -> Result<SessionToken> {
        credentials.validate()?;
        if checkout_id.is_blank() {
            return Err(CheckoutError::Validation("checkoutId is required".into()));
        }

        match self.request(credentials, checkout_id).await {
            Ok(token) => {
                log.info(Stage::Token, "Token generated successfully via API");
                Ok(token)
            }
            Err(err) => {
                log.error(Stage::Token, format!("Token API request failed: {err}"));
                let token = SessionToken::synthesize(checkout_id.clone());
                log.fallback(
                    Stage::Token,
                    format!("Using locally synthesized fallback token for checkout {checkout_id}"),
                );
                Ok(token)
            }
        }
    }

    async fn request(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<SessionToken> {
        let response = bounded(
            Stage::Token,
            self.timeout,
            self.gateway.create_checkout_token(credentials, checkout_id),
        )
        .await?;

        let body = response.into_success()?;
        let decoded = TokenResponse::decode(&body)?;
        Ok(SessionToken::issued(decoded.into_token(), checkout_id.clone()))
    }
}
