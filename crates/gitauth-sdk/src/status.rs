use reqwest::{Method, StatusCode};

use crate::client::GitAuthClient;
use crate::error::Result;
use crate::response;
use crate::types::AuthSession;

impl GitAuthClient {
    /// Fetch the current authentication state for `provider`.
    ///
    /// An unauthenticated session is a normal result, not an error.
    pub async fn auth_status(&self, provider: &str) -> Result<AuthSession> {
        let url = self.endpoint(provider, &[])?;
        let response = self.send::<()>(Method::GET, url, None).await?;
        let session: AuthSession = response::decode_json(response, StatusCode::OK).await?;
        log::debug!(
            "{} auth status: authenticated={} device={} installations={}",
            provider,
            session.authenticated,
            session.device,
            session.installations.len()
        );
        Ok(session)
    }
}
