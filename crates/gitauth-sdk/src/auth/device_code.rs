//! Device Authorization Grant (RFC 8628) against the platform's git auth endpoints.

use reqwest::{Method, StatusCode};

use crate::client::GitAuthClient;
use crate::error::{GitAuthError, Result};
use crate::response;
use crate::types::{DeviceCode, DeviceExchange};

/// How a failed exchange attempt should be treated by the polling caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeFailure {
    /// The user has not finished verification yet; wait one interval and retry
    Pending,
    /// Polling too fast; widen the interval before retrying
    RateLimited,
    /// The code is no longer valid; request a new one
    Expired,
    /// The user refused the authorization
    Denied,
    /// Any other provider failure. Terminal.
    Other,
}

impl ExchangeFailure {
    /// Classify an exchange error. Returns `None` for errors that never reached the provider.
    ///
    /// Providers encode these states differently (status code, RFC 8628 error code, or prose),
    /// so both the status and the message text are inspected.
    pub fn classify(error: &GitAuthError) -> Option<Self> {
        let GitAuthError::Provider { status, message, detail } = error else {
            return None;
        };

        if *status == StatusCode::TOO_MANY_REQUESTS.as_u16() {
            return Some(ExchangeFailure::RateLimited);
        }

        let text = format!("{} {}", message, detail.as_deref().unwrap_or_default()).to_lowercase();
        let failure = if contains_any(&text, &["slow_down", "slow down", "rate limit", "too many requests"]) {
            ExchangeFailure::RateLimited
        } else if contains_any(&text, &["authorization_pending", "pending"]) {
            ExchangeFailure::Pending
        } else if contains_any(&text, &["expired_token", "expired"]) {
            ExchangeFailure::Expired
        } else if contains_any(&text, &["access_denied", "denied"]) {
            ExchangeFailure::Denied
        } else {
            ExchangeFailure::Other
        };
        Some(failure)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ExchangeFailure::Pending | ExchangeFailure::RateLimited)
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

impl GitAuthClient {
    /// Request a device/user code pair for `provider`.
    ///
    /// The caller must show only `user_code` and `verification_uri`, must not poll faster than
    /// [`DeviceCode::poll_interval`], and must discard the code once it has expired.
    pub async fn request_device_code(&self, provider: &str) -> Result<DeviceCode> {
        let url = self.endpoint(provider, &["device"])?;
        let response = self.send::<()>(Method::GET, url, None).await?;
        let code: DeviceCode = response::decode_json(response, StatusCode::OK).await?;
        log::debug!(
            "device code issued for {} (expires in {}s, interval {}s)",
            provider,
            code.expires_in_secs,
            code.interval_secs
        );
        Ok(code)
    }

    /// Make one exchange attempt for `code`.
    ///
    /// `Ok(())` means the platform bound the code to an authenticated identity (HTTP 204).
    /// Failures come back as [`GitAuthError::Provider`]; use [`ExchangeFailure::classify`] to
    /// decide whether to keep polling.
    pub async fn exchange_device_code(&self, provider: &str, code: &DeviceCode) -> Result<()> {
        let url = self.endpoint(provider, &["device"])?;
        let body = DeviceExchange {
            device_code: code.secret(),
        };
        let response = self.send(Method::POST, url, Some(&body)).await?;
        response::expect_status(response, StatusCode::NO_CONTENT).await?;
        log::debug!("device code exchanged for {}", provider);
        Ok(())
    }
}
