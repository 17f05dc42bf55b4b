//! Session authentication for platform requests and the device authorization flow.

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

pub mod device_code;
pub mod flow;

pub use device_code::ExchangeFailure;
pub use flow::{Attempt, DeviceFlow, FlowState};

/// Authenticator trait for platform API calls
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Get the authentication header (header_name, header_value).
    /// Returns None if no authentication is needed.
    async fn get_auth_header(&self) -> Result<Option<(String, String)>>;
}

/// Sends the platform session token under a fixed header
#[derive(Clone)]
pub struct SessionTokenAuth {
    header: String,
    token: String,
}

impl SessionTokenAuth {
    pub fn new(header: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for SessionTokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokenAuth")
            .field("header", &self.header)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Authenticator for SessionTokenAuth {
    async fn get_auth_header(&self) -> Result<Option<(String, String)>> {
        Ok(Some((self.header.clone(), self.token.clone())))
    }
}

/// No authentication
#[derive(Debug, Clone)]
pub struct NoAuth;

#[async_trait]
impl Authenticator for NoAuth {
    async fn get_auth_header(&self) -> Result<Option<(String, String)>> {
        Ok(None)
    }
}
