//! # gitauth-sdk
//!
//! Client for linking a workspace platform account with external git providers.
//!
//! ## Features
//!
//! - **Device Code authentication** - request a code, exchange it, check the result
//! - **Auth status** - identity and app installations per provider
//! - **Repository discovery** - paginated, optionally scoped to one installation
//! - **Uniform errors** - every non-success response becomes [`GitAuthError::Provider`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use gitauth_sdk::{GitAuthClient, PaginationRequest, SessionTokenAuth};
//!
//! # async fn example() -> gitauth_sdk::Result<()> {
//! let client = GitAuthClient::new("https://dev.example.com")?
//!     .with_authenticator(SessionTokenAuth::new("Session-Token", "my-session-token"));
//!
//! let status = client.auth_status("github").await?;
//! if status.authenticated {
//!     let page = client
//!         .list_repositories("github", &PaginationRequest::new().with_per_page(100))
//!         .await?;
//!     println!("{} repositories", page.total);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The device flow poll loop belongs to the caller; see [`DeviceFlow`].

pub mod auth;
pub mod client;
pub mod error;
pub mod repos;
pub mod response;
pub mod status;
pub mod types;

pub use auth::{
    Attempt, Authenticator, DeviceFlow, ExchangeFailure, FlowState, NoAuth, SessionTokenAuth,
};
pub use client::GitAuthClient;
pub use error::{GitAuthError, Result};
pub use types::{
    AppInstallation, AuthSession, DeviceCode, DeviceSecret, Identity, PaginationRequest,
    Repository, RepositoryPage, DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE, MAX_SERVER_DURATION,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
