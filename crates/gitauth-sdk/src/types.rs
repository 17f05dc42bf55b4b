//! Wire types for the git auth endpoints.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize};

/// Interval assumed when a provider announces none (RFC 8628 §3.2)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 30;
/// Largest page size providers accept. Not enforced client-side.
pub const MAX_PER_PAGE: u32 = 100;

/// Ceiling for server-supplied lifetimes and intervals when turned into instants
pub const MAX_SERVER_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// `start + offset`, with `offset` capped at [`MAX_SERVER_DURATION`]. Never panics.
pub(crate) fn instant_after(start: Instant, offset: Duration) -> Instant {
    start
        .checked_add(offset.min(MAX_SERVER_DURATION))
        .unwrap_or(start)
}

/// A provider-side user or organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub login: String,
    pub avatar_url: String,
    pub profile_url: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

/// An installation of the provider app on an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInstallation {
    pub id: i64,
    pub account: Identity,
    pub configure_url: String,
}

/// Authentication state for one provider.
///
/// `user` is only ever populated when `authenticated` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AuthSessionPayload")]
pub struct AuthSession {
    pub authenticated: bool,
    pub device: bool,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub user: Option<Identity>,
    pub app_installable: bool,
    pub installations: Vec<AppInstallation>,
    pub app_install_url: String,
}

#[derive(Deserialize)]
struct AuthSessionPayload {
    authenticated: bool,
    device: bool,
    #[serde(rename = "type")]
    provider_type: String,
    user: Option<Identity>,
    app_installable: bool,
    #[serde(deserialize_with = "null_as_empty")]
    installations: Vec<AppInstallation>,
    app_install_url: String,
}

impl From<AuthSessionPayload> for AuthSession {
    fn from(p: AuthSessionPayload) -> Self {
        let user = if p.authenticated {
            p.user
        } else {
            if p.user.is_some() {
                log::debug!("dropping identity reported for an unauthenticated session");
            }
            None
        };
        Self {
            authenticated: p.authenticated,
            device: p.device,
            provider_type: p.provider_type,
            user,
            app_installable: p.app_installable,
            installations: p.installations,
            app_install_url: p.app_install_url,
        }
    }
}

/// Opaque device code. Never printed; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSecret(String);

impl DeviceSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceSecret(<redacted>)")
    }
}

/// Device authorization response (RFC 8628 §3.2)
#[derive(Clone, Deserialize)]
pub struct DeviceCode {
    device_code: DeviceSecret,
    pub user_code: String,
    pub verification_uri: String,
    #[serde(rename = "expires_in")]
    pub expires_in_secs: u64,
    #[serde(rename = "interval")]
    pub interval_secs: u64,
    #[serde(skip, default = "Instant::now")]
    issued_at: Instant,
}

impl DeviceCode {
    /// Build a device code issued now
    pub fn new(
        device_code: impl Into<String>,
        user_code: impl Into<String>,
        verification_uri: impl Into<String>,
        expires_in_secs: u64,
        interval_secs: u64,
    ) -> Self {
        Self {
            device_code: DeviceSecret::new(device_code),
            user_code: user_code.into(),
            verification_uri: verification_uri.into(),
            expires_in_secs,
            interval_secs,
            issued_at: Instant::now(),
        }
    }

    pub fn secret(&self) -> &DeviceSecret {
        &self.device_code
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Lifetimes beyond [`MAX_SERVER_DURATION`] are treated as that ceiling
    pub fn expires_at(&self) -> Instant {
        instant_after(self.issued_at, Duration::from_secs(self.expires_in_secs))
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    /// Time left before the code must be discarded
    pub fn remaining(&self) -> Duration {
        self.expires_at().saturating_duration_since(Instant::now())
    }

    /// Minimum spacing between exchange attempts
    pub fn poll_interval(&self) -> Duration {
        if self.interval_secs == 0 {
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        } else {
            Duration::from_secs(self.interval_secs)
        }
    }
}

impl fmt::Debug for DeviceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCode")
            .field("device_code", &self.device_code)
            .field("user_code", &self.user_code)
            .field("verification_uri", &self.verification_uri)
            .field("expires_in_secs", &self.expires_in_secs)
            .field("interval_secs", &self.interval_secs)
            .finish()
    }
}

/// Body of the device exchange request
#[derive(Debug, Serialize)]
pub(crate) struct DeviceExchange<'a> {
    pub device_code: &'a DeviceSecret,
}

/// A repository visible to the authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Description")]
    pub description: String,
    #[serde(alias = "Owner")]
    pub owner: Identity,
    #[serde(alias = "URL")]
    pub url: String,
    #[serde(alias = "StargazersCount")]
    pub stargazers_count: u64,
    #[serde(alias = "Language")]
    pub language: String,
    #[serde(alias = "DefaultBranch")]
    pub default_branch: String,
}

/// One page of repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPage {
    /// Provider-reported count across all pages
    pub total: u64,
    #[serde(deserialize_with = "null_as_empty")]
    pub repos: Vec<Repository>,
}

impl RepositoryPage {
    /// Whether the next page may hold more repositories, given `collected` received so far
    /// (this page included). An empty page always ends the listing.
    ///
    /// Counts what arrived rather than `page * per_page`, since providers may cap the page size.
    pub fn has_more(&self, collected: usize) -> bool {
        !self.repos.is_empty() && (collected as u64) < self.total
    }
}

/// Paging and scoping options for repository listing.
///
/// Zero values mean "unset" and fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationRequest {
    pub page: u32,
    pub per_page: u32,
    pub installation_id: Option<i64>,
}

impl PaginationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_installation(mut self, installation_id: i64) -> Self {
        self.installation_id = Some(installation_id);
        self
    }

    pub fn effective_page(&self) -> u32 {
        if self.page == 0 {
            DEFAULT_PAGE
        } else {
            self.page
        }
    }

    pub fn effective_per_page(&self) -> u32 {
        if self.per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page
        }
    }

    /// The same request for the following page
    pub fn next_page(&self) -> Self {
        Self {
            page: self.effective_page() + 1,
            ..*self
        }
    }

    /// Query parameters, each key at most once
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.effective_page().to_string()),
            ("per_page", self.effective_per_page().to_string()),
        ];
        if let Some(id) = self.installation_id.filter(|id| *id > 0) {
            pairs.push(("installation_id", id.to_string()));
        }
        pairs
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
