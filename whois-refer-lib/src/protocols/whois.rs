//! Two-hop WHOIS fetching.
//!
//! A lookup is a strictly ordered conversation: ask the root authority for
//! the registry server, then ask that registry about the domain. The second
//! hop cannot start before the first one has answered, so a fetch is one
//! sequential future; callers that want parallelism run several fetches,
//! never the two hops of one fetch.

use super::connection::WhoisConnection;
use super::referral::resolve_referral;
use crate::error::WhoisError;
use crate::types::{LookupConfig, RawResponse, DEFAULT_ROOT_SERVER, WHOIS_PORT};
use crate::utils::validate_domain;
use std::time::Duration;
use tracing::debug;

/// WHOIS client speaking RFC 3912 directly over TCP.
///
/// The client holds only settings. Every call opens fresh connections, so a
/// single client can be shared or cloned freely across concurrent lookups.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Root authority queried for referrals
    root_server: String,
    /// TCP port for both hops
    port: u16,
    /// Deadline for each connect, write and read
    timeout: Duration,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            root_server: DEFAULT_ROOT_SERVER.to_string(),
            port: WHOIS_PORT,
            timeout: Duration::from_secs(3),
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::new()
        }
    }

    /// Create a client from a lookup configuration.
    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            root_server: config.root_server.clone(),
            port: config.port,
            timeout: config.timeout,
        }
    }

    /// Root authority this client asks for referrals.
    pub fn root_server(&self) -> &str {
        &self.root_server
    }

    /// Per-operation deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the root authority which registry server is authoritative for `domain`.
    ///
    /// Returns an empty string when the root answer has no referral.
    pub async fn resolve_referral(&self, domain: &str) -> Result<String, WhoisError> {
        resolve_referral(&self.root_server, self.port, domain, self.timeout).await
    }

    /// Run the full two-hop lookup and return the registry's raw answer.
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain name to query (e.g., "example.com")
    ///
    /// # Returns
    ///
    /// The registry response with leading and trailing whitespace trimmed.
    /// When a registry lists several candidate records for an ambiguous
    /// query, all of them come back as-is.
    ///
    /// # Errors
    ///
    /// Returns `WhoisError` if:
    /// - The domain cannot be sent as one query line
    /// - Either server cannot be reached, including an empty referral
    /// - A write or read fails or exceeds the timeout
    pub async fn fetch(&self, domain: &str) -> Result<RawResponse, WhoisError> {
        validate_domain(domain)?;

        let referral = self.resolve_referral(domain).await?;
        self.query_server(&referral, domain).await
    }

    /// Query one known WHOIS server directly, skipping referral resolution.
    pub async fn query_server(&self, server: &str, domain: &str) -> Result<RawResponse, WhoisError> {
        validate_domain(domain)?;

        let mut conn = WhoisConnection::open(server, self.port, self.timeout).await?;
        conn.write_line(domain, self.timeout).await?;
        let response = conn.read_all().await?;
        conn.close().await;

        debug!(domain, server, bytes = response.len(), "registry answered");
        Ok(response.trim_ascii().to_vec())
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}
