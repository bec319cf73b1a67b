//! Core data types for WHOIS lookups.
//!
//! This module defines the canonical record extracted from registry output,
//! the result of a full lookup, and the configuration that drives lookups.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bytes exactly as read from a WHOIS server, trimmed of surrounding whitespace.
///
/// WHOIS servers do not agree on a character encoding, so responses are kept
/// as bytes until the parsing stage.
pub type RawResponse = Vec<u8>;

/// Canonical registration record extracted from a WHOIS response.
///
/// Every field defaults to empty when the response does not contain a
/// matching field; absence is never an error. Dates are kept verbatim in
/// whatever format the registry used.
///
/// Serializes with capitalized keys (`Nameservers`, `Status`, ...), which is
/// the shape HTTP clients of the lookup service consume.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    /// Nameservers in response order
    pub nameservers: Vec<String>,

    /// Domain status codes (e.g. "clientTransferProhibited")
    pub status: Vec<String>,

    /// Registration date, registry format
    pub created: String,

    /// Last update date, registry format
    pub updated: String,

    /// Expiration date, registry format
    pub expiration: String,

    /// Referral value (typically a registrar WHOIS server or URL)
    pub referral: String,
}

impl Record {
    /// True when no field could be resolved.
    pub fn is_empty(&self) -> bool {
        self.nameservers.is_empty()
            && self.status.is_empty()
            && self.created.is_empty()
            && self.updated.is_empty()
            && self.expiration.is_empty()
            && self.referral.is_empty()
    }
}

/// Result of a complete lookup: fetch, classify, extract.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    /// The domain name that was queried (e.g., "example.com")
    #[serde(skip_serializing)]
    pub domain: String,

    /// Whether the registry answered with a known "not registered" phrase
    pub available: bool,

    /// Parsed registration record
    pub whois: Record,

    /// Raw trimmed response
    #[serde(skip_serializing)]
    pub raw: RawResponse,

    /// How long the two-hop lookup took
    #[serde(skip_serializing)]
    pub duration: Duration,
}

impl LookupResult {
    /// Raw response decoded for display, replacing invalid UTF-8 sequences.
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

/// Default root WHOIS authority queried for referrals.
pub const DEFAULT_ROOT_SERVER: &str = "whois.iana.org";

/// Well-known WHOIS TCP port.
pub const WHOIS_PORT: u16 = 43;

/// Configuration options for lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookupConfig {
    /// Deadline applied to each connect, write and read
    /// Default: 3 seconds
    #[serde(skip)] // Don't serialize Duration directly
    pub timeout: Duration,

    /// Root authority that maps a TLD to its registry server
    /// Default: whois.iana.org
    pub root_server: String,

    /// TCP port used for both hops
    /// Default: 43
    pub port: u16,

    /// Maximum number of whole lookups running at once when checking several domains
    /// Default: 4, Range: 1-50
    pub concurrency: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            root_server: DEFAULT_ROOT_SERVER.to_string(),
            port: WHOIS_PORT,
            concurrency: 4,
        }
    }
}

impl LookupConfig {
    /// Set the per-operation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different root authority.
    pub fn with_root_server<S: Into<String>>(mut self, root_server: S) -> Self {
        self.root_server = root_server.into();
        self
    }

    /// Use a non-standard port for both hops.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set how many lookups may run at once. Capped to 1-50.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 50);
        self
    }
}
