//! # WHOIS Refer Library
//!
//! Two-hop WHOIS lookups with availability classification and best-effort
//! record extraction.
//!
//! A lookup asks the root authority (`whois.iana.org`) which registry server
//! is responsible for a domain, queries that server, and returns its raw
//! answer. The answer can then be classified as "not registered" against a
//! catalog of known registry phrases, or parsed into a canonical [`Record`]
//! by fuzzy matching of field names.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let raw = whois_refer_lib::whois("example.com", Duration::from_secs(3)).await?;
//!
//!     println!("available: {}", whois_refer_lib::available(&raw));
//!     println!("expires: {}", whois_refer_lib::records(&raw).expiration);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Referral Resolution**: Registry discovery through the root authority
//! - **Availability Check**: Exact matching against 34 known negative phrases
//! - **Record Extraction**: Similarity-based mapping of registry field names
//! - **Concurrent Lookups**: Several domains through [`WhoisChecker::lookup_stream`]

pub use availability::{is_available, NOT_FOUND_PHRASES};
pub use checker::WhoisChecker;
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, EnvConfig, FileConfig, LookupSection,
    OutputConfig, ServerConfig, DEFAULT_BIND, MAX_CONCURRENCY,
};
pub use error::WhoisError;
pub use protocols::{resolve_referral, WhoisClient, WhoisConnection};
pub use records::{
    build_field_index, extract_record, field_similarity, resolve_canonical_field, FieldIndex,
    MATCH_THRESHOLD,
};
pub use types::{LookupConfig, LookupResult, RawResponse, Record, DEFAULT_ROOT_SERVER, WHOIS_PORT};
pub use utils::{normalize_domains, validate_domain};

mod availability;
mod checker;
mod config;
mod error;
mod protocols;
mod records;
mod types;
mod utils;

use std::time::Duration;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhoisError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Fetch the raw WHOIS answer for `domain` through the default root authority.
///
/// `timeout` bounds each connect, write and read separately. The result is
/// the registry's answer with surrounding whitespace trimmed.
pub async fn whois(domain: &str, timeout: Duration) -> Result<RawResponse> {
    WhoisClient::with_timeout(timeout).fetch(domain).await
}

/// Tell whether a raw answer says the domain is not registered.
pub fn available(data: &[u8]) -> bool {
    is_available(data)
}

/// Extract the canonical record from a raw answer.
pub fn records(data: &[u8]) -> Record {
    extract_record(data)
}

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
        root_server: DEFAULT_ROOT_SERVER,
        not_found_phrases: NOT_FOUND_PHRASES.len(),
    }
}

/// Information about the library build
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
    pub root_server: &'static str,
    pub not_found_phrases: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info() {
        let info = info();
        assert_eq!(info.version, VERSION);
        assert_eq!(info.root_server, "whois.iana.org");
        assert_eq!(info.not_found_phrases, 34);
    }

    #[test]
    fn test_free_functions_agree_with_modules() {
        let raw = b"Domain Name: EXAMPLE.COM\nUpdated Date: 2024-08-14T07:01:34Z";
        assert!(!available(raw));
        assert!(available(b"No Data Found"));
        assert_eq!(records(raw), extract_record(raw));
        assert_eq!(records(raw).updated, "2024-08-14T07:01:34Z");
    }

    #[test]
    fn test_whois_rejects_invalid_domain_before_io() {
        let result = tokio_test::block_on(whois("exa mple.com", Duration::from_millis(10)));
        assert!(matches!(result, Err(WhoisError::InvalidDomain { .. })));
    }
}
