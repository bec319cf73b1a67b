//! WHOIS protocol implementation.
//!
//! This module contains the wire-level pieces of a lookup: deadline-bound
//! connections, referral resolution against the root authority, and the
//! two-hop fetch built on top of them.

/// Deadline-bound TCP connections
pub mod connection;

/// Root authority referral resolution
pub mod referral;

/// Two-hop fetch client
pub mod whois;

// Re-export commonly used functions and types
pub use connection::WhoisConnection;
pub use referral::resolve_referral;
pub use whois::WhoisClient;
