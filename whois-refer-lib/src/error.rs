//! Error handling for WHOIS lookups.
//!
//! Only the network half of a lookup can fail. Parsing a response never
//! produces an error: unexpected text degrades to empty record fields and a
//! "not available" verdict, because registry output is uncontrolled free text.

use std::fmt;
use std::time::Duration;

/// Main error type for WHOIS operations.
///
/// The first four variants are the transport taxonomy of a lookup
/// (dial, deadline, read, write). The remaining variants cover input
/// validation and configuration loading, which happen before any I/O.
#[derive(Debug, Clone)]
pub enum WhoisError {
    /// TCP dial failed (refused, unresolvable host, empty referral, handshake timeout)
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    /// A write or read deadline was exceeded
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Socket failure while reading, other than timeout or a clean close
    Read {
        host: String,
        message: String,
    },

    /// Socket failure while writing the query line
    Write {
        host: String,
        message: String,
    },

    /// Domain cannot be sent as a single WHOIS query line
    InvalidDomain {
        domain: String,
        reason: String,
    },

    /// Configuration errors (invalid settings, unparsable TOML, etc.)
    Config {
        message: String,
    },

    /// File I/O errors when reading configuration files
    File {
        path: String,
        message: String,
    },
}

impl WhoisError {
    /// Create a new connection error.
    pub fn connection<H: Into<String>, M: Into<String>>(host: H, port: u16, message: M) -> Self {
        Self::Connection {
            host: host.into(),
            port,
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new read error.
    pub fn read<H: Into<String>, M: Into<String>>(host: H, message: M) -> Self {
        Self::Read {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a new write error.
    pub fn write<H: Into<String>, M: Into<String>>(host: H, message: M) -> Self {
        Self::Write {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the socket layer of a lookup.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Timeout { .. } | Self::Read { .. } | Self::Write { .. }
        )
    }

    /// Whether a deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl fmt::Display for WhoisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection { host, port, message } => {
                write!(f, "Connection to {}:{} failed: {}", host, port, message)
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::Read { host, message } => {
                write!(f, "Read from '{}' failed: {}", host, message)
            }
            Self::Write { host, message } => {
                write!(f, "Write to '{}' failed: {}", host, message)
            }
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::File { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for WhoisError {}

impl From<toml::de::Error> for WhoisError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML configuration: {}", err))
    }
}
