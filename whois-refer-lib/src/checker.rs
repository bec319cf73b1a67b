//! Lookup orchestration.
//!
//! This module provides the `WhoisChecker` struct that runs a complete
//! lookup for a domain: the two-hop fetch, availability classification and
//! record extraction.

use crate::availability::is_available;
use crate::error::WhoisError;
use crate::protocols::WhoisClient;
use crate::records::extract_record;
use crate::types::{LookupConfig, LookupResult};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::time::Instant;
use tracing::debug;

/// Runs complete lookups with one configuration.
///
/// # Example
///
/// ```rust,no_run
/// use whois_refer_lib::WhoisChecker;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = WhoisChecker::new();
///     let result = checker.lookup("example.com").await?;
///     println!("available: {}, expires: {}", result.available, result.whois.expiration);
///     Ok(())
/// }
/// ```
pub struct WhoisChecker {
    /// Configuration settings for this checker instance
    config: LookupConfig,
    /// Client performing the two-hop fetch
    client: WhoisClient,
}

impl WhoisChecker {
    /// Create a new checker with default configuration.
    ///
    /// Default settings:
    /// - Root server: whois.iana.org, port 43
    /// - Timeout: 3 seconds per connect, write and read
    /// - Concurrency: 4 lookups at once
    pub fn new() -> Self {
        Self::with_config(LookupConfig::default())
    }

    /// Create a new checker with custom configuration.
    pub fn with_config(config: LookupConfig) -> Self {
        let client = WhoisClient::from_config(&config);
        Self { config, client }
    }

    /// Look up one domain.
    ///
    /// # Errors
    ///
    /// Only the fetch can fail; classification and extraction always succeed.
    pub async fn lookup(&self, domain: &str) -> Result<LookupResult, WhoisError> {
        let start_time = Instant::now();

        let raw = self.client.fetch(domain).await?;
        let available = is_available(&raw);
        let whois = extract_record(&raw);
        let duration = start_time.elapsed();

        debug!(domain, available, elapsed_ms = duration.as_millis() as u64, "lookup complete");

        Ok(LookupResult {
            domain: domain.to_string(),
            available,
            whois,
            raw,
            duration,
        })
    }

    /// Look up several domains, yielding results in input order.
    ///
    /// Up to `concurrency` lookups are in flight at once. Each lookup keeps
    /// its two hops in sequence; only whole lookups overlap.
    pub fn lookup_stream(
        &self,
        domains: &[String],
    ) -> Pin<Box<dyn Stream<Item = (String, Result<LookupResult, WhoisError>)> + Send + '_>> {
        let domains = domains.to_vec();
        let stream = stream::iter(domains)
            .map(move |domain| async move {
                let result = self.lookup(&domain).await;
                (domain, result)
            })
            .buffered(self.config.concurrency.max(1));

        Box::pin(stream)
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Client used for fetches.
    pub fn client(&self) -> &WhoisClient {
        &self.client
    }
}

impl Default for WhoisChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// Fake WHOIS endpoint answering both hops: root queries get a referral
    /// back to this server, registry queries get `registry_answer`.
    async fn fake_whois(registry_answer: &'static [u8]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut hop = 0usize;
            loop {
                let (socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let answer: &[u8] = if hop % 2 == 0 {
                    b"refer: 127.0.0.1\n"
                } else {
                    registry_answer
                };
                hop += 1;

                let mut reader = BufReader::new(socket);
                let mut query = Vec::new();
                let _ = reader.read_until(b'\n', &mut query).await;
                let _ = reader.get_mut().write_all(answer).await;
            }
        });

        port
    }

    fn checker_for(port: u16, concurrency: usize) -> WhoisChecker {
        WhoisChecker::with_config(
            LookupConfig::default()
                .with_root_server("127.0.0.1")
                .with_port(port)
                .with_timeout(Duration::from_secs(2))
                .with_concurrency(concurrency),
        )
    }

    #[tokio::test]
    async fn test_lookup_registered_domain() {
        let port = fake_whois(
            b"Domain Name: EXAMPLE.COM\nCreation Date: 2020-01-01T00:00:00Z\nName Server: NS1.EXAMPLE.COM\n",
        )
        .await;

        let result = checker_for(port, 1).lookup("example.com").await.unwrap();
        assert_eq!(result.domain, "example.com");
        assert!(!result.available);
        assert_eq!(result.whois.created, "2020-01-01T00:00:00Z");
        assert_eq!(result.whois.nameservers, vec!["NS1.EXAMPLE.COM"]);
        assert!(result.raw_text().starts_with("Domain Name: EXAMPLE.COM"));
    }

    #[tokio::test]
    async fn test_lookup_available_domain() {
        let port = fake_whois(b"\nNOT FOUND\n").await;

        let result = checker_for(port, 1).lookup("unregistered.com").await.unwrap();
        assert!(result.available);
        assert!(result.whois.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_stream_keeps_input_order() {
        // One lookup in flight at a time keeps the root/registry alternation intact.
        let port = fake_whois(b"No match").await;
        let checker = checker_for(port, 1);

        let domains = vec!["a.example".to_string(), "b.example".to_string()];
        let results: Vec<_> = checker.lookup_stream(&domains).collect().await;

        let names: Vec<&str> = results.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(names, vec!["a.example", "b.example"]);
        assert!(results.iter().all(|(_, r)| r.as_ref().unwrap().available));
    }

    #[tokio::test]
    async fn test_lookup_propagates_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = checker_for(port, 1).lookup("example.com").await;
        assert!(matches!(result, Err(WhoisError::Connection { .. })));
    }

    #[test]
    fn test_checker_creation() {
        let checker = WhoisChecker::new();
        assert_eq!(checker.config(), &LookupConfig::default());
        assert_eq!(checker.client().root_server(), "whois.iana.org");
    }
}
