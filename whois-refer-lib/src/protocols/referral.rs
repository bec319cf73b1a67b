//! Referral resolution against the root WHOIS authority.
//!
//! The root authority (IANA) knows which registry server is authoritative
//! for each TLD and says so in a `refer:` line:
//!
//! ```text
//! % IANA WHOIS server
//! % for more information on IANA, visit http://www.iana.org
//! % This query returned 1 object
//!
//! refer:        whois.verisign-grs.com
//!
//! domain:       COM
//! ```
//!
//! Asking the root for every query avoids shipping a per-TLD server table
//! that goes stale.

use super::connection::WhoisConnection;
use crate::error::WhoisError;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const REFER_MARKER: &[u8] = b"refer";

/// Ask `root_server` which registry is authoritative for `domain`.
///
/// Scans the answer line by line and returns as soon as the first line
/// containing `refer` and a colon is seen; the remaining answer is not read.
///
/// # Returns
///
/// The trimmed referral hostname, or an empty string when the root answer
/// carries no referral. A missing referral is not an error here; the fetch
/// that follows will fail to connect to an empty host.
///
/// # Errors
///
/// Connection, write and read failures are returned unmodified.
pub async fn resolve_referral(
    root_server: &str,
    port: u16,
    domain: &str,
    timeout: Duration,
) -> Result<String, WhoisError> {
    let mut conn = WhoisConnection::open(root_server, port, timeout).await?;
    conn.write_line(domain, timeout).await?;

    let deadline = Instant::now() + timeout;
    let mut line = Vec::new();

    loop {
        line.clear();
        if conn.read_line(&mut line, deadline).await? == 0 {
            break;
        }

        if let Some(referral) = referral_from_line(&line) {
            debug!(domain, root = root_server, referral = %referral, "referral resolved");
            return Ok(referral);
        }
    }

    debug!(domain, root = root_server, "root answer carried no referral");
    conn.close().await;
    Ok(String::new())
}

/// Extract the referral host from a single response line.
///
/// A line qualifies when it contains `refer` and a colon. The value is the
/// text after the first colon, with surrounding whitespace removed.
pub(crate) fn referral_from_line(line: &[u8]) -> Option<String> {
    if !line.windows(REFER_MARKER.len()).any(|w| w == REFER_MARKER) {
        return None;
    }

    let colon = line.iter().position(|&b| b == b':')?;
    let value = line[colon + 1..].trim_ascii();

    Some(String::from_utf8_lossy(value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// Serve one connection with `answer`, returning the query line received.
    async fn serve_once(answer: &'static [u8]) -> (u16, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut query = Vec::new();
            reader.read_until(b'\n', &mut query).await.unwrap();
            // The client may hang up early once it has its referral.
            let _ = reader.get_mut().write_all(answer).await;
            query
        });

        (port, handle)
    }

    #[test]
    fn test_referral_from_line() {
        assert_eq!(
            referral_from_line(b"refer:        whois.verisign-grs.com\n"),
            Some("whois.verisign-grs.com".to_string())
        );
        assert_eq!(
            referral_from_line(b"refer: whois.nic.io\r\n"),
            Some("whois.nic.io".to_string())
        );
        assert_eq!(referral_from_line(b"domain:       COM\n"), None);
        assert_eq!(referral_from_line(b"% referral service\n"), None);
        assert_eq!(referral_from_line(b"refer:   \n"), Some(String::new()));
    }

    #[test]
    fn test_referral_is_trimmed_or_empty() {
        let lines: [&[u8]; 4] = [
            b"refer:\twhois.example.net \t\r\n",
            b"   refer:whois.example.net",
            b"refer:",
            b"refer:    ",
        ];

        for line in lines {
            let referral = referral_from_line(line).unwrap();
            assert_eq!(referral, referral.trim());
            assert!(referral.is_empty() || referral == "whois.example.net");
        }
    }

    #[tokio::test]
    async fn test_resolve_referral_from_root_answer() {
        let (port, server) = serve_once(
            b"% IANA WHOIS server\n% This query returned 1 object\n\nrefer:        whois.verisign-grs.com\n\ndomain:       COM\n",
        )
        .await;

        let referral = resolve_referral("127.0.0.1", port, "example.com", Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(referral, "whois.verisign-grs.com");
        assert_eq!(server.await.unwrap(), b"example.com\n".to_vec());
    }

    #[tokio::test]
    async fn test_first_refer_line_wins() {
        let (port, _server) = serve_once(
            b"refer: whois.first.example\nrefer: whois.second.example\n",
        )
        .await;

        let referral = resolve_referral("127.0.0.1", port, "example.com", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(referral, "whois.first.example");
    }

    #[tokio::test]
    async fn test_missing_refer_line_is_empty_not_error() {
        let (port, _server) =
            serve_once(b"% IANA WHOIS server\n% This query returned 0 objects.\n").await;

        let referral = resolve_referral("127.0.0.1", port, "example.zz", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(referral, "");
    }

    #[tokio::test]
    async fn test_unreachable_root_propagates_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result =
            resolve_referral("127.0.0.1", port, "example.com", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(WhoisError::Connection { .. })));
    }
}
