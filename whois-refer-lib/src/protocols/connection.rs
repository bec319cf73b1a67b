//! Deadline-bound TCP connections for the WHOIS wire protocol.
//!
//! RFC 3912 is as small as a protocol gets: the client sends one line, the
//! server writes its whole answer and closes the connection. A clean EOF is
//! therefore the success signal for reading, not an error.
//!
//! Every blocking point (connect, write, read) is bounded by the timeout the
//! caller threads through. There are no retries at this layer.

use crate::error::WhoisError;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::debug;

/// One open connection to a WHOIS server.
pub struct WhoisConnection {
    reader: BufReader<TcpStream>,
    host: String,
    port: u16,
    /// Deadline budget given at open, reused for reads
    timeout: Duration,
}

impl WhoisConnection {
    /// Open a TCP connection to `host:port`.
    ///
    /// # Errors
    ///
    /// Returns `WhoisError::Connection` if the host is empty, cannot be
    /// resolved, refuses the connection, or the handshake does not complete
    /// within `timeout`.
    pub async fn open(host: &str, port: u16, timeout: Duration) -> Result<Self, WhoisError> {
        if host.is_empty() {
            return Err(WhoisError::connection(host, port, "no server to connect to"));
        }

        debug!(host, port, "connecting to WHOIS server");

        let stream = match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(WhoisError::connection(host, port, e.to_string())),
            Err(_) => {
                return Err(WhoisError::connection(
                    host,
                    port,
                    format!("handshake did not complete within {:?}", timeout),
                ))
            }
        };

        Ok(Self {
            reader: BufReader::new(stream),
            host: host.to_string(),
            port,
            timeout,
        })
    }

    /// Host this connection was opened to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port this connection was opened to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Write `text` followed by a single `\n` terminator.
    pub async fn write_line(&mut self, text: &str, timeout: Duration) -> Result<(), WhoisError> {
        let mut line = Vec::with_capacity(text.len() + 1);
        line.extend_from_slice(text.as_bytes());
        line.push(b'\n');

        let stream = self.reader.get_mut();
        let write = async {
            stream.write_all(&line).await?;
            stream.flush().await
        };

        match tokio::time::timeout(timeout, write).await {
            Ok(Ok(())) => {
                debug!(host = %self.host, bytes = line.len(), "query line written");
                Ok(())
            }
            Ok(Err(e)) => Err(WhoisError::write(&self.host, e.to_string())),
            Err(_) => Err(WhoisError::timeout(
                format!("write to {}", self.host),
                timeout,
            )),
        }
    }

    /// Read one line (terminator included) into `buf`.
    ///
    /// Returns the number of bytes read; `0` means the peer closed the stream.
    pub async fn read_line(
        &mut self,
        buf: &mut Vec<u8>,
        deadline: Instant,
    ) -> Result<usize, WhoisError> {
        match tokio::time::timeout_at(deadline, self.reader.read_until(b'\n', buf)).await {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => Err(WhoisError::read(&self.host, e.to_string())),
            Err(_) => Err(WhoisError::timeout(
                format!("read from {}", self.host),
                self.timeout,
            )),
        }
    }

    /// Read everything until the peer closes the connection.
    ///
    /// Bounded by the timeout the connection was opened with.
    pub async fn read_all(&mut self) -> Result<Vec<u8>, WhoisError> {
        let timeout = self.timeout;
        let mut response = Vec::new();

        match tokio::time::timeout(timeout, self.reader.read_to_end(&mut response)).await {
            Ok(Ok(n)) => {
                debug!(host = %self.host, bytes = n, "response read to EOF");
                Ok(response)
            }
            Ok(Err(e)) => Err(WhoisError::read(&self.host, e.to_string())),
            Err(_) => Err(WhoisError::timeout(
                format!("read from {}", self.host),
                timeout,
            )),
        }
    }

    /// Shut the write half down and release the socket.
    pub async fn close(mut self) {
        if let Err(e) = self.reader.get_mut().shutdown().await {
            // The answer has already been read; a failed shutdown changes nothing.
            debug!(host = %self.host, error = %e, "shutdown after read failed");
        }
    }
}
