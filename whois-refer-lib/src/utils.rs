//! Utility functions for domain input handling.

use crate::error::WhoisError;

/// Validate that a domain can be sent as a single WHOIS query line.
///
/// This is deliberately not a full RFC 1035 check: registries answer for
/// IDNs, handles and other query forms. It only rejects input that would
/// break the one-line request framing.
///
/// # Arguments
///
/// * `domain` - The domain name to validate
///
/// # Returns
///
/// `Ok(())` if valid, `Err(WhoisError::InvalidDomain)` if invalid.
pub fn validate_domain(domain: &str) -> Result<(), WhoisError> {
    if domain.trim().is_empty() {
        return Err(WhoisError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(WhoisError::invalid_domain(
            domain,
            "Domain name cannot contain whitespace or control characters",
        ));
    }

    Ok(())
}

/// Clean up user-supplied domain arguments.
///
/// Trims each entry, drops empty ones and removes a trailing root dot
/// (`example.com.` queries the same name as `example.com`).
pub fn normalize_domains(domains: &[String]) -> Vec<String> {
    domains
        .iter()
        .map(|d| d.trim().trim_end_matches('.').to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("xn--bcher-kva.example").is_ok());
        assert!(validate_domain("").is_err());
        assert!(validate_domain("   ").is_err());
        assert!(validate_domain("example.com\r\n").is_err());
        assert!(validate_domain("example .com").is_err());
    }

    #[test]
    fn test_normalize_domains() {
        let domains = vec![
            " example.com ".to_string(),
            "".to_string(),
            "example.org.".to_string(),
        ];
        assert_eq!(normalize_domains(&domains), vec!["example.com", "example.org"]);
    }
}
