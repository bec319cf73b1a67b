//! Display logic for the whois-refer CLI.
//!
//! Plain output is the raw registry answer followed by the verdict line,
//! which scripts can match on. Styling comes from the `console` crate and
//! switches itself off when stdout is not a terminal.

use console::style;
use whois_refer_lib::{Record, WhoisError};

/// Verdict printed for a domain the registry does not know.
pub const AVAILABLE: &str = "available";

/// Verdict printed for everything else, failed lookups included.
pub const NOT_AVAILABLE: &str = "not available";

/// Print a section header when several domains are looked up in one run.
pub fn print_domain_header(domain: &str) {
    println!("{}", style(format!("── {} ──", domain)).cyan().bold());
}

/// Print the raw registry answer exactly as received.
pub fn print_raw(raw: &str) {
    println!("{}", raw);
}

/// Print the availability verdict line.
pub fn print_verdict(available: bool) {
    if available {
        println!("{}", style(AVAILABLE).green().bold());
    } else {
        println!("{}", style(NOT_AVAILABLE).red());
    }
}

/// Print the extracted record as aligned `Name: value` lines.
pub fn print_record(record: &Record) {
    println!();
    for (label, value) in record_lines(record) {
        println!("{} {}", style(format!("{:<12}", format!("{}:", label))).dim(), value);
    }
}

/// Lines shown by `--records`; list fields are joined with commas.
pub fn record_lines(record: &Record) -> Vec<(&'static str, String)> {
    vec![
        ("Created", record.created.clone()),
        ("Updated", record.updated.clone()),
        ("Expiration", record.expiration.clone()),
        ("Nameservers", record.nameservers.join(", ")),
        ("Status", record.status.join(", ")),
        ("Referral", record.referral.clone()),
    ]
}

/// Report a failed lookup on stderr.
pub fn print_lookup_error(domain: &str, error: &WhoisError) {
    let hint = if error.is_timeout() {
        " (try a longer --timeout)"
    } else {
        ""
    };
    eprintln!(
        "{} {}: {}{}",
        style("Error").red().bold(),
        domain,
        error,
        style(hint).dim()
    );
}
