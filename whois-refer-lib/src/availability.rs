//! Availability classification of raw WHOIS responses.
//!
//! Registries that do not know a domain answer with a short fixed phrase
//! instead of a record. The phrase differs per registry, so the classifier
//! holds a catalog of the known ones and compares the whole response against
//! it. The comparison is full-string equality: a response that merely
//! contains a phrase (for example `No match for "EXAMPLE.ZZ".`) is not
//! classified as available.

use lazy_static::lazy_static;
use std::collections::HashSet;

/// Negative-result phrases, verbatim as the registries send them.
///
/// Spelling mistakes and truncations (`not registred,`, `...selected sourc`)
/// are what the registries actually answer and must stay as they are.
pub const NOT_FOUND_PHRASES: [&str; 34] = [
    "No Data Found",
    "NOT FOUND",
    "Domain Status: Available",
    "not registred,",
    "No match",
    "This query returned 0 objects",
    "Domain Not Found",
    "nothing found",
    "No records matching",
    "Status: AVAILABLE",
    "does not exist in database",
    "Status: Not Registered",
    "No match for",
    "Object does not exist",
    "We do not have an entry in our database matching your query",
    "no existe",
    "no matching record",
    "No domain records were found to match",
    "No entries found",
    "Status: free",
    "No entries found for the selected sourc",
    "not found...",
    "The domain has not been registered",
    "Not Registered",
    "No data was found",
    "This domain is available for registration",
    "Nothing found for this query",
    "No such domain",
    "No Objects Found",
    "Object_Not_Found",
    "No information available",
    "Domain is not registered",
    "domain name not known",
    "not found in database",
];

lazy_static! {
    static ref NOT_FOUND_SET: HashSet<&'static str> = NOT_FOUND_PHRASES.iter().copied().collect();
}

/// Tell whether a WHOIS response says the domain is not registered.
///
/// `data` should be the output of a fetch. Surrounding whitespace is ignored;
/// everything else must match a catalog phrase exactly, case included.
/// Responses that are not valid UTF-8 never match.
pub fn is_available(data: &[u8]) -> bool {
    std::str::from_utf8(data.trim_ascii())
        .map(|text| NOT_FOUND_SET.contains(text))
        .unwrap_or(false)
}
