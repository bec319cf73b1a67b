//! Record extraction from free-text WHOIS responses.
//!
//! There is no schema for WHOIS output. Most registries print
//! `Name: value` lines, but every registry names its fields differently:
//! `Creation Date`, `Created On`, `created`, `Domain Registration Date`...
//! Instead of a lookup table of every registry's vocabulary, each canonical
//! field is resolved by picking the raw field name most similar to it, as
//! long as the similarity clears [`MATCH_THRESHOLD`].
//!
//! Extraction never fails. Anything that cannot be resolved stays empty.

use crate::types::Record;
use std::collections::HashMap;
use tracing::trace;

/// Minimum similarity (exclusive) for a raw field name to count as a match.
pub const MATCH_THRESHOLD: f64 = 0.70;

/// Target names for the canonical record fields.
pub const CREATED: &str = "Created";
pub const UPDATED: &str = "Updated";
pub const EXPIRATION: &str = "Expiration";
pub const NAMESERVERS: &str = "Nameservers";
pub const STATUS: &str = "Status";
pub const REFERRAL: &str = "Referral";

/// Field names and their aggregated values for one response.
///
/// Repeated field names are folded into one entry whose value joins the
/// individual values with commas, in the order they appeared. Iteration
/// follows first appearance.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl FieldIndex {
    /// Aggregated value for an exact raw field name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.positions
            .get(name)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, value)` pairs in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn insert(&mut self, name: String, value: String) {
        match self.positions.get(&name) {
            Some(&i) => {
                let existing = &mut self.entries[i].1;
                existing.push(',');
                existing.push_str(&value);
            }
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FieldIndex {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut index = FieldIndex::default();
        for (name, value) in iter {
            index.insert(name.to_string(), value.to_string());
        }
        index
    }
}

/// Split a line on its first colon into a trimmed `(name, value)` pair.
///
/// Banner lines such as `>>> Last update of whois database: ... <<<` are
/// not fields.
fn split_field(line: &[u8]) -> Option<(String, String)> {
    if line.trim_ascii_start().starts_with(b">>>") {
        return None;
    }
    let colon = line.iter().position(|&b| b == b':')?;
    let name = String::from_utf8_lossy(line[..colon].trim_ascii()).into_owned();
    let value = String::from_utf8_lossy(line[colon + 1..].trim_ascii()).into_owned();
    Some((name, value))
}

/// Build the field index of a raw response.
///
/// Lines are split on `\n`. A line contributes when it contains a colon and
/// the text after the first colon is not blank.
pub fn build_field_index(data: &[u8]) -> FieldIndex {
    let mut index = FieldIndex::default();

    for line in data.split(|&b| b == b'\n') {
        if let Some((name, value)) = split_field(line) {
            if !value.is_empty() {
                index.insert(name, value);
            }
        }
    }

    index
}

/// Similarity between a raw field name and a canonical target, in `[0, 1]`.
///
/// Case-insensitive Jaro-Winkler, which weights a shared prefix. The score is
/// the best of the whole name and each of its words, so that
/// `Domain Status` matches `Status` as well as `Name Server` matches
/// `Nameservers`. Words shorter than 60% of the target are not scored on
/// their own: `name` in `Domain Name` must not pass for `Nameservers`.
pub fn field_similarity(name: &str, target: &str) -> f64 {
    let name = name.to_lowercase();
    let target = target.to_lowercase();
    let min_word = target.chars().count() * 3;

    name.split_whitespace()
        .filter(|word| word.chars().count() * 5 >= min_word)
        .map(|word| strsim::jaro_winkler(word, &target))
        .fold(strsim::jaro_winkler(&name, &target), f64::max)
}

/// Resolve a canonical field against the index.
///
/// Returns the value of the most similar raw field name when its similarity
/// exceeds [`MATCH_THRESHOLD`], otherwise an empty string. On equal scores
/// the field that appeared first wins.
pub fn resolve_canonical_field(index: &FieldIndex, target: &str) -> String {
    let mut best_score = 0.0;
    let mut best_value = "";

    for (name, value) in index.iter() {
        let score = field_similarity(name, target);
        trace!(target_field = target, name, score, "field candidate");
        if score > best_score {
            best_score = score;
            best_value = value;
        }
    }

    if best_score > MATCH_THRESHOLD {
        best_value.to_string()
    } else {
        String::new()
    }
}

/// Split an aggregated value back into its parts; empty yields no parts.
fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(str::to_string).collect()
}

/// Find the referral by scanning raw lines directly.
///
/// Each line with a colon whose name scores above the threshold against
/// `Referral` is a candidate; its value is the text after the first `": "`
/// (or after the first colon when there is no space). The last candidate
/// wins.
fn resolve_referral_field(data: &[u8]) -> String {
    let mut referral = String::new();

    for line in data.split(|&b| b == b'\n') {
        let text = String::from_utf8_lossy(line);
        let Some((name, rest)) = text.split_once(':') else {
            continue;
        };

        let value = match text.split_once(": ") {
            Some((_, after)) => after.trim(),
            None => rest.trim(),
        };
        if value.is_empty() {
            continue;
        }

        if field_similarity(name.trim(), REFERRAL) > MATCH_THRESHOLD {
            referral = value.to_string();
        }
    }

    referral
}

/// Parse a raw WHOIS response into a canonical [`Record`].
///
/// Built for `.com`-style thin registry output; other registries work to
/// the extent their field names resemble the canonical ones.
pub fn extract_record(data: &[u8]) -> Record {
    let index = build_field_index(data);

    Record {
        nameservers: split_list(&resolve_canonical_field(&index, NAMESERVERS)),
        status: split_list(&resolve_canonical_field(&index, STATUS)),
        created: resolve_canonical_field(&index, CREATED),
        updated: resolve_canonical_field(&index, UPDATED),
        expiration: resolve_canonical_field(&index, EXPIRATION),
        referral: resolve_referral_field(data),
    }
}
