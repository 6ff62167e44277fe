//! Per-field validation error lists

use serde::Serialize;
use std::collections::BTreeMap;

/// Mapping from field key to an ordered, non-empty list of human-readable
/// error messages.
///
/// A key present means "at least one validation error"; a key absent means
/// "no known error". Inserting an empty message list is a no-op, so the
/// non-empty guarantee holds by construction. Message order is
/// resolver-defined and preserved; the first message is the one a UI
/// conventionally shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    entries: BTreeMap<String, Vec<String>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the message list for a key. Empty lists are ignored.
    pub fn insert(&mut self, key: impl Into<String>, messages: Vec<String>) {
        if !messages.is_empty() {
            self.entries.insert(key.into(), messages);
        }
    }

    /// Append one message to a key's list, creating the entry if needed.
    pub fn push(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .push(message.into());
    }

    /// Remove a key's messages. Returns true if the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// The primary (first) message for a key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<(String, Vec<String>)> for ErrorReport {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut report = ErrorReport::new();
        for (key, messages) in iter {
            report.insert(key, messages);
        }
        report
    }
}
