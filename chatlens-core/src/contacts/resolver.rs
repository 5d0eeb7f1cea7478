//! Identifier → display name resolution.
//!
//! Lookup order:
//! 1. Exact match on the normalized identifier.
//! 2. First directory entry (in insertion order) where either number is a
//!    suffix of the other. This covers numbers stored with or without a
//!    country code.
//!
//! Ambiguous suffix matches are not ranked; the first candidate wins. The
//! scan is linear in directory size, which is fine for a personal address
//! book. A reversed-digit trie would make it logarithmic with the same
//! results.

use super::ContactDirectory;
use crate::phone::normalize_phone;
use std::sync::Arc;

/// Resolve a raw identifier against a directory.
///
/// Identifiers without digits (email handles, group ids) never resolve.
pub fn resolve<'a>(raw: &str, directory: &'a ContactDirectory) -> Option<&'a str> {
    let normalized = normalize_phone(raw);
    if normalized.is_empty() {
        return None;
    }

    if let Some(name) = directory.get(&normalized) {
        return Some(name);
    }

    directory
        .iter()
        .find(|(stored, _)| normalized.ends_with(stored) || stored.ends_with(normalized.as_str()))
        .map(|(_, name)| name)
}

/// Shared handle on a loaded directory.
#[derive(Debug, Clone)]
pub struct ContactResolver {
    directory: Arc<ContactDirectory>,
}

impl ContactResolver {
    pub fn new(directory: Arc<ContactDirectory>) -> Self {
        Self { directory }
    }

    /// Resolver with no contacts; nothing resolves.
    pub fn empty() -> Self {
        Self::new(Arc::new(ContactDirectory::new()))
    }

    /// Name for `raw`, if any.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        resolve(raw, &self.directory)
    }

    /// Name for `raw`, falling back to `raw` itself.
    pub fn display_name(&self, raw: &str) -> String {
        self.resolve(raw).unwrap_or(raw).to_string()
    }

    pub fn directory(&self) -> &ContactDirectory {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(entries: &[(&str, &str)]) -> ContactDirectory {
        ContactDirectory::from_entries(entries.iter().copied())
    }

    #[test]
    fn test_exact_match() {
        let dir = directory(&[("14155551234", "Alice")]);
        assert_eq!(resolve("+1 (415) 555-1234", &dir), Some("Alice"));
    }

    #[test]
    fn test_suffix_match_missing_country_code() {
        let dir = directory(&[("4155551234", "Alice")]);
        assert_eq!(resolve("14155551234", &dir), Some("Alice"));
        assert_eq!(resolve("+14155551234", &dir), Some("Alice"));
    }

    #[test]
    fn test_suffix_match_extra_country_code_in_directory() {
        let dir = directory(&[("14155551234", "Alice")]);
        assert_eq!(resolve("4155551234", &dir), Some("Alice"));
    }

    #[test]
    fn test_exact_beats_earlier_suffix_candidate() {
        // "5551234" is a suffix of the query and comes first, but the exact key wins
        let dir = directory(&[("5551234", "Suffix"), ("14155551234", "Exact")]);
        assert_eq!(resolve("14155551234", &dir), Some("Exact"));
    }

    #[test]
    fn test_first_suffix_candidate_wins() {
        let dir = directory(&[("5551234", "First"), ("4155551234", "Second")]);
        assert_eq!(resolve("14155551234", &dir), Some("First"));

        let dir = directory(&[("4155551234", "Second"), ("5551234", "First")]);
        assert_eq!(resolve("14155551234", &dir), Some("Second"));
    }

    #[test]
    fn test_no_match() {
        let dir = directory(&[("4155551234", "Alice")]);
        assert_eq!(resolve("+16505550000", &dir), None);
        assert_eq!(resolve("anything", &ContactDirectory::new()), None);
    }

    #[test]
    fn test_non_numeric_identifier_never_matches() {
        let dir = directory(&[("4155551234", "Alice")]);
        assert_eq!(resolve("friend@example.com", &dir), None);
        assert_eq!(resolve("", &dir), None);
    }

    #[test]
    fn test_display_name_falls_back_to_raw() {
        let resolver = ContactResolver::new(Arc::new(directory(&[("4155551234", "Alice")])));
        assert_eq!(resolver.display_name("+14155551234"), "Alice");
        assert_eq!(resolver.display_name("+16505550000"), "+16505550000");
        assert_eq!(ContactResolver::empty().display_name("x"), "x");
    }
}
