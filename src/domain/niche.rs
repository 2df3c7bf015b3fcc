use std::fmt;

use itertools::Itertools;
use serde::Serialize;

pub const MAX_NICHE_KEY_LEN: usize = 100;

/// Canonical form of a free-text niche query. Seen history is scoped by this
/// key, so queries differing only in case, punctuation or spacing share it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NicheKey(String);

impl NicheKey {
    pub fn derive(query: &str) -> Self {
        let stripped: String = query
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        let joined = stripped.split_whitespace().join("_");
        let capped: String = joined.chars().take(MAX_NICHE_KEY_LEN).collect();

        NicheKey(capped.trim_end_matches('_').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NicheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn derive_niche_key(query: &str) -> NicheKey {
    NicheKey::derive(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn niche_key_ignores_case_and_punctuation() {
        assert_eq!(derive_niche_key("CRM Tools!"), derive_niche_key("crm tools"));
        assert_eq!(derive_niche_key("  CRM   tools "), derive_niche_key("crm tools."));
        assert_eq!(derive_niche_key("crm-tools").as_str(), "crmtools");
        assert_eq!(derive_niche_key("CRM Tools!").as_str(), "crm_tools");
    }

    #[test]
    fn niche_key_is_capped() {
        let query = "word ".repeat(60);
        let key = derive_niche_key(&query);

        assert!(key.as_str().chars().count() <= MAX_NICHE_KEY_LEN);
        assert!(!key.as_str().ends_with('_'));
    }
}
