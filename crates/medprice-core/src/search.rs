use serde::Serialize;

use crate::CoreError;

/// Default minimum length, in characters, of a trimmed search term.
pub const DEFAULT_MIN_TERM_LEN: usize = 2;

/// A trimmed, non-empty medicine name supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Trims `raw` and validates it against `min_len`.
    ///
    /// Empty and whitespace-only input is always rejected, even when
    /// `min_len` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSearchTerm`] when the trimmed term is empty
    /// or shorter than `min_len` characters.
    pub fn parse(raw: &str, min_len: usize) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidSearchTerm {
                reason: "medicine name is required".to_string(),
            });
        }
        let len = trimmed.chars().count();
        if len < min_len {
            return Err(CoreError::InvalidSearchTerm {
                reason: format!("medicine name must be at least {min_len} characters, got {len}"),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whitespace-separated words of the term, for query URL encoding.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl std::fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let term = SearchTerm::parse("  paracetamol 500mg \n", DEFAULT_MIN_TERM_LEN).unwrap();
        assert_eq!(term.as_str(), "paracetamol 500mg");
    }

    #[test]
    fn parse_rejects_empty() {
        let err = SearchTerm::parse("", DEFAULT_MIN_TERM_LEN).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSearchTerm { .. }));
    }

    #[test]
    fn parse_rejects_whitespace_only_even_without_min_len() {
        assert!(SearchTerm::parse("   \t ", 0).is_err());
    }

    #[test]
    fn parse_rejects_single_character() {
        let err = SearchTerm::parse(" a ", DEFAULT_MIN_TERM_LEN).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidSearchTerm { ref reason } if reason.contains("at least 2")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn parse_counts_characters_not_bytes() {
        assert!(SearchTerm::parse("é", DEFAULT_MIN_TERM_LEN).is_err());
        assert!(SearchTerm::parse("éé", DEFAULT_MIN_TERM_LEN).is_ok());
    }

    #[test]
    fn words_splits_on_any_whitespace() {
        let term = SearchTerm::parse("dolo  650\ttablet", DEFAULT_MIN_TERM_LEN).unwrap();
        assert_eq!(term.words().collect::<Vec<_>>(), vec!["dolo", "650", "tablet"]);
    }
}
