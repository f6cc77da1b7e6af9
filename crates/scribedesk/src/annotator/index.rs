use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use super::keywords::{KeywordCategory, KeywordConfig, KeywordSet};
use crate::error::AnnotationConfigError;

/// Longest term accepted, in characters.
pub const MAX_TERM_LEN: usize = 200;

/// Upper bound on the compiled matcher size.
const MATCHER_SIZE_LIMIT: usize = 16 * 1024 * 1024;

/// Compiled matcher over all configured terms.
///
/// Terms are matched case-insensitively, longest first. A term configured in
/// more than one category belongs to the highest-priority one.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    matcher: Option<Regex>,
    /// Lowercased term to its winning category.
    categories: HashMap<String, KeywordCategory>,
    errors: Vec<AnnotationConfigError>,
}

impl KeywordIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: &KeywordConfig) -> Self {
        Self::build(&config.sets())
    }

    /// Sets with invalid terms are dropped whole and reported in [`errors`](Self::errors).
    pub fn build(sets: &[KeywordSet]) -> Self {
        let mut errors = Vec::new();
        let mut accepted: Vec<&KeywordSet> = sets
            .iter()
            .filter(|set| match validate_set(set) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Dropping keyword set: {}", e);
                    errors.push(e);
                    false
                }
            })
            .collect();
        accepted.sort_by_key(|set| set.category);

        loop {
            let categories = resolve_categories(&accepted);
            if categories.is_empty() {
                return Self {
                    matcher: None,
                    categories,
                    errors,
                };
            }

            match compile(&categories) {
                Ok(matcher) => {
                    log::debug!("Compiled keyword index with {} terms", categories.len());
                    return Self {
                        matcher: Some(matcher),
                        categories,
                        errors,
                    };
                }
                Err(reason) => {
                    // Shed the lowest-priority set and try again.
                    let Some(dropped) = accepted.pop() else {
                        return Self::default();
                    };
                    let error = AnnotationConfigError::Compile {
                        category: dropped.category.to_string(),
                        reason,
                    };
                    log::warn!("Dropping keyword set: {}", error);
                    errors.push(error);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_none()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn category_of(&self, term: &str) -> Option<KeywordCategory> {
        self.categories.get(&term.to_lowercase()).copied()
    }

    /// Problems found while building; the affected sets are not matched.
    pub fn errors(&self) -> &[AnnotationConfigError] {
        &self.errors
    }

    pub(crate) fn matcher(&self) -> Option<&Regex> {
        self.matcher.as_ref()
    }
}

fn validate_set(set: &KeywordSet) -> Result<(), AnnotationConfigError> {
    for term in set.terms() {
        let len = term.chars().count();
        if len > MAX_TERM_LEN {
            return Err(AnnotationConfigError::TermTooLong {
                category: set.category.to_string(),
                term: term.chars().take(32).collect(),
                len,
                max: MAX_TERM_LEN,
            });
        }
        if term.chars().any(char::is_control) {
            return Err(AnnotationConfigError::ControlCharacters {
                category: set.category.to_string(),
                term: term.escape_debug().to_string(),
            });
        }
    }
    Ok(())
}

/// `sets` must be in priority order; the first category to claim a term keeps it.
fn resolve_categories(sets: &[&KeywordSet]) -> HashMap<String, KeywordCategory> {
    let mut categories = HashMap::new();
    for set in sets {
        for term in set.terms() {
            categories
                .entry(term.to_lowercase())
                .or_insert(set.category);
        }
    }
    categories
}

fn compile(categories: &HashMap<String, KeywordCategory>) -> Result<Regex, String> {
    let mut terms: Vec<&str> = categories.keys().map(String::as_str).collect();
    // Longest first so the alternation prefers it at a shared start position.
    terms.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    let pattern = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(MATCHER_SIZE_LIMIT)
        .build()
        .map_err(|e| e.to_string())
}
