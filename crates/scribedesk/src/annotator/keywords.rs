use serde::{Deserialize, Deserializer, Serialize};

use crate::api::AnalysisRule;

/// Keyword category, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    Critical,
    Caution,
    Positive,
}

impl KeywordCategory {
    /// All categories in priority order.
    pub const ALL: [KeywordCategory; 3] = [
        KeywordCategory::Critical,
        KeywordCategory::Caution,
        KeywordCategory::Positive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordCategory::Critical => "critical",
            KeywordCategory::Caution => "caution",
            KeywordCategory::Positive => "positive",
        }
    }

    /// Parses an admin rule category. `negative` is the rule name for caution.
    pub fn from_rule_category(category: &str) -> Option<Self> {
        match category.trim().to_lowercase().as_str() {
            "critical" => Some(KeywordCategory::Critical),
            "negative" | "caution" => Some(KeywordCategory::Caution),
            "positive" => Some(KeywordCategory::Positive),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terms of one category, deduplicated case-insensitively in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    pub category: KeywordCategory,
    terms: Vec<String>,
}

impl KeywordSet {
    /// Blank terms are dropped; surrounding whitespace is trimmed.
    pub fn new<I, S>(category: KeywordCategory, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            category,
            terms: Vec::new(),
        };
        for term in terms {
            set.push(term.as_ref());
        }
        set
    }

    /// Parses a comma-delimited list.
    pub fn from_delimited(category: KeywordCategory, list: &str) -> Self {
        Self::new(category, list.split(','))
    }

    pub fn push(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        let lowered = term.to_lowercase();
        if !self.terms.iter().any(|t| t.to_lowercase() == lowered) {
            self.terms.push(term.to_string());
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn to_delimited(&self) -> String {
        self.terms.join(", ")
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keyword lists as stored by the backend, one comma-delimited string per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(rename = "keywords_red", default, deserialize_with = "string_or_empty")]
    pub critical: String,
    #[serde(rename = "keywords", default, deserialize_with = "string_or_empty")]
    pub caution: String,
    #[serde(rename = "keywords_green", default, deserialize_with = "string_or_empty")]
    pub positive: String,
}

impl KeywordConfig {
    pub fn raw(&self, category: KeywordCategory) -> &str {
        match category {
            KeywordCategory::Critical => &self.critical,
            KeywordCategory::Caution => &self.caution,
            KeywordCategory::Positive => &self.positive,
        }
    }

    /// The three sets, in priority order.
    pub fn sets(&self) -> Vec<KeywordSet> {
        KeywordCategory::ALL
            .iter()
            .map(|&category| KeywordSet::from_delimited(category, self.raw(category)))
            .collect()
    }

    pub fn from_sets(sets: &[KeywordSet]) -> Self {
        let mut merged: Vec<KeywordSet> = KeywordCategory::ALL
            .iter()
            .map(|&c| KeywordSet::new(c, std::iter::empty::<&str>()))
            .collect();
        for set in sets {
            if let Some(target) = merged.iter_mut().find(|m| m.category == set.category) {
                for term in set.terms() {
                    target.push(term);
                }
            }
        }
        let delimited = |c: KeywordCategory| {
            merged
                .iter()
                .find(|m| m.category == c)
                .map(KeywordSet::to_delimited)
                .unwrap_or_default()
        };
        Self {
            critical: delimited(KeywordCategory::Critical),
            caution: delimited(KeywordCategory::Caution),
            positive: delimited(KeywordCategory::Positive),
        }
    }

    /// Folds active admin rules into keyword lists.
    pub fn from_rules(rules: &[AnalysisRule]) -> Self {
        let mut sets = Vec::new();
        for rule in rules.iter().filter(|r| r.is_active) {
            match KeywordCategory::from_rule_category(&rule.category) {
                Some(category) => sets.push(KeywordSet::from_delimited(category, &rule.keywords)),
                None => log::warn!(
                    "Skipping rule {:?} with unknown category '{}'",
                    rule.name,
                    rule.category
                ),
            }
        }
        Self::from_sets(&sets)
    }
}
