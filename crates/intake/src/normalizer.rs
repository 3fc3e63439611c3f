//! Symptom Token Normalization

use std::collections::HashSet;

/// Turns free-text symptoms ("Chest Pain", "shortness_of breath") into the
/// hyphen-joined lowercase tokens the rule catalog uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymptomNormalizer;

impl SymptomNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one symptom; blank input yields `None`
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let words: Vec<String> = raw
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect();

        if words.is_empty() {
            None
        } else {
            Some(words.join("-"))
        }
    }

    /// Normalize a list, dropping blanks and repeats while keeping first-seen order
    pub fn normalize_all<I, S>(&self, raw: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        raw.into_iter()
            .filter_map(|symptom| self.normalize(symptom.as_ref()))
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }
}
