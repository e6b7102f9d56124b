// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Keyword spam classifier.
//!
//! A submission is flagged when any denylisted phrase appears in its text,
//! ignoring case. Flagging is advisory: spam is stored, only tagged.

use crate::config::SpamConfig;
use tracing::debug;

/// Static denylist classifier.
#[derive(Debug, Clone)]
pub struct SpamClassifier {
    /// Lower-cased, non-empty phrases
    phrases: Vec<String>,
}

impl SpamClassifier {
    /// Create a classifier from configuration.
    pub fn new(config: &SpamConfig) -> Self {
        Self::from_phrases(config.denylist.iter().map(String::as_str))
    }

    /// Create a classifier from an explicit phrase list.
    pub fn from_phrases<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Self {
        let phrases = phrases
            .into_iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    /// Returns `true` when `text` contains a denylisted phrase.
    pub fn classify(&self, text: &str) -> bool {
        self.matched_phrase(text).is_some()
    }

    /// The first denylisted phrase found in `text`, if any.
    pub fn matched_phrase(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        let hit = self
            .phrases
            .iter()
            .find(|phrase| haystack.contains(phrase.as_str()))
            .map(String::as_str);
        if let Some(phrase) = hit {
            debug!(phrase, "Spam phrase matched");
        }
        hit
    }

    /// Classify a contact submission's subject and message together.
    pub fn classify_submission(&self, subject: &str, message: &str) -> bool {
        self.classify(&format!("{subject}\n{message}"))
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }
}

impl Default for SpamClassifier {
    fn default() -> Self {
        Self::new(&SpamConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_phrases() {
        let classifier = SpamClassifier::default();

        assert!(classifier.classify("Congratulations, click here to claim your prize"));
        assert!(!classifier.classify("Let's schedule a call tomorrow"));
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = SpamClassifier::default();

        assert!(classifier.classify("WINNER!!!"));
        assert!(classifier.classify("winner"));
        assert!(classifier.classify("Visit our CaSiNo"));
    }

    #[test]
    fn test_substring_match() {
        let classifier = SpamClassifier::default();

        // Matches inside larger words too
        assert!(classifier.classify("the lotteryresults are in"));
        assert_eq!(
            classifier.matched_phrase("get FREE MONEY now"),
            Some("free money")
        );
    }

    #[test]
    fn test_repeat_calls_agree() {
        let classifier = SpamClassifier::default();
        let text = "Casino night at the office";

        assert_eq!(classifier.classify(text), classifier.classify(text));
    }

    #[test]
    fn test_empty_denylist_never_flags() {
        let classifier = SpamClassifier::from_phrases(Vec::<&str>::new());

        assert_eq!(classifier.phrase_count(), 0);
        assert!(!classifier.classify("viagra casino lottery"));
    }

    #[test]
    fn test_blank_phrases_ignored() {
        let classifier = SpamClassifier::from_phrases(["", "   ", "Crypto"]);

        assert_eq!(classifier.phrase_count(), 1);
        assert!(!classifier.classify("hello there"));
        assert!(classifier.classify("buy crypto"));
    }

    #[test]
    fn test_subject_is_checked() {
        let classifier = SpamClassifier::default();

        assert!(classifier.classify_submission("You are a WINNER", "see attached"));
        assert!(!classifier.classify_submission("Project inquiry", "Are you available?"));
    }
}
