//! Sentiment classification of news text.
//!
//! The classifier is an external collaborator behind `SentimentClassifier`.
//! The default implementation scores words against a small financial
//! lexicon, flipping the sign after a negation and scaling after an
//! intensifier, and labels the mean score.

use crate::domain::Sentiment;
use std::collections::{HashMap, HashSet};

/// Classify free text into positive / negative / neutral.
pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Sentiment;
}

/// Mean scores strictly inside `(-NEUTRAL_BAND, NEUTRAL_BAND)` are neutral.
const NEUTRAL_BAND: f64 = 0.05;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("bullish", 0.8),
    ("surge", 0.7),
    ("surges", 0.7),
    ("surged", 0.7),
    ("rally", 0.7),
    ("rallies", 0.7),
    ("soar", 0.8),
    ("soars", 0.8),
    ("soared", 0.8),
    ("gain", 0.5),
    ("gains", 0.5),
    ("profit", 0.6),
    ("profits", 0.6),
    ("growth", 0.6),
    ("rise", 0.5),
    ("rises", 0.5),
    ("jump", 0.6),
    ("jumps", 0.6),
    ("increase", 0.5),
    ("improve", 0.5),
    ("improves", 0.5),
    ("outperform", 0.7),
    ("beat", 0.6),
    ("beats", 0.6),
    ("exceed", 0.6),
    ("exceeds", 0.6),
    ("strong", 0.5),
    ("positive", 0.5),
    ("optimistic", 0.6),
    ("confident", 0.5),
    ("record", 0.6),
    ("upgrade", 0.6),
    ("upgrades", 0.6),
    ("upgraded", 0.6),
    ("buy", 0.5),
    ("breakout", 0.6),
    ("recovery", 0.5),
    ("rebound", 0.5),
    ("rebounds", 0.5),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bearish", -0.8),
    ("crash", -0.9),
    ("crashes", -0.9),
    ("plunge", -0.8),
    ("plunges", -0.8),
    ("plunged", -0.8),
    ("drop", -0.6),
    ("drops", -0.6),
    ("fall", -0.5),
    ("falls", -0.5),
    ("decline", -0.6),
    ("declines", -0.6),
    ("loss", -0.6),
    ("losses", -0.6),
    ("decrease", -0.5),
    ("weak", -0.5),
    ("negative", -0.5),
    ("pessimistic", -0.6),
    ("concern", -0.5),
    ("concerns", -0.5),
    ("worry", -0.5),
    ("fear", -0.6),
    ("fears", -0.6),
    ("risk", -0.4),
    ("uncertainty", -0.5),
    ("miss", -0.6),
    ("misses", -0.6),
    ("disappoint", -0.7),
    ("disappoints", -0.7),
    ("underperform", -0.6),
    ("downgrade", -0.6),
    ("downgrades", -0.6),
    ("downgraded", -0.6),
    ("sell", -0.5),
    ("lawsuit", -0.6),
    ("probe", -0.5),
    ("crisis", -0.8),
    ("warning", -0.5),
    ("warns", -0.5),
    ("trouble", -0.6),
    ("fail", -0.7),
    ("fails", -0.7),
    ("fraud", -0.9),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "cannot", "cant", "dont", "doesnt", "didnt",
    "wont", "isnt", "arent", "wasnt", "werent", "hardly", "barely",
];

/// Tokens after a negation that can still be flipped by it.
const NEGATION_SCOPE: usize = 3;

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("highly", 1.5),
    ("significantly", 1.5),
    ("sharply", 1.5),
    ("dramatically", 1.8),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("marginally", 0.5),
];

/// Rule-based classifier over a financial word list.
pub struct LexiconClassifier {
    words: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            words: POSITIVE_WORDS.iter().chain(NEGATIVE_WORDS).copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    /// Mean score of matched words in `[-1, 1]`, 0.0 when nothing matched.
    ///
    /// A negation flips the next lexicon word found within
    /// [`NEGATION_SCOPE`] tokens, so "not a strong quarter" reads negative.
    pub fn score(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut negation_left = 0usize;
        let mut intensity = 1.0;

        for token in tokens(text) {
            if self.negations.contains(token.as_str()) {
                negation_left = NEGATION_SCOPE;
                continue;
            }
            if let Some(&mult) = self.intensifiers.get(token.as_str()) {
                intensity = mult;
                continue;
            }
            match self.words.get(token.as_str()) {
                Some(&score) => {
                    let signed = if negation_left > 0 { -score } else { score };
                    scores.push(signed * intensity);
                    negation_left = 0;
                    intensity = 1.0;
                }
                None => {
                    negation_left = negation_left.saturating_sub(1);
                    intensity = 1.0;
                }
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Sentiment {
        let score = self.score(text);
        if score > NEUTRAL_BAND {
            Sentiment::Positive
        } else if score < -NEUTRAL_BAND {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Lowercased words with punctuation and apostrophes removed.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
}
