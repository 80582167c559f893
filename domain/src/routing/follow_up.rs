//! Follow-up detection for sticky routing.
//!
//! When a domain agent produced the last answer, short referential questions
//! ("why?", "how many of those?") belong to it and should skip re-routing.
//! Which phrases count is a policy decision, so it is pluggable.

/// Referential cues used when no list is configured
pub const DEFAULT_FOLLOW_UP_CUES: &[&str] = &[
    "this",
    "that",
    "these",
    "those",
    "the previous one",
    "the last one",
    "why",
    "how many",
    "what about",
];

/// Decides whether a message refers back to the previous answer
pub trait FollowUpPolicy: Send + Sync {
    fn is_follow_up(&self, text: &str) -> bool;
}

/// Case-insensitive substring matching of cues.
///
/// A cue fires anywhere in the text, including inside longer words
/// ("that" in "thats"). Configure longer cues for stricter matching.
#[derive(Debug, Clone)]
pub struct KeywordFollowUp {
    cues: Vec<String>,
}

impl KeywordFollowUp {
    pub fn new<I, S>(cues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            cues: cues
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn cues(&self) -> &[String] {
        &self.cues
    }
}

impl Default for KeywordFollowUp {
    fn default() -> Self {
        Self::new(DEFAULT_FOLLOW_UP_CUES)
    }
}

impl FollowUpPolicy for KeywordFollowUp {
    fn is_follow_up(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.cues.iter().any(|cue| lowered.contains(cue.as_str()))
    }
}

/// Never treats a message as a follow-up (always re-route)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFollowUp;

impl FollowUpPolicy for NoFollowUp {
    fn is_follow_up(&self, _text: &str) -> bool {
        false
    }
}
