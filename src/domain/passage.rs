//! Evidence passages and relevance scores
//!
//! Passages are never mutated after creation; grading wraps them in a
//! `GradedPassage` whose score variant always matches the passage origin.

use serde::{Deserialize, Serialize};

/// Where a passage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassageOrigin {
    /// Retrieved from the local evidence store
    Local,
    /// Returned by the web search fallback
    Web,
}

/// A retrieved unit of evidence text with provenance metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text
    pub content: String,
    /// Source identifier (document id, or title + URL for web results)
    pub source: String,
    /// Origin tag
    pub origin: PassageOrigin,
}

impl Passage {
    pub fn local(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            origin: PassageOrigin::Local,
        }
    }

    pub fn web(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            origin: PassageOrigin::Web,
        }
    }
}

/// Relevance score on the scale matching the passage origin
///
/// Local passages are graded on 0-10 by the relevance grader. Web passages
/// carry the provider-assigned score on 0-1 and are never re-graded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scale", content = "value", rename_all = "snake_case")]
pub enum RelevanceScore {
    Local(f32),
    Web(f32),
}

impl RelevanceScore {
    /// Create a local-scale score, clamped to 0-10
    pub fn local(score: f32) -> Self {
        Self::Local(score.clamp(0.0, 10.0))
    }

    /// Create a web-scale score, clamped to 0-1
    pub fn web(score: f32) -> Self {
        Self::Web(score.clamp(0.0, 1.0))
    }

    /// The lowest possible local score, used as the fallback when grading
    /// a single passage fails
    pub fn local_minimum() -> Self {
        Self::Local(0.0)
    }

    pub fn value(&self) -> f32 {
        match self {
            Self::Local(v) | Self::Web(v) => *v,
        }
    }

    pub fn is_web(&self) -> bool {
        matches!(self, Self::Web(_))
    }

    /// Whether this score clears the local-scale relevance threshold.
    /// Web scores are provider-vetted and always pass.
    pub fn meets_local_threshold(&self, threshold: f32) -> bool {
        match self {
            Self::Local(v) => *v >= threshold,
            Self::Web(_) => true,
        }
    }
}

/// A passage with its relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedPassage {
    pub passage: Passage,
    pub score: RelevanceScore,
    /// Explanation for the score, when the grader supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GradedPassage {
    /// Wrap a local passage with its 0-10 grade
    pub fn local(passage: Passage, score: f32) -> Self {
        debug_assert_eq!(passage.origin, PassageOrigin::Local);
        Self {
            passage,
            score: RelevanceScore::local(score),
            reason: None,
        }
    }

    /// Wrap a web passage with the provider-assigned 0-1 score
    pub fn web(passage: Passage, score: f32) -> Self {
        debug_assert_eq!(passage.origin, PassageOrigin::Web);
        Self {
            passage,
            score: RelevanceScore::web(score),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn origin(&self) -> PassageOrigin {
        self.passage.origin
    }
}
