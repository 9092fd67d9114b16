//! Query input types and validation
//!
//! A `Query` is immutable once the workflow starts. Invalid input is a
//! fatal failure rejected here, before any retrieval happens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_COLLECTION_ID_LENGTH: usize = 64;

/// Maximum number of prior turns rendered into a generation prompt
pub const MAX_HISTORY_TURNS: usize = 6;

/// Validation errors for query construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryValidationError {
    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Collection id must not be empty")]
    EmptyCollectionId,

    #[error("Collection id must be at most {MAX_COLLECTION_ID_LENGTH} characters")]
    CollectionIdTooLong,

    #[error("Collection id may only contain alphanumerics, '-' and '_'")]
    InvalidCollectionIdCharacters,
}

/// Identifier of the document collection a query targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Result<Self, QueryValidationError> {
        let id = id.into();

        if id.is_empty() {
            return Err(QueryValidationError::EmptyCollectionId);
        }

        if id.len() > MAX_COLLECTION_ID_LENGTH {
            return Err(QueryValidationError::CollectionIdTooLong);
        }

        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(QueryValidationError::InvalidCollectionIdCharacters);
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CollectionId {
    type Error = QueryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CollectionId> for String {
    fn from(id: CollectionId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One prior exchange in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
}

impl ChatTurn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

/// A validated question against a collection, with conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    question: String,
    history: Vec<ChatTurn>,
    collection: CollectionId,
}

impl Query {
    /// Create a query, rejecting blank questions
    pub fn new(
        question: impl Into<String>,
        collection: CollectionId,
    ) -> Result<Self, QueryValidationError> {
        let question = question.into();

        if question.trim().is_empty() {
            return Err(QueryValidationError::EmptyQuestion);
        }

        Ok(Self {
            question,
            history: Vec::new(),
            collection,
        })
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// The most recent turns, capped for prompt rendering
    pub fn recent_history(&self) -> &[ChatTurn] {
        let start = self.history.len().saturating_sub(MAX_HISTORY_TURNS);
        &self.history[start..]
    }
}
