use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single journal record.
///
/// Missing fields decode to their defaults so that an incomplete payload
/// reaches [`Entry::validate`] instead of failing as malformed JSON.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Entry {
    pub time: DateTime<Utc>,
    pub user: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("empty user")]
    EmptyUser,
    #[error("empty content")]
    EmptyContent,
}

impl Entry {
    pub fn new(user: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            user: user.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user.is_empty() {
            return Err(ValidationError::EmptyUser);
        }
        if self.content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Query string of `GET /query`. Both bounds are `YYYY-MM-DD` dates.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}
