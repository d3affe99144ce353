use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Unique, store-generated identifier of a blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PostId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PostId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

/// Post author. Both name parts are always present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// `"{first_name} {last_name}"`, the form the API exposes.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The writable part of a post, used for inserts and full-replace updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    pub title: String,
    pub content: String,
    pub author: Author,
}

impl PostFields {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: Author) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author,
        }
    }

    /// Check that every required text field is non-blank.
    ///
    /// Content is free text and may be empty.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("`title` must not be empty".to_string());
        }
        if self.author.first_name.trim().is_empty() {
            errors.push("`author.firstName` must not be empty".to_string());
        }
        if self.author.last_name.trim().is_empty() {
            errors.push("`author.lastName` must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

/// BlogPost entity - the only persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub created: DateTime<Utc>,
}

impl BlogPost {
    /// Create a new post with a generated id and creation timestamp.
    ///
    /// `created` is kept at millisecond precision so it survives every store
    /// unchanged.
    pub fn new(fields: PostFields) -> Self {
        Self {
            id: PostId::new(),
            title: fields.title,
            content: fields.content,
            author: fields.author,
            created: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn author_name(&self) -> String {
        self.author.full_name()
    }

    /// Replace title, content and author. `id` and `created` stay as they are.
    pub fn replace(&mut self, fields: PostFields) {
        self.title = fields.title;
        self.content = fields.content;
        self.author = fields.author;
    }
}
