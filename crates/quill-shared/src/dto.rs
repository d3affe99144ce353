//! Data Transfer Objects - request/response types for the API.
//!
//! Incoming posts carry the author as an object `{firstName, lastName}`;
//! outgoing posts carry it as a single `"First Last"` string.

use serde::{Deserialize, Serialize};

/// Author as sent by clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Body of `POST /posts` and `PUT /posts/{id}`.
///
/// Every field is optional at the serde level so that missing fields can be
/// reported by name instead of as a generic decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRequest {
    /// Echoed id on update; ignored on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorPayload>,
}

impl PostRequest {
    /// Names of required fields absent from the body, in a stable order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.content.is_none() {
            missing.push("content");
        }
        match &self.author {
            None => missing.push("author"),
            Some(author) => {
                if author.first_name.is_none() {
                    missing.push("author.firstName");
                }
                if author.last_name.is_none() {
                    missing.push("author.lastName");
                }
            }
        }
        missing
    }
}

/// A blog post as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    /// `"{firstName} {lastName}"`.
    pub author: String,
    /// RFC 3339, UTC, millisecond precision.
    pub created: String,
}
