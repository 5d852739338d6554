//! Transcript types consumed by the exporter
//!
//! Field names follow the JSON the MedChat backend returns for a message
//! (`searchResults`, `createdAt`, ...), so a fetched conversation can be fed
//! to the exporter unchanged.

use crate::constants::DEFAULT_USER_NAME;
use serde::{Deserialize, Serialize};

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One search result attached to an assistant answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// A single chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Opaque identifier, never interpreted
    #[serde(default)]
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Raw citation URLs. Carried for completeness; the rendered reference
    /// list comes from `search_results`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            role,
            content: content.into(),
            citations: None,
            search_results: None,
            created_at: None,
            model: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = Some(results);
        self
    }

    /// Search results to render, empty when absent
    pub fn references(&self) -> &[SearchResult] {
        self.search_results.as_deref().unwrap_or(&[])
    }
}

/// Everything needed for one export call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub conversation_title: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl ExportRequest {
    pub fn new(conversation_title: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            conversation_title: conversation_title.into(),
            messages,
            user_name: None,
        }
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Label for user turns; blank names fall back to the default
    pub fn user_label(&self) -> &str {
        match self.user_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_USER_NAME,
        }
    }
}

/// Accepted shapes of a transcript file
///
/// A bare message array, an export request, or the backend's conversation
/// payload (`{"title": ..., "messages": [...]}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Transcript {
    Request(ExportRequest),
    Conversation {
        #[serde(default)]
        title: String,
        messages: Vec<Message>,
    },
    Messages(Vec<Message>),
}

impl Transcript {
    /// Parse a transcript from JSON text
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the export request, letting explicit overrides win over file
    /// contents
    pub fn into_request(
        self,
        title_override: Option<String>,
        user_name_override: Option<String>,
    ) -> ExportRequest {
        let mut request = match self {
            Transcript::Request(request) => request,
            Transcript::Conversation { title, messages } => ExportRequest::new(title, messages),
            Transcript::Messages(messages) => ExportRequest::new(String::new(), messages),
        };
        if let Some(title) = title_override {
            request.conversation_title = title;
        }
        if let Some(user_name) = user_name_override {
            request.user_name = Some(user_name);
        }
        request
    }
}
