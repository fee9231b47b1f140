use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::error_utils::ErrorExt;

/// Separator inserted between flattened content lines when a corpus is built.
pub const CORPUS_SEPARATOR: &str = "\n---\n";

fn default_post_limit() -> u32 {
    10
}

fn default_comment_limit() -> u32 {
    100
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

/// How much of a user's history to pull from Reddit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FetchParameters {
    #[serde(default = "default_post_limit")]
    pub post_limit: u32,
    #[serde(default = "default_comment_limit")]
    pub comment_limit: u32,
}

impl Default for FetchParameters {
    fn default() -> Self {
        Self {
            post_limit: default_post_limit(),
            comment_limit: default_comment_limit(),
        }
    }
}

/// Knobs for the summarization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryParameters {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl Default for SummaryParameters {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            custom_prompt: None,
        }
    }
}

/// Combined per-request parameters as they appear on the wire.
///
/// Unknown fields are ignored so older clients can send extra keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    #[serde(flatten)]
    pub fetch: FetchParameters,
    #[serde(flatten)]
    pub summary: SummaryParameters,
}

impl AnalysisParameters {
    /// Range checks that serde cannot express. Violations map to HTTP 422.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fetch.post_limit == 0 {
            return Err(CoreError::InvalidInput {
                message: "post_limit must be greater than 0".to_string(),
            });
        }
        if self.fetch.comment_limit == 0 {
            return Err(CoreError::InvalidInput {
                message: "comment_limit must be greater than 0".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.summary.temperature) {
            return Err(CoreError::InvalidInput {
                message: "temperature must be between 0.0 and 2.0".to_string(),
            });
        }
        Ok(())
    }
}

/// One unit of a user's public history, normalized for corpus building.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Post {
        title: String,
        body: Option<String>,
    },
    Comment {
        body: String,
    },
}

impl ContentItem {
    /// Builds a post item. An empty selftext means a link or media post,
    /// which contributes no body line.
    pub fn post(title: String, selftext: String) -> Self {
        let body = if selftext.is_empty() {
            None
        } else {
            Some(selftext)
        };
        ContentItem::Post { title, body }
    }

    pub fn comment(body: String) -> Self {
        ContentItem::Comment { body }
    }

    fn write_lines(&self, out: &mut Vec<String>) {
        match self {
            ContentItem::Post { title, body } => {
                out.push(format!("Post Title: {}", title));
                if let Some(body) = body {
                    out.push(format!("Post Body: {}", body));
                }
            }
            ContentItem::Comment { body } => {
                out.push(format!("Comment: {}", body));
            }
        }
    }
}

/// The flattened text handed to the summarizer. Guaranteed non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus(String);

impl Corpus {
    /// Flattens items in order into separator-joined lines.
    /// Returns `None` when there is nothing to flatten.
    pub fn from_items(items: &[ContentItem]) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        let mut lines = Vec::new();
        for item in items {
            item.write_lines(&mut lines);
        }
        Some(Corpus(lines.join(CORPUS_SEPARATOR)))
    }

    /// Wraps already-flattened text. Returns `None` when the text is empty.
    pub fn from_text(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }
        Some(Corpus(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome envelope returned to callers. Exactly one of `summary` and
/// `error` is present, matching the `success` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub user_id: String,
    pub analyzed_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl AnalysisResult {
    pub fn success(user_id: String, analyzed_user: String, summary: String) -> Self {
        Self {
            success: true,
            user_id,
            analyzed_user,
            summary: Some(summary),
            error: None,
            error_code: None,
        }
    }

    pub fn failure(user_id: String, analyzed_user: String, error: &CoreError) -> Self {
        Self {
            success: false,
            user_id,
            analyzed_user,
            summary: None,
            error: Some(error.user_friendly_message()),
            error_code: Some(error.error_code()),
        }
    }
}
