use redlens_core::ContentItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

/// A `t3` thing from a user's submitted listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionData {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u32,
    pub over_18: bool,
    pub stickied: bool,
    pub is_self: bool,
}

/// A `t1` thing from a user's comment listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub body: String,
    pub author: String,
    pub subreddit: String,
    pub link_id: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
}

/// A `t2` thing from `/user/{name}/about`.
///
/// Suspended profiles omit almost every field, so only `name` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutUserData {
    pub name: String,
    #[serde(default)]
    pub is_suspended: bool,
    pub id: Option<String>,
    pub created_utc: Option<f64>,
    pub link_karma: Option<i64>,
    pub comment_karma: Option<i64>,
}

/// Response from the application-only token grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
}

impl From<SubmissionData> for ContentItem {
    fn from(submission: SubmissionData) -> Self {
        ContentItem::post(submission.title, submission.selftext)
    }
}

impl From<CommentData> for ContentItem {
    fn from(comment: CommentData) -> Self {
        ContentItem::comment(comment.body)
    }
}
