use async_trait::async_trait;
use redlens_core::{ContentItem, Corpus, FetchParameters, RedditCredentials, RedditError};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

pub mod api;
pub mod session;

use crate::api::{AboutUserData, CommentData, RedditListing, RedditListingChild, SubmissionData};
use crate::session::{classify_status, RedditSession};

/// Reddit caps listing pages at 100 items.
const MAX_PAGE_SIZE: u32 = 100;

/// Source of a user's public history, flattened into a corpus.
#[async_trait]
pub trait UserHistoryProvider: Send + Sync {
    async fn fetch_user_history(
        &self,
        username: &str,
        params: &FetchParameters,
    ) -> Result<Corpus, RedditError>;
}

#[derive(Clone)]
pub struct RedditClient {
    credentials: RedditCredentials,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Self {
        Self { credentials }
    }

    /// Confirms the account exists and is accessible before any listing call.
    async fn resolve_user(
        &self,
        session: &RedditSession,
        username: &str,
    ) -> Result<AboutUserData, RedditError> {
        let endpoint = format!("/user/{}/about", username);
        let response = session.send_get(&endpoint, None).await?;

        if let Some(err) = classify_profile_status(&response, username, &endpoint) {
            return Err(err);
        }

        let about: RedditListingChild<AboutUserData> =
            response
                .json()
                .await
                .map_err(|e| RedditError::InvalidResponse {
                    details: format!("failed to parse profile for u/{}: {}", username, e),
                })?;

        screen_profile(about.data, username)
    }

    /// Walks a user listing with the `after` cursor until `limit` items are
    /// collected or the listing ends.
    async fn fetch_listing<T: DeserializeOwned>(
        &self,
        session: &RedditSession,
        endpoint: &str,
        limit: u32,
    ) -> Result<Vec<T>, RedditError> {
        let mut items: Vec<T> = Vec::new();
        let mut after: Option<String> = None;

        while (items.len() as u32) < limit {
            let remaining = limit - items.len() as u32;
            let page_size = remaining.min(MAX_PAGE_SIZE).to_string();
            let mut params = vec![
                ("limit", page_size.as_str()),
                ("sort", "new"),
                ("raw_json", "1"),
            ];
            if let Some(ref cursor) = after {
                params.push(("after", cursor.as_str()));
            }

            let listing: RedditListing<T> =
                session.get_json(endpoint, Some(params.as_slice())).await?;

            let page_len = listing.data.children.len();
            items.extend(listing.data.children.into_iter().map(|child| child.data));
            after = listing.data.after;

            if page_len == 0 || after.is_none() {
                break;
            }
        }

        items.truncate(limit as usize);
        Ok(items)
    }
}

#[async_trait]
impl UserHistoryProvider for RedditClient {
    async fn fetch_user_history(
        &self,
        username: &str,
        params: &FetchParameters,
    ) -> Result<Corpus, RedditError> {
        // The session lives for exactly one fetch and is released when this
        // function returns, on success and on every error path.
        let session = RedditSession::open(&self.credentials).await?;

        let about = self.resolve_user(&session, username).await?;
        debug!(
            "Resolved u/{} (link karma: {:?}, comment karma: {:?})",
            about.name, about.link_karma, about.comment_karma
        );

        let submitted_endpoint = format!("/user/{}/submitted", username);
        let submissions: Vec<SubmissionData> = self
            .fetch_listing(&session, &submitted_endpoint, params.post_limit)
            .await?;

        let comments_endpoint = format!("/user/{}/comments", username);
        let comments: Vec<CommentData> = self
            .fetch_listing(&session, &comments_endpoint, params.comment_limit)
            .await?;

        info!(
            "Fetched {} posts and {} comments for u/{}",
            submissions.len(),
            comments.len(),
            username
        );

        build_corpus(username, submissions, comments)
    }
}

/// Interprets the status of a profile lookup. On `/about`, 404 and 403 mean
/// the account itself is missing or blocked, so they take precedence over the
/// general status ladder.
fn classify_profile_status(
    response: &Response,
    username: &str,
    endpoint: &str,
) -> Option<RedditError> {
    match response.status().as_u16() {
        404 => Some(RedditError::UserUnavailable {
            username: username.to_string(),
            reason: "account does not exist".to_string(),
        }),
        403 => Some(RedditError::UserUnavailable {
            username: username.to_string(),
            reason: "account is suspended or inaccessible".to_string(),
        }),
        _ => classify_status(response, endpoint),
    }
}

/// A profile that resolves can still be suspended. Reddit reports that in the
/// body, not the status.
fn screen_profile(about: AboutUserData, username: &str) -> Result<AboutUserData, RedditError> {
    if about.is_suspended {
        return Err(RedditError::UserUnavailable {
            username: username.to_string(),
            reason: "account is suspended".to_string(),
        });
    }
    Ok(about)
}

/// Flattens submissions then comments, newest first within each group.
fn build_corpus(
    username: &str,
    submissions: Vec<SubmissionData>,
    comments: Vec<CommentData>,
) -> Result<Corpus, RedditError> {
    let mut items: Vec<ContentItem> = Vec::with_capacity(submissions.len() + comments.len());
    items.extend(submissions.into_iter().map(ContentItem::from));
    items.extend(comments.into_iter().map(ContentItem::from));

    Corpus::from_items(&items).ok_or_else(|| RedditError::EmptyHistory {
        username: username.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(title: &str, selftext: &str) -> SubmissionData {
        SubmissionData {
            id: "s1".to_string(),
            title: title.to_string(),
            selftext: selftext.to_string(),
            author: "tester".to_string(),
            subreddit: "rust".to_string(),
            url: "https://reddit.com/r/rust/comments/s1".to_string(),
            permalink: "/r/rust/comments/s1".to_string(),
            created_utc: 1700000000.0,
            score: 1,
            num_comments: 0,
            over_18: false,
            stickied: false,
            is_self: true,
        }
    }

    fn comment(body: &str) -> CommentData {
        CommentData {
            id: "c1".to_string(),
            body: body.to_string(),
            author: "tester".to_string(),
            subreddit: "rust".to_string(),
            link_id: "t3_s1".to_string(),
            permalink: "/r/rust/comments/s1/c1".to_string(),
            created_utc: 1700000100.0,
            score: 1,
        }
    }

    #[test]
    fn test_corpus_places_posts_before_comments() {
        let corpus = build_corpus(
            "tester",
            vec![submission("Hello", "World")],
            vec![comment("First!")],
        )
        .unwrap();
        assert_eq!(
            corpus.as_str(),
            "Post Title: Hello\n---\nPost Body: World\n---\nComment: First!"
        );
    }

    #[test]
    fn test_link_posts_contribute_one_line() {
        let corpus = build_corpus("tester", vec![submission("Just a link", "")], vec![]).unwrap();
        assert_eq!(corpus.as_str(), "Post Title: Just a link");
    }

    #[test]
    fn test_no_activity_is_empty_history() {
        let err = build_corpus("ghost", vec![], vec![]).unwrap_err();
        match err {
            RedditError::EmptyHistory { username } => assert_eq!(username, "ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_client_is_usable_as_provider_object() {
        let client = RedditClient::new(RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "redlens-test/0.1".to_string(),
        });
        let _provider: &dyn UserHistoryProvider = &client;
    }

    fn profile_response(status: u16) -> Response {
        let inner = http::Response::builder().status(status).body("").unwrap();
        Response::from(inner)
    }

    fn profile(name: &str, is_suspended: bool) -> AboutUserData {
        AboutUserData {
            name: name.to_string(),
            is_suspended,
            id: None,
            created_utc: None,
            link_karma: None,
            comment_karma: None,
        }
    }

    #[test]
    fn test_missing_account_is_unavailable() {
        let err = classify_profile_status(&profile_response(404), "ghost", "/user/ghost/about")
            .unwrap();
        match err {
            RedditError::UserUnavailable { username, reason } => {
                assert_eq!(username, "ghost");
                assert!(reason.contains("does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blocked_profile_is_unavailable_not_forbidden() {
        let err = classify_profile_status(&profile_response(403), "hidden", "/user/hidden/about")
            .unwrap();
        match err {
            RedditError::UserUnavailable { username, .. } => assert_eq!(username, "hidden"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_other_profile_statuses_use_general_ladder() {
        let err =
            classify_profile_status(&profile_response(503), "busy", "/user/busy/about").unwrap();
        assert!(matches!(err, RedditError::ServerError { status_code: 503 }));
        assert!(
            classify_profile_status(&profile_response(200), "busy", "/user/busy/about").is_none()
        );
    }

    #[test]
    fn test_suspended_profile_is_unavailable() {
        let err = screen_profile(profile("banned", true), "banned").unwrap_err();
        match err {
            RedditError::UserUnavailable { username, reason } => {
                assert_eq!(username, "banned");
                assert!(reason.contains("suspended"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_active_profile_passes_screening() {
        let about = screen_profile(profile("active", false), "active").unwrap();
        assert_eq!(about.name, "active");
    }
}
