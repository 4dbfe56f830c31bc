//! The forum capability the fetch layer is written against.
//!
//! Implementations only move data; windowing, retry, expansion of "load more"
//! placeholders and attribute extraction all live in the fetchers.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// Subreddit-level metadata read once per run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubredditInfo {
    pub name: String,
    pub subscribers: u64,
}

/// A submission as listed by the remote, before extraction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    /// `None` when the account was deleted.
    pub author: Option<String>,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub num_comments: Option<i64>,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub gilded: i64,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
}

/// One comment as delivered by the remote.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub author: Option<String>,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
}

/// A node of a comment tree. `More` is a "load more comments" placeholder
/// that has to be resolved through [`ForumClient::more_children`].
#[derive(Clone, Debug)]
pub enum CommentNode {
    Comment {
        data: CommentData,
        replies: Vec<CommentNode>,
    },
    More {
        children: Vec<String>,
    },
}

impl CommentNode {
    pub fn leaf(data: CommentData) -> Self {
        CommentNode::Comment { data, replies: Vec::new() }
    }
}

/// Read-only access to a forum. Shared across worker threads.
pub trait ForumClient: Send + Sync {
    /// Fails with [`ClientError::NotFound`] when the subreddit does not exist.
    fn subreddit(&self, name: &str) -> Result<SubredditInfo, ClientError>;

    /// Up to `limit` submissions, expected newest first.
    fn new_submissions(&self, subreddit: &str, limit: usize) -> Result<Vec<Submission>, ClientError>;

    /// Account creation time of `author`; `Ok(None)` if the remote does not expose it.
    fn author_created_utc(&self, author: &str) -> Result<Option<f64>, ClientError>;

    /// Top level of the comment forest under `post_id`.
    fn comment_tree(&self, post_id: &str) -> Result<Vec<CommentNode>, ClientError>;

    /// Resolve the ids held by a `More` placeholder. The result may itself contain placeholders.
    fn more_children(&self, post_id: &str, children: &[String]) -> Result<Vec<CommentNode>, ClientError>;
}

impl<T: ForumClient + ?Sized> ForumClient for std::sync::Arc<T> {
    fn subreddit(&self, name: &str) -> Result<SubredditInfo, ClientError> {
        (**self).subreddit(name)
    }
    fn new_submissions(&self, subreddit: &str, limit: usize) -> Result<Vec<Submission>, ClientError> {
        (**self).new_submissions(subreddit, limit)
    }
    fn author_created_utc(&self, author: &str) -> Result<Option<f64>, ClientError> {
        (**self).author_created_utc(author)
    }
    fn comment_tree(&self, post_id: &str) -> Result<Vec<CommentNode>, ClientError> {
        (**self).comment_tree(post_id)
    }
    fn more_children(&self, post_id: &str, children: &[String]) -> Result<Vec<CommentNode>, ClientError> {
        (**self).more_children(post_id, children)
    }
}
