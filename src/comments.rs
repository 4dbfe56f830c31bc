//! Comment-tree retrieval for a single post: expand every "load more"
//! placeholder, flatten the forest, extract one flat record per comment.

use crate::backoff::{call_with_backoff, RetryPolicy, Sleeper};
use crate::client::{CommentData, CommentNode, ForumClient};
use crate::error::{ClientError, FetchError};
use crate::util::DELETED_AUTHOR;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Flat comment record. `post_id` points at the post it was fetched for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    pub comment_id: String,
    pub comment_author: String,
    pub comment_upvotes: i64,
    pub comment_created_utc: f64,
    pub post_id: String,
}

impl RawComment {
    pub fn from_data(data: CommentData, post_id: &str) -> Self {
        Self {
            comment_id: data.id,
            comment_author: data.author.unwrap_or_else(|| DELETED_AUTHOR.to_string()),
            comment_upvotes: data.score,
            comment_created_utc: data.created_utc,
            post_id: post_id.to_string(),
        }
    }
}

/// Breadth-first flatten of a comment forest. `More` placeholders are handed to
/// `resolve` and whatever it returns is queued like any other level. A comment id
/// is emitted once; a placeholder only asks for ids not already seen. A server
/// may answer with a fresh placeholder for part of the ids, which is resolved in
/// turn; ids from a call that yielded no new comment are not asked for again.
/// Parent/child links are dropped.
pub fn flatten_tree<E>(
    roots: Vec<CommentNode>,
    mut resolve: impl FnMut(&[String]) -> Result<Vec<CommentNode>, E>,
) -> Result<Vec<CommentData>, E> {
    let mut out = Vec::new();
    let mut seen: AHashSet<String> = AHashSet::new();
    let mut stalled: AHashSet<String> = AHashSet::new();
    let mut queue: VecDeque<CommentNode> = VecDeque::new();

    enqueue(&mut queue, &mut seen, roots);
    while let Some(node) = queue.pop_front() {
        match node {
            CommentNode::Comment { data, replies } => {
                out.push(data);
                enqueue(&mut queue, &mut seen, replies);
            }
            CommentNode::More { children } => {
                let fresh: Vec<String> = children
                    .into_iter()
                    .filter(|id| !seen.contains(id) && !stalled.contains(id))
                    .collect();
                if fresh.is_empty() {
                    continue;
                }
                let resolved = resolve(&fresh)?;
                if enqueue(&mut queue, &mut seen, resolved) == 0 {
                    stalled.extend(fresh);
                }
            }
        }
    }
    Ok(out)
}

/// Queue `nodes`, dropping comments whose id was already seen. Returns how many
/// new comments were queued.
fn enqueue(queue: &mut VecDeque<CommentNode>, seen: &mut AHashSet<String>, nodes: Vec<CommentNode>) -> usize {
    let mut added = 0;
    for node in nodes {
        if let CommentNode::Comment { data, .. } = &node {
            if !seen.insert(data.id.clone()) {
                continue;
            }
            added += 1;
        }
        queue.push_back(node);
    }
    added
}

pub struct CommentTreeFetcher<C> {
    client: Arc<C>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<C: ForumClient> CommentTreeFetcher<C> {
    pub fn new(client: Arc<C>, retry: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { client, retry, sleeper }
    }

    fn expand(&self, post_id: &str) -> Result<Vec<RawComment>, ClientError> {
        let roots = self.client.comment_tree(post_id)?;
        let flat = flatten_tree(roots, |ids| self.client.more_children(post_id, ids))?;
        Ok(flat.into_iter().map(|d| RawComment::from_data(d, post_id)).collect())
    }

    /// Fetch every comment under `post_id`. A rate limit restarts the whole
    /// expansion after a backoff; any other failure is returned.
    pub fn try_fetch(&self, post_id: &str) -> Result<Vec<RawComment>, FetchError> {
        call_with_backoff(&self.retry, self.sleeper.as_ref(), || self.expand(post_id)).map_err(FetchError::from)
    }

    /// Like [`try_fetch`](Self::try_fetch) but a failure yields an empty list.
    pub fn fetch(&self, post_id: &str) -> Vec<RawComment> {
        match self.try_fetch(post_id) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("giving up on comments for {}: {}", post_id, e);
                Vec::new()
            }
        }
    }
}
