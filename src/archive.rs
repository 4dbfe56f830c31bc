//! [`ForumClient`] served from Pushshift-style dumps on disk.
//!
//! Layout under the base directory:
//!
//! ```text
//! submissions/*.zst | *.jsonl
//! comments/*.zst    | *.jsonl
//! ```
//!
//! Submissions are indexed when the client is opened. Comment files are only
//! read the first time a comment tree is requested. With a `more_page_size`
//! set, every reply list longer than the page is cut and the rest handed out as
//! a "load more" placeholder, the way the live API pages large threads. Reply
//! chains deeper than `MAX_INLINE_DEPTH` levels are always cut into placeholders.

use crate::client::{CommentData, CommentNode, ForumClient, Submission, SubredditInfo};
use crate::error::ClientError;
use crate::paths::{discover, FileKind};
use crate::util::DELETED_AUTHOR;
use crate::zstd_jsonl::{for_each_record, CommentLine, SubmissionLine};
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reply levels inlined per tree or "load more" answer.
const MAX_INLINE_DEPTH: usize = 32;

fn author_of(raw: Option<String>) -> Option<String> {
    raw.filter(|a| !a.is_empty() && a != DELETED_AUTHOR)
}

struct SubredditPosts {
    name: String,
    subscribers: u64,
    /// Newest first.
    posts: Vec<Submission>,
}

#[derive(Default)]
struct CommentIndex {
    by_id: AHashMap<String, CommentData>,
    /// Parent fullname (`t3_..` / `t1_..`) -> child ids, oldest first.
    children: AHashMap<String, Vec<String>>,
}

impl CommentIndex {
    fn load(base: &Path) -> Result<Self> {
        let files = discover(base, FileKind::Comment);
        let mut idx = CommentIndex::default();
        let mut seen_at: AHashMap<String, f64> = AHashMap::new();
        for path in &files {
            for_each_record::<CommentLine>(path, |c| {
                if idx.by_id.contains_key(&c.id) {
                    return;
                }
                seen_at.insert(c.id.clone(), c.created_utc);
                idx.children.entry(c.parent_id).or_default().push(c.id.clone());
                idx.by_id.insert(
                    c.id.clone(),
                    CommentData {
                        id: c.id,
                        author: author_of(c.author),
                        score: c.score,
                        created_utc: c.created_utc,
                    },
                );
            })
            .with_context(|| format!("reading {}", path.display()))?;
        }
        for kids in idx.children.values_mut() {
            kids.sort_by(|a, b| {
                let ta = seen_at.get(a).copied().unwrap_or(0.0);
                let tb = seen_at.get(b).copied().unwrap_or(0.0);
                ta.total_cmp(&tb)
            });
        }
        tracing::info!("Indexed {} comment(s) from {} file(s).", idx.by_id.len(), files.len());
        Ok(idx)
    }
}

pub struct ArchiveClient {
    base: PathBuf,
    subreddits: AHashMap<String, SubredditPosts>,
    post_ids: AHashSet<String>,
    author_created: AHashMap<String, f64>,
    comments: Mutex<Option<Arc<CommentIndex>>>,
    more_page_size: Option<usize>,
}

impl ArchiveClient {
    /// Index every submission under `base/submissions`.
    pub fn open(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let files = discover(&base, FileKind::Submission);
        if files.is_empty() {
            tracing::warn!("No submission dumps found under {}.", base.display());
        } else {
            tracing::info!("Planned {} submission file(s).", files.len());
        }

        let mut subreddits: AHashMap<String, SubredditPosts> = AHashMap::new();
        let mut post_ids = AHashSet::new();
        let mut author_created = AHashMap::new();
        // Subscriber counts are taken from the newest submission carrying one.
        let mut subscribers_at: AHashMap<String, f64> = AHashMap::new();
        for path in &files {
            for_each_record::<SubmissionLine>(path, |s| {
                let Some(sub) = s.subreddit.clone() else { return };
                if !post_ids.insert(s.id.clone()) {
                    return;
                }
                let key = sub.to_lowercase();
                let entry = subreddits.entry(key.clone()).or_insert_with(|| SubredditPosts {
                    name: sub,
                    subscribers: 0,
                    posts: Vec::new(),
                });
                if let Some(n) = s.subreddit_subscribers {
                    if subscribers_at.get(&key).map_or(true, |&t| s.created_utc >= t) {
                        subscribers_at.insert(key, s.created_utc);
                        entry.subscribers = n;
                    }
                }
                let author = author_of(s.author);
                if let (Some(a), Some(ts)) = (&author, s.author_created_utc) {
                    author_created.insert(a.clone(), ts);
                }
                entry.posts.push(Submission {
                    id: s.id,
                    author,
                    title: s.title,
                    selftext: s.selftext.unwrap_or_default(),
                    url: s.url.unwrap_or_default(),
                    is_self: s.is_self,
                    num_comments: s.num_comments,
                    over_18: s.over_18,
                    spoiler: s.spoiler,
                    locked: s.locked,
                    gilded: s.gilded.unwrap_or(0),
                    score: s.score,
                    created_utc: s.created_utc,
                });
            })
            .with_context(|| format!("reading {}", path.display()))?;
        }
        for sub in subreddits.values_mut() {
            sub.posts.sort_by(|a, b| b.created_utc.total_cmp(&a.created_utc));
        }

        Ok(Self {
            base,
            subreddits,
            post_ids,
            author_created,
            comments: Mutex::new(None),
            more_page_size: None,
        })
    }

    /// Cut reply lists after `n` entries and serve the rest as placeholders.
    pub fn with_more_page_size(mut self, n: usize) -> Self {
        self.more_page_size = Some(n.max(1));
        self
    }

    fn comment_index(&self) -> Result<Arc<CommentIndex>, ClientError> {
        let mut slot = self.comments.lock();
        if let Some(idx) = slot.as_ref() {
            return Ok(Arc::clone(idx));
        }
        let idx = Arc::new(CommentIndex::load(&self.base)?);
        *slot = Some(Arc::clone(&idx));
        Ok(idx)
    }

    /// Nodes for `ids`. Replies nest at most [`MAX_INLINE_DEPTH`] levels below
    /// `ids`; deeper reply lists come back as placeholders for the caller to
    /// resolve through `more_children`.
    fn build_nodes(&self, idx: &CommentIndex, ids: &[String], depth: usize) -> Vec<CommentNode> {
        let page = self.more_page_size.unwrap_or(usize::MAX);
        let (now, later) = ids.split_at(page.min(ids.len()));
        let mut nodes: Vec<CommentNode> = now
            .iter()
            .filter_map(|id| idx.by_id.get(id))
            .map(|data| {
                let replies = match idx.children.get(&format!("t1_{}", data.id)) {
                    None => Vec::new(),
                    Some(kids) if depth + 1 >= MAX_INLINE_DEPTH => vec![CommentNode::More { children: kids.clone() }],
                    Some(kids) => self.build_nodes(idx, kids, depth + 1),
                };
                CommentNode::Comment { data: data.clone(), replies }
            })
            .collect();
        if !later.is_empty() {
            nodes.push(CommentNode::More { children: later.to_vec() });
        }
        nodes
    }
}

impl ForumClient for ArchiveClient {
    fn subreddit(&self, name: &str) -> Result<SubredditInfo, ClientError> {
        self.subreddits
            .get(&name.to_lowercase())
            .map(|s| SubredditInfo { name: s.name.clone(), subscribers: s.subscribers })
            .ok_or_else(|| ClientError::NotFound(name.to_string()))
    }

    fn new_submissions(&self, subreddit: &str, limit: usize) -> Result<Vec<Submission>, ClientError> {
        let sub = self
            .subreddits
            .get(&subreddit.to_lowercase())
            .ok_or_else(|| ClientError::NotFound(subreddit.to_string()))?;
        Ok(sub.posts.iter().take(limit).cloned().collect())
    }

    fn author_created_utc(&self, author: &str) -> Result<Option<f64>, ClientError> {
        Ok(self.author_created.get(author).copied())
    }

    fn comment_tree(&self, post_id: &str) -> Result<Vec<CommentNode>, ClientError> {
        if !self.post_ids.contains(post_id) {
            return Err(ClientError::NotFound(post_id.to_string()));
        }
        let idx = self.comment_index()?;
        Ok(idx
            .children
            .get(&format!("t3_{post_id}"))
            .map(|roots| self.build_nodes(&idx, roots, 0))
            .unwrap_or_default())
    }

    fn more_children(&self, _post_id: &str, children: &[String]) -> Result<Vec<CommentNode>, ClientError> {
        let idx = self.comment_index()?;
        Ok(self.build_nodes(&idx, children, 0))
    }
}
