#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use threadinsight::{
    ClientError, CommentData, CommentNode, ForumClient, RawComment, RawPost, Sleeper, Submission,
    SubredditInfo, PostType,
};

/// Reference clock for every fixture: 2023-11-14 22:13:20 UTC.
pub const NOW: f64 = 1_700_000_000.0;
pub const DAY: f64 = 86_400.0;

// ----------------------------- Sleeper -----------------------------

/// Records every requested pause instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().clone()
    }
    pub fn count_of(&self, d: Duration) -> usize {
        self.pauses.lock().iter().filter(|&&p| p == d).count()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, dur: Duration) {
        self.pauses.lock().push(dur);
    }
}

// ----------------------------- Mock client -----------------------------

/// How the mock answers an account-age lookup.
#[derive(Clone, Debug)]
pub enum AuthorAge {
    Created(f64),
    Hidden,
    Fails,
}

/// Scripted in-memory forum.
#[derive(Default)]
pub struct MockClient {
    pub subreddits: HashMap<String, u64>,
    pub listing: Vec<Submission>,
    pub authors: HashMap<String, AuthorAge>,
    pub trees: HashMap<String, Vec<CommentNode>>,
    /// `more_children` answers, keyed by the first requested id.
    pub more: HashMap<String, Vec<CommentNode>>,
    /// Posts whose comment fetch fails with a non-throttle error.
    pub broken_posts: HashSet<String>,
    /// Remaining throttle failures per post before `comment_tree` succeeds.
    pub throttled_posts: Mutex<HashMap<String, u32>>,
    /// Remaining throttle failures before `new_submissions` succeeds.
    pub throttled_listing: Mutex<u32>,
    pub tree_calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn with_subreddit(mut self, name: &str, subscribers: u64) -> Self {
        self.subreddits.insert(name.to_string(), subscribers);
        self
    }
    pub fn with_listing(mut self, listing: Vec<Submission>) -> Self {
        self.listing = listing;
        self
    }
    pub fn with_author(mut self, name: &str, age: AuthorAge) -> Self {
        self.authors.insert(name.to_string(), age);
        self
    }
    pub fn with_tree(mut self, post_id: &str, roots: Vec<CommentNode>) -> Self {
        self.trees.insert(post_id.to_string(), roots);
        self
    }
    pub fn with_more(mut self, first_id: &str, nodes: Vec<CommentNode>) -> Self {
        self.more.insert(first_id.to_string(), nodes);
        self
    }
    pub fn broken(mut self, post_id: &str) -> Self {
        self.broken_posts.insert(post_id.to_string());
        self
    }
    pub fn throttled(self, post_id: &str, times: u32) -> Self {
        self.throttled_posts.lock().insert(post_id.to_string(), times);
        self
    }
}

impl ForumClient for MockClient {
    fn subreddit(&self, name: &str) -> Result<SubredditInfo, ClientError> {
        self.subreddits
            .get(name)
            .map(|&subscribers| SubredditInfo { name: name.to_string(), subscribers })
            .ok_or_else(|| ClientError::NotFound(name.to_string()))
    }

    fn new_submissions(&self, _subreddit: &str, limit: usize) -> Result<Vec<Submission>, ClientError> {
        let mut left = self.throttled_listing.lock();
        if *left > 0 {
            *left -= 1;
            return Err(ClientError::RateLimited("listing".into()));
        }
        Ok(self.listing.iter().take(limit).cloned().collect())
    }

    fn author_created_utc(&self, author: &str) -> Result<Option<f64>, ClientError> {
        match self.authors.get(author) {
            Some(AuthorAge::Created(ts)) => Ok(Some(*ts)),
            Some(AuthorAge::Hidden) | None => Ok(None),
            Some(AuthorAge::Fails) => Err(ClientError::Unavailable(format!("{author} is suspended"))),
        }
    }

    fn comment_tree(&self, post_id: &str) -> Result<Vec<CommentNode>, ClientError> {
        self.tree_calls.lock().push(post_id.to_string());
        if self.broken_posts.contains(post_id) {
            return Err(ClientError::Other(anyhow::anyhow!("HTTP 500 for {post_id}")));
        }
        if let Some(left) = self.throttled_posts.lock().get_mut(post_id) {
            if *left > 0 {
                *left -= 1;
                return Err(ClientError::RateLimited(post_id.to_string()));
            }
        }
        Ok(self.trees.get(post_id).cloned().unwrap_or_default())
    }

    fn more_children(&self, _post_id: &str, children: &[String]) -> Result<Vec<CommentNode>, ClientError> {
        Ok(children.first().and_then(|id| self.more.get(id)).cloned().unwrap_or_default())
    }
}

// ----------------------------- Builders -----------------------------

pub fn submission(id: &str, author: Option<&str>, created_utc: f64) -> Submission {
    Submission {
        id: id.to_string(),
        author: author.map(str::to_string),
        title: format!("post {id}"),
        created_utc,
        num_comments: Some(0),
        ..Default::default()
    }
}

pub fn comment_data(id: &str, author: Option<&str>, score: i64, created_utc: f64) -> CommentData {
    CommentData { id: id.to_string(), author: author.map(str::to_string), score, created_utc }
}

pub fn leaf(id: &str, author: &str, score: i64) -> CommentNode {
    CommentNode::leaf(comment_data(id, Some(author), score, NOW - 60.0))
}

pub fn raw_post(id: &str, author: &str, created_utc: f64) -> RawPost {
    RawPost {
        id: id.to_string(),
        author: author.to_string(),
        title: String::new(),
        selftext: String::new(),
        is_self: true,
        num_comments: Some(0),
        over_18: false,
        spoiler: false,
        locked: false,
        gilded: 0,
        upvotes: 0,
        created_utc,
        post_type: PostType::Text,
        account_age_days: None,
    }
}

pub fn raw_comment(id: &str, author: &str, upvotes: i64, created_utc: f64, post_id: &str) -> RawComment {
    RawComment {
        comment_id: id.to_string(),
        comment_author: author.to_string(),
        comment_upvotes: upvotes,
        comment_created_utc: created_utc,
        post_id: post_id.to_string(),
    }
}

// ----------------------------- Archive fixtures -----------------------------

/// Write a compressed `.zst` file containing the provided JSONL lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Write a plain JSONL file.
pub fn write_jsonl_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Build a tiny dump of r/rust as seen at [`NOW`]:
/// - s1 by "bob" (1 hour old, image link, account 10 days old, 900 subscribers)
/// - s2 by "alice" (2 days old, self post with an http link, account 400 days old)
/// - s3 by "[deleted]" (4 days old, outside a 3-day window)
/// - s4 in r/golang (must never show up for r/rust)
///
/// Comments (plain JSONL, to check both formats are read):
///   c1 alice -> s1, c2 carol -> c1, c3 dave -> c2, c4 AutoModerator -> s1,
///   c5 [deleted] -> s2, c9 alice -> s3 (post outside the window)
pub fn make_archive_basic() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();

    let rs = vec![
        json!({
            "id":"s1", "subreddit":"rust", "author":"bob", "author_created_utc": NOW - 10.0 * DAY,
            "title":"Rust borrow checker meme", "selftext":"", "url":"https://i.redd.it/abc.png",
            "is_self":false, "num_comments":3, "over_18":false, "spoiler":false, "locked":false,
            "gilded":0, "score":120, "created_utc": NOW - 3600.0, "subreddit_subscribers": 900
        }).to_string(),
        json!({
            "id":"s2", "subreddit":"Rust", "author":"alice", "author_created_utc": NOW - 400.0 * DAY,
            "title":"Async rust question", "selftext":"Docs at https://docs.rs say otherwise",
            "url":"https://www.reddit.com/r/rust/comments/s2", "is_self":true, "num_comments":1,
            "over_18":false, "spoiler":true, "locked":false, "gilded":1, "score":40,
            "created_utc": NOW - 2.0 * DAY, "subreddit_subscribers": 850
        }).to_string(),
        json!({
            "id":"s3", "subreddit":"rust", "author":"[deleted]", "title":"old news", "selftext":"",
            "url":"", "is_self":true, "num_comments":1, "score":5, "created_utc": NOW - 4.0 * DAY
        }).to_string(),
        json!({
            "id":"s4", "subreddit":"golang", "author":"gopher", "title":"Go generics",
            "selftext":"", "url":"", "is_self":true, "num_comments":0, "score":7,
            "created_utc": NOW - 600.0, "subreddit_subscribers": 300
        }).to_string(),
    ];
    write_zst_lines(&base.join("submissions").join("RS_2023-11.zst"), &rs);

    let rc = vec![
        json!({"id":"c1", "author":"alice", "link_id":"t3_s1", "parent_id":"t3_s1", "score":15, "created_utc": NOW - 3000.0}).to_string(),
        json!({"id":"c2", "author":"carol", "link_id":"t3_s1", "parent_id":"t1_c1", "score":8, "created_utc": NOW - 2900.0}).to_string(),
        json!({"id":"c3", "author":"dave", "link_id":"t3_s1", "parent_id":"t1_c2", "score":-2, "created_utc": NOW - 2800.0}).to_string(),
        json!({"id":"c4", "author":"AutoModerator", "link_id":"t3_s1", "parent_id":"t3_s1", "score":99, "created_utc": NOW - 3500.0}).to_string(),
        json!({"id":"c5", "author":"[deleted]", "link_id":"t3_s2", "parent_id":"t3_s2", "score":1, "created_utc": NOW - DAY}).to_string(),
        json!({"id":"c9", "author":"alice", "link_id":"t3_s3", "parent_id":"t3_s3", "score":3, "created_utc": NOW - 3.5 * DAY}).to_string(),
    ];
    write_jsonl_lines(&base.join("comments").join("RC_2023-11.jsonl"), &rc);

    base
}
