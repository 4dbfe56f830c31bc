//! Windowed post listing and per-post attribute extraction.

use crate::backoff::{call_with_backoff, Sleeper};
use crate::client::{ForumClient, Submission};
use crate::concurrency::{run_paced_pool, Pacing, UnitError};
use crate::config::FetchOptions;
use crate::date::whole_days_between;
use crate::error::{ClientError, FetchError, RetryError};
use crate::progress::count_progress_if;
use crate::util::DELETED_AUTHOR;
use indicatif::MultiProgress;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

const IMAGE_SUFFIXES: [&str; 4] = [".jpg", ".png", ".gif", ".jpeg"];
const VIDEO_HOST: &str = "v.redd.it";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PostType {
    Text,
    Image,
    Video,
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostType::Text => "Text",
            PostType::Image => "Image",
            PostType::Video => "Video",
        };
        f.write_str(s)
    }
}

/// URL-shape classifier: exact (case-sensitive) image suffix, then video host substring.
pub fn classify_post_type(url: &str) -> PostType {
    if IMAGE_SUFFIXES.iter().any(|ext| url.ends_with(ext)) {
        PostType::Image
    } else if url.contains(VIDEO_HOST) {
        PostType::Video
    } else {
        PostType::Text
    }
}

/// Extracted post attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub author: String,
    pub title: String,
    pub selftext: String,
    pub is_self: bool,
    pub num_comments: Option<i64>,
    pub over_18: bool,
    pub spoiler: bool,
    pub locked: bool,
    pub gilded: i64,
    pub upvotes: i64,
    pub created_utc: f64,
    pub post_type: PostType,
    /// `None` when the author is deleted or their creation time is unreadable.
    pub account_age_days: Option<i64>,
}

/// Age in whole days of `author`'s account at `now`.
///
/// `Ok(None)`: no author, or the remote does not expose a creation time.
/// `Err`: the lookup itself failed.
pub fn account_age_days<C: ForumClient + ?Sized>(
    client: &C,
    author: Option<&str>,
    now: f64,
) -> Result<Option<i64>, ClientError> {
    let Some(name) = author else { return Ok(None) };
    Ok(client
        .author_created_utc(name)?
        .filter(|ts| ts.is_finite())
        .map(|created| whole_days_between(now, created)))
}

/// Build a [`RawPost`]. Account-age failures of any kind become `None`.
pub fn extract_post<C: ForumClient + ?Sized>(client: &C, s: Submission, now: f64) -> RawPost {
    let account_age_days = match account_age_days(client, s.author.as_deref(), now) {
        Ok(age) => age,
        Err(e) => {
            tracing::debug!("account age unavailable for post {}: {}", s.id, e);
            None
        }
    };
    RawPost {
        post_type: classify_post_type(&s.url),
        author: s.author.unwrap_or_else(|| DELETED_AUTHOR.to_string()),
        id: s.id,
        title: s.title,
        selftext: s.selftext,
        is_self: s.is_self,
        num_comments: s.num_comments,
        over_18: s.over_18,
        spoiler: s.spoiler,
        locked: s.locked,
        gilded: s.gilded,
        upvotes: s.score,
        created_utc: s.created_utc,
        account_age_days,
    }
}

/// Keep the newest-first prefix strictly inside the window, capped at `max`, then
/// re-sort newest first.
pub fn window_submissions(listing: Vec<Submission>, cutoff: f64, max: usize) -> Vec<Submission> {
    let mut kept: Vec<Submission> = listing
        .into_iter()
        .take(max)
        .take_while(|s| s.created_utc >= cutoff)
        .collect();
    kept.sort_by(|a, b| b.created_utc.total_cmp(&a.created_utc));
    kept
}

pub struct PostWindowFetcher<C> {
    client: Arc<C>,
    opts: FetchOptions,
    sleeper: Arc<dyn Sleeper>,
    progress_group: Option<MultiProgress>,
}

impl<C: ForumClient + 'static> PostWindowFetcher<C> {
    pub fn new(client: Arc<C>, opts: FetchOptions, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { client, opts, sleeper, progress_group: None }
    }

    /// Draw the extraction bar inside `group`.
    pub fn progress_group(mut self, group: MultiProgress) -> Self {
        self.progress_group = Some(group);
        self
    }

    /// Posts of `subreddit` created within the window, plus its subscriber count.
    /// The returned posts are in completion order.
    pub fn fetch(&self, subreddit: &str) -> Result<(Vec<RawPost>, u64), FetchError> {
        let info = match call_with_backoff(&self.opts.post_retry, self.sleeper.as_ref(), || {
            self.client.subreddit(subreddit)
        }) {
            Ok(info) => info,
            Err(RetryError::Failed(ClientError::NotFound(_))) => {
                return Err(FetchError::NotFound(subreddit.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let subscribers = info.subscribers;
        self.sleeper.sleep(self.opts.subscriber_pause);

        let now = self.opts.now_epoch();
        let cutoff = now - self.opts.window.as_secs_f64();
        let listing = call_with_backoff(&self.opts.post_retry, self.sleeper.as_ref(), || {
            self.client.new_submissions(subreddit, self.opts.max_posts)
        })?;
        let listed = listing.len();
        let in_window = window_submissions(listing, cutoff, self.opts.max_posts);
        tracing::info!(
            "r/{}: {} listed, {} within window (cutoff {:.0})",
            subreddit, listed, in_window.len(), cutoff
        );

        let pb = count_progress_if(
            self.opts.progress,
            self.progress_group.as_ref(),
            in_window.len() as u64,
            self.opts.progress_label.as_deref().unwrap_or("Extracting posts"),
        );
        let client = Arc::clone(&self.client);
        let completions = run_paced_pool(
            "posts",
            in_window,
            self.opts.post_workers,
            Pacing { every: self.opts.post_pause_every, pause: self.opts.post_pause },
            self.sleeper.as_ref(),
            move |s: Submission| Ok::<_, Infallible>(extract_post(client.as_ref(), s, now)),
            |_| if let Some(pb) = &pb { pb.inc(1); },
        )?;
        if let Some(pb) = pb { pb.finish_with_message("Posts extracted"); }

        let mut posts = Vec::with_capacity(completions.len());
        for c in completions {
            match c.result {
                Ok(p) => posts.push(p),
                Err(UnitError::Panicked(msg)) => tracing::warn!("post extraction panicked: {}", msg),
                Err(UnitError::Failed(never)) => match never {},
            }
        }
        Ok((posts, subscribers))
    }
}
