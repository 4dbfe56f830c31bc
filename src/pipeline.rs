use crate::analytics::{
    activity_analysis, comment_summary, common_words, global_stats, post_summary, top_performers,
    user_insights, ActivityAnalysis, CommentSummary, GlobalStats, PostSummary, TopPerformers,
    UserInsights, WordCount,
};
use crate::backoff::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::client::ForumClient;
use crate::comments::CommentTreeFetcher;
use crate::concurrency::{Pacing, ParallelFetchCoordinator};
use crate::config::FetchOptions;
use crate::dataset::{build_comments, build_posts, CommentTable, PostTable};
use crate::error::FetchError;
use crate::posts::PostWindowFetcher;
use crate::util::{init_tracing_once, normalize_subreddit};
use indicatif::MultiProgress;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Fetch-and-analyse run over one forum client.
pub struct ThreadInsight<C> {
    client: Arc<C>,
    pub(crate) opts: FetchOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl<C> Clone for ThreadInsight<C> {
    fn clone(&self) -> Self {
        Self { client: Arc::clone(&self.client), opts: self.opts.clone(), sleeper: Arc::clone(&self.sleeper) }
    }
}

impl<C: ForumClient + 'static> ThreadInsight<C> {
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<C>) -> Self {
        Self { client, opts: FetchOptions::default(), sleeper: Arc::new(ThreadSleeper) }
    }

    // -------- Builder methods --------
    pub fn options(mut self, opts: FetchOptions) -> Self { self.opts = opts; self }
    pub fn window(mut self, window: Duration) -> Self { self.opts = self.opts.with_window(window); self }
    pub fn max_posts(mut self, n: usize) -> Self { self.opts = self.opts.with_max_posts(n); self }
    pub fn post_workers(mut self, n: usize) -> Self { self.opts = self.opts.with_post_workers(n); self }
    pub fn comment_workers(mut self, n: usize) -> Self { self.opts = self.opts.with_comment_workers(n); self }
    pub fn post_pacing(mut self, every: usize, pause: Duration) -> Self { self.opts = self.opts.with_post_pacing(every, pause); self }
    pub fn comment_pacing(mut self, every: usize, pause: Duration) -> Self { self.opts = self.opts.with_comment_pacing(every, pause); self }
    pub fn subscriber_pause(mut self, pause: Duration) -> Self { self.opts = self.opts.with_subscriber_pause(pause); self }
    pub fn post_retry(mut self, policy: RetryPolicy) -> Self { self.opts = self.opts.with_post_retry(policy); self }
    pub fn comment_retry(mut self, policy: RetryPolicy) -> Self { self.opts = self.opts.with_comment_retry(policy); self }
    pub fn as_of(mut self, epoch_secs: f64) -> Self { self.opts = self.opts.with_now(epoch_secs); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn new_account_days(mut self, days: i64) -> Self { self.opts = self.opts.with_new_account_days(days); self }
    pub fn top_n(mut self, n: usize) -> Self { self.opts = self.opts.with_top_n(n); self }
    pub fn top_words(mut self, n: usize) -> Self { self.opts = self.opts.with_top_words(n); self }
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self { self.sleeper = sleeper; self }

    /// Fetch the window of `subreddit` and every comment under it, then build
    /// the two tables. Only an unknown subreddit (or an aborted retry) fails.
    pub fn fetch(&self, subreddit: impl AsRef<str>) -> Result<Snapshot, FetchError> {
        init_tracing_once();
        let name = normalize_subreddit(subreddit.as_ref());

        let group = self.opts.progress.then(MultiProgress::new);
        let mut posts = PostWindowFetcher::new(Arc::clone(&self.client), self.opts.clone(), Arc::clone(&self.sleeper));
        if let Some(mp) = &group {
            posts = posts.progress_group(mp.clone());
        }
        let (raw_posts, subscribers) = posts.fetch(&name)?;
        if raw_posts.is_empty() {
            tracing::warn!("No posts found in r/{} within the window.", name);
        }

        let fetcher = CommentTreeFetcher::new(
            Arc::clone(&self.client),
            self.opts.comment_retry.clone(),
            Arc::clone(&self.sleeper),
        );
        let mut coordinator = ParallelFetchCoordinator::new(
            fetcher,
            self.opts.comment_workers,
            Pacing { every: self.opts.comment_pause_every, pause: self.opts.comment_pause },
            Arc::clone(&self.sleeper),
        )
        .progress(self.opts.progress);
        if let Some(mp) = group {
            coordinator = coordinator.progress_group(mp);
        }
        let raw_comments = coordinator.fetch_all(&raw_posts)?;
        tracing::info!("r/{}: {} post(s), {} comment(s)", name, raw_posts.len(), raw_comments.len());

        Ok(Snapshot {
            subreddit: name,
            subscribers,
            posts: build_posts(raw_posts),
            comments: build_comments(raw_comments),
            window: self.opts.window,
            new_account_days: self.opts.new_account_days,
            top_n: self.opts.top_n,
            top_words: self.opts.top_words,
        })
    }

    /// [`fetch`](Self::fetch) followed by [`Snapshot::analyze`].
    pub fn run(&self, subreddit: impl AsRef<str>) -> Result<Option<Report>, FetchError> {
        Ok(self.fetch(subreddit)?.analyze())
    }
}

/// `3 days`, `1 day`, `6 hours`, or seconds when neither divides evenly.
fn describe_window(window: Duration) -> String {
    const HOUR: u64 = 3600;
    const DAY: u64 = 24 * HOUR;
    let secs = window.as_secs();
    let plural = |n: u64, unit: &str| if n == 1 { format!("1 {unit}") } else { format!("{n} {unit}s") };
    if secs > 0 && secs % DAY == 0 {
        plural(secs / DAY, "day")
    } else if secs > 0 && secs % HOUR == 0 {
        plural(secs / HOUR, "hour")
    } else {
        plural(secs, "second")
    }
}

/// The two tables of one run, plus what the analytics need to rank them.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub subreddit: String,
    pub subscribers: u64,
    pub posts: PostTable,
    pub comments: CommentTable,
    window: Duration,
    new_account_days: i64,
    top_n: usize,
    top_words: usize,
}

impl Snapshot {
    /// An empty window is a valid outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// How far back from the reference time posts were taken.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Message for a run whose window held no posts.
    pub fn no_posts_notice(&self) -> String {
        format!("No posts found in r/{} from the past {}.", self.subreddit, describe_window(self.window))
    }

    /// Every analytics result, or `None` when the window held no posts.
    pub fn analyze(&self) -> Option<Report> {
        if self.is_empty() {
            return None;
        }
        let (p, c) = (&self.posts, &self.comments);
        Some(Report {
            subreddit: self.subreddit.clone(),
            subscribers: self.subscribers,
            stats: global_stats(p, c),
            posts: post_summary(p),
            comments: comment_summary(c, self.top_n),
            top: top_performers(p, c, self.top_n),
            activity: activity_analysis(p, c),
            users: user_insights(p, c, self.top_n, self.new_account_days),
            words: common_words(p, self.top_words),
        })
    }
}

/// Read-only bundle handed to whatever renders the results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub subreddit: String,
    pub subscribers: u64,
    pub stats: GlobalStats,
    pub posts: PostSummary,
    pub comments: CommentSummary,
    pub top: TopPerformers,
    pub activity: ActivityAnalysis,
    pub users: UserInsights,
    pub words: Vec<WordCount>,
}
