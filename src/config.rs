use crate::backoff::RetryPolicy;
use std::time::Duration;

/// Operational knobs for one fetch-and-analyse run, with defaults matching
/// the fixed values the tool has always used. Builder methods chain.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub window: Duration,             // only posts newer than now - window
    pub max_posts: usize,             // listing cap, also bounds comment fan-out
    pub post_workers: usize,          // pool size for attribute extraction
    pub comment_workers: usize,       // pool size for comment-tree fetches
    pub post_pause_every: usize,
    pub post_pause: Duration,
    pub comment_pause_every: usize,
    pub comment_pause: Duration,
    pub subscriber_pause: Duration,   // mandatory pause after reading subscribers
    pub post_retry: RetryPolicy,
    pub comment_retry: RetryPolicy,
    pub now: Option<f64>,             // reference clock override (epoch secs); None = wall clock
    pub progress: bool,
    pub progress_label: Option<String>,

    // analytics
    pub new_account_days: i64,
    pub top_n: usize,
    pub top_words: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(3 * 24 * 60 * 60),
            max_posts: 500,
            post_workers: 2,
            comment_workers: 3,
            post_pause_every: 100,
            post_pause: Duration::from_secs(1),
            comment_pause_every: 50,
            comment_pause: Duration::from_millis(500),
            subscriber_pause: Duration::from_secs(1),
            post_retry: RetryPolicy::unbounded(Duration::from_secs(1)),
            comment_retry: RetryPolicy::unbounded(Duration::from_secs(2)),
            now: None,
            progress: true,
            progress_label: None,

            new_account_days: 30,
            top_n: 5,
            top_words: 20,
        }
    }
}

impl FetchOptions {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
    pub fn with_max_posts(mut self, n: usize) -> Self {
        self.max_posts = n;
        self
    }
    pub fn with_post_workers(mut self, n: usize) -> Self {
        self.post_workers = n.max(1);
        self
    }
    pub fn with_comment_workers(mut self, n: usize) -> Self {
        self.comment_workers = n.max(1);
        self
    }
    pub fn with_post_pacing(mut self, every: usize, pause: Duration) -> Self {
        self.post_pause_every = every.max(1);
        self.post_pause = pause;
        self
    }
    pub fn with_comment_pacing(mut self, every: usize, pause: Duration) -> Self {
        self.comment_pause_every = every.max(1);
        self.comment_pause = pause;
        self
    }
    pub fn with_subscriber_pause(mut self, pause: Duration) -> Self {
        self.subscriber_pause = pause;
        self
    }
    pub fn with_post_retry(mut self, policy: RetryPolicy) -> Self {
        self.post_retry = policy;
        self
    }
    pub fn with_comment_retry(mut self, policy: RetryPolicy) -> Self {
        self.comment_retry = policy;
        self
    }
    pub fn with_now(mut self, epoch_secs: f64) -> Self {
        self.now = Some(epoch_secs);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_new_account_days(mut self, days: i64) -> Self {
        self.new_account_days = days;
        self
    }
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }
    pub fn with_top_words(mut self, n: usize) -> Self {
        self.top_words = n;
        self
    }

    /// Reference "now" for this run.
    pub fn now_epoch(&self) -> f64 {
        self.now.unwrap_or_else(crate::date::now_epoch)
    }
}
