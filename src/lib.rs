mod config;
mod date;
mod error;
mod client;
mod backoff;

mod posts;
mod comments;
mod concurrency;
mod progress;
mod util;

mod dataset;
mod counting;
mod stopwords;
mod analytics;

mod paths;
mod zstd_jsonl;
mod archive;
mod pipeline;

pub use crate::config::FetchOptions;
pub use crate::error::{ClientError, FetchError, PoolError, RetryError};
pub use crate::client::{CommentData, CommentNode, ForumClient, Submission, SubredditInfo};
pub use crate::backoff::{call_with_backoff, CancelToken, RetryPolicy, Sleeper, ThreadSleeper};

// Fetch layer.
pub use crate::posts::{account_age_days, classify_post_type, extract_post, window_submissions, PostType, PostWindowFetcher, RawPost};
pub use crate::comments::{flatten_tree, CommentTreeFetcher, RawComment};
pub use crate::concurrency::{run_paced_pool, Completion, Pacing, ParallelFetchCoordinator, PostComments, UnitError};

// Tables and analytics.
pub use crate::dataset::{build_comments, build_posts, has_link, CommentRecord, CommentTable, PostRecord, PostTable};
pub use crate::analytics::{
    activity_analysis, comment_summary, common_words, global_stats, post_summary, tokens, top_performers,
    user_insights, ActivityAnalysis, AuthorCount, CommentSummary, DateCount, EngagedPost, GlobalStats,
    HourCount, PostSummary, TopComment, TopPerformers, TopPost, UserInsights, WordCount,
};
pub use crate::stopwords::{is_stop_word, ENGLISH_STOP_WORDS};
pub use crate::date::{split_epoch, whole_days_between};

// Offline client and orchestration.
pub use crate::archive::ArchiveClient;
pub use crate::pipeline::{Report, Snapshot, ThreadInsight};

pub use crate::progress::make_count_progress;

pub use crate::util::{init_tracing_once, normalize_subreddit, AUTOMODERATOR, DELETED_AUTHOR};
