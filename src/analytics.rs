//! Descriptive analytics over one run's post and comment tables.
//!
//! Every function is pure and total: empty tables produce zero counts, empty
//! rankings and `None` where a value (earliest date, mean account age) is
//! undefined. Rankings use a stable sort, so equal values keep table order.

use crate::counting::{bucket_counts, mean, round2, top_n_by_key, OrderedCounts};
use crate::dataset::{CommentTable, PostTable};
use crate::date::{hour_of, ymd};
use crate::posts::PostType;
use crate::stopwords::is_stop_word;
use crate::util::{excluded_commenters, is_automoderator};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use time::Date;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    pub hour: u8,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    #[serde(with = "ymd")]
    pub date: Date,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: usize,
}

fn hour_buckets(hours: impl IntoIterator<Item = u8>) -> Vec<HourCount> {
    bucket_counts(hours).into_iter().map(|(hour, count)| HourCount { hour, count }).collect()
}

fn date_buckets(dates: impl IntoIterator<Item = Date>) -> Vec<DateCount> {
    bucket_counts(dates).into_iter().map(|(date, count)| DateCount { date, count }).collect()
}

// ----------------------------- Global stats -----------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub posts_count: usize,
    pub comments_count: usize,
    /// `None` when there are no posts.
    #[serde(with = "ymd::option")]
    pub start_date: Option<Date>,
    #[serde(with = "ymd::option")]
    pub end_date: Option<Date>,
    /// Distinct authors over posts and comments. Sentinels count like any name.
    pub unique_users: usize,
}

pub fn global_stats(posts: &PostTable, comments: &CommentTable) -> GlobalStats {
    let mut users: BTreeSet<&str> = posts.iter().map(|p| p.author.as_str()).collect();
    users.extend(comments.iter().map(|c| c.comment_author.as_str()));
    GlobalStats {
        posts_count: posts.len(),
        comments_count: comments.len(),
        start_date: posts.iter().map(|p| p.created_date).min(),
        end_date: posts.iter().map(|p| p.created_date).max(),
        unique_users: users.len(),
    }
}

// ----------------------------- Post summary -----------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub total_posts: usize,
    pub avg_upvotes: f64,
    /// Mean over posts with a known comment count.
    pub avg_comments: f64,
    pub link_posts: usize,
    pub nsfw_posts: usize,
    pub spoiler_posts: usize,
    pub locked_posts: usize,
    /// Posts gilded at least once.
    pub gilded_posts: usize,
    pub post_types: BTreeMap<PostType, usize>,
}

pub fn post_summary(posts: &PostTable) -> PostSummary {
    let count = |f: fn(&crate::dataset::PostRecord) -> bool| posts.iter().filter(|p| f(p)).count();
    PostSummary {
        total_posts: posts.len(),
        avg_upvotes: round2(mean(posts.iter().map(|p| p.upvotes as f64)).unwrap_or(0.0)),
        avg_comments: round2(
            mean(posts.iter().filter_map(|p| p.num_comments).map(|n| n as f64)).unwrap_or(0.0),
        ),
        link_posts: count(|p| p.has_link),
        nsfw_posts: count(|p| p.over_18),
        spoiler_posts: count(|p| p.spoiler),
        locked_posts: count(|p| p.locked),
        gilded_posts: count(|p| p.gilded > 0),
        post_types: bucket_counts(posts.iter().map(|p| p.post_type)),
    }
}

// ----------------------------- Comment summary -----------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub total_comments: usize,
    pub avg_upvotes: f64,
    /// Excludes `[deleted]` and `AutoModerator`; ties ordered by author name.
    pub top_authors: Vec<AuthorCount>,
    pub comments_per_date: Vec<DateCount>,
    pub comments_per_hour: Vec<HourCount>,
}

pub fn comment_summary(comments: &CommentTable, top_n: usize) -> CommentSummary {
    let excluded = excluded_commenters();
    let grouped: Vec<(&str, usize)> = bucket_counts(
        comments
            .iter()
            .map(|c| c.comment_author.as_str())
            .filter(|a| !excluded.contains(a)),
    )
    .into_iter()
    .collect();
    let top_authors = top_n_by_key(grouped, top_n, |(_, n)| *n as i64)
        .into_iter()
        .map(|(author, count)| AuthorCount { author: author.to_string(), count })
        .collect();
    CommentSummary {
        total_comments: comments.len(),
        avg_upvotes: round2(mean(comments.iter().map(|c| c.comment_upvotes as f64)).unwrap_or(0.0)),
        top_authors,
        comments_per_date: date_buckets(comments.iter().map(|c| c.comment_created_date)),
        comments_per_hour: hour_buckets(comments.iter().map(|c| hour_of(c.comment_created_time))),
    }
}

// ----------------------------- Top performers -----------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopPost {
    pub title: String,
    pub author: String,
    pub upvotes: i64,
    pub num_comments: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngagedPost {
    pub title: String,
    pub author: String,
    pub engagement_score: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopComment {
    pub comment_author: String,
    pub comment_upvotes: i64,
    pub post_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopPerformers {
    pub by_upvotes: Vec<TopPost>,
    pub by_engagement: Vec<EngagedPost>,
    /// AutoModerator (any case) never appears here.
    pub comments_by_upvotes: Vec<TopComment>,
}

pub fn top_performers(posts: &PostTable, comments: &CommentTable, top_n: usize) -> TopPerformers {
    let rows: Vec<_> = posts.iter().collect();
    let by_upvotes = top_n_by_key(rows.clone(), top_n, |p| p.upvotes)
        .into_iter()
        .map(|p| TopPost {
            title: p.title.clone(),
            author: p.author.clone(),
            upvotes: p.upvotes,
            num_comments: p.num_comments,
        })
        .collect();
    let by_engagement = top_n_by_key(rows, top_n, |p| p.engagement_score)
        .into_iter()
        .map(|p| EngagedPost {
            title: p.title.clone(),
            author: p.author.clone(),
            engagement_score: p.engagement_score,
        })
        .collect();
    let eligible: Vec<_> = comments.iter().filter(|c| !is_automoderator(&c.comment_author)).collect();
    let comments_by_upvotes = top_n_by_key(eligible, top_n, |c| c.comment_upvotes)
        .into_iter()
        .map(|c| TopComment {
            comment_author: c.comment_author.clone(),
            comment_upvotes: c.comment_upvotes,
            post_id: c.post_id.clone(),
        })
        .collect();
    TopPerformers { by_upvotes, by_engagement, comments_by_upvotes }
}

// ----------------------------- Activity -----------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityAnalysis {
    pub post_hours: Vec<HourCount>,
    pub post_days: Vec<DateCount>,
    pub comment_hours: Vec<HourCount>,
}

pub fn activity_analysis(posts: &PostTable, comments: &CommentTable) -> ActivityAnalysis {
    ActivityAnalysis {
        post_hours: hour_buckets(posts.iter().map(|p| hour_of(p.created_time))),
        post_days: date_buckets(posts.iter().map(|p| p.created_date)),
        comment_hours: hour_buckets(comments.iter().map(|c| hour_of(c.comment_created_time))),
    }
}

// ----------------------------- User insights -----------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInsights {
    /// Posts then comments; ties ordered by first appearance.
    pub most_active: Vec<AuthorCount>,
    /// Truncated mean account age over posts by `most_active` authors with a
    /// known age; `None` when none is known.
    pub avg_account_age_days: Option<i64>,
    /// Share of posts with a known age at or below the threshold, in percent.
    pub new_account_pct: f64,
}

pub fn user_insights(
    posts: &PostTable,
    comments: &CommentTable,
    top_n: usize,
    new_account_days: i64,
) -> UserInsights {
    let activity: OrderedCounts<&str> = posts
        .iter()
        .map(|p| p.author.as_str())
        .chain(comments.iter().map(|c| c.comment_author.as_str()))
        .collect();
    let most_active: Vec<AuthorCount> = activity
        .most_common(top_n)
        .into_iter()
        .map(|(author, count)| AuthorCount { author: author.to_string(), count })
        .collect();

    let top: BTreeSet<&str> = most_active.iter().map(|a| a.author.as_str()).collect();
    let avg_account_age_days = mean(
        posts
            .iter()
            .filter(|p| top.contains(p.author.as_str()))
            .filter_map(|p| p.account_age_days)
            .map(|d| d as f64),
    )
    .map(|m| m.trunc() as i64);

    let known: Vec<i64> = posts.iter().filter_map(|p| p.account_age_days).collect();
    let new_account_pct = if known.is_empty() {
        0.0
    } else {
        let fresh = known.iter().filter(|&&d| d <= new_account_days).count();
        round2(fresh as f64 / known.len() as f64 * 100.0)
    };

    UserInsights { most_active, avg_account_age_days, new_account_pct }
}

// ----------------------------- Common words -----------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w+\b").expect("static word regex"))
}

/// Lowercased word tokens of `text` worth counting: at least three characters
/// and not a stop word.
pub fn tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 2 && !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

/// Most frequent words across all titles and bodies; ties keep first-seen order.
pub fn common_words(posts: &PostTable, top_words: usize) -> Vec<WordCount> {
    let mut counts = OrderedCounts::new();
    for p in posts {
        for w in tokens(&p.title).into_iter().chain(tokens(&p.selftext)) {
            counts.ingest(w);
        }
    }
    counts
        .most_common(top_words)
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect()
}
