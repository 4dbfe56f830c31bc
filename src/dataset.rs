//! Raw fetch records -> normalised, read-only tables with derived columns.

use crate::comments::RawComment;
use crate::date::{hms, split_epoch, ymd};
use crate::posts::{PostType, RawPost};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use time::{Date, Time};

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://").expect("static link regex"))
}

/// True when `text` contains an http(s) URL scheme.
pub fn has_link(text: &str) -> bool {
    !text.is_empty() && link_re().is_match(text)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
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
    #[serde(with = "ymd")]
    pub created_date: Date,
    #[serde(with = "hms")]
    pub created_time: Time,
    pub post_type: PostType,
    pub account_age_days: Option<i64>,
    pub has_link: bool,
    pub engagement_score: i64,
}

impl PostRecord {
    pub fn from_raw(p: RawPost) -> Self {
        let (created_date, created_time) = split_epoch(p.created_utc);
        let has_link = has_link(&p.selftext);
        let engagement_score = p.upvotes + p.num_comments.unwrap_or(0);
        Self {
            id: p.id,
            author: p.author,
            title: p.title,
            selftext: p.selftext,
            is_self: p.is_self,
            num_comments: p.num_comments,
            over_18: p.over_18,
            spoiler: p.spoiler,
            locked: p.locked,
            gilded: p.gilded,
            upvotes: p.upvotes,
            created_date,
            created_time,
            post_type: p.post_type,
            account_age_days: p.account_age_days,
            has_link,
            engagement_score,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment_id: String,
    pub comment_author: String,
    pub comment_upvotes: i64,
    #[serde(with = "ymd")]
    pub comment_created_date: Date,
    #[serde(with = "hms")]
    pub comment_created_time: Time,
    pub post_id: String,
}

impl CommentRecord {
    pub fn from_raw(c: RawComment) -> Self {
        let (comment_created_date, comment_created_time) = split_epoch(c.comment_created_utc);
        Self {
            comment_id: c.comment_id,
            comment_author: c.comment_author,
            comment_upvotes: c.comment_upvotes,
            comment_created_date,
            comment_created_time,
            post_id: c.post_id,
        }
    }
}

/// Immutable post table for one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PostTable {
    rows: Vec<PostRecord>,
}

impl PostTable {
    pub fn rows(&self) -> &[PostRecord] { &self.rows }
    pub fn iter(&self) -> std::slice::Iter<'_, PostRecord> { self.rows.iter() }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

impl<'a> IntoIterator for &'a PostTable {
    type Item = &'a PostRecord;
    type IntoIter = std::slice::Iter<'a, PostRecord>;
    fn into_iter(self) -> Self::IntoIter { self.rows.iter() }
}

/// Immutable comment table for one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommentTable {
    rows: Vec<CommentRecord>,
}

impl CommentTable {
    pub fn rows(&self) -> &[CommentRecord] { &self.rows }
    pub fn iter(&self) -> std::slice::Iter<'_, CommentRecord> { self.rows.iter() }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

impl<'a> IntoIterator for &'a CommentTable {
    type Item = &'a CommentRecord;
    type IntoIter = std::slice::Iter<'a, CommentRecord>;
    fn into_iter(self) -> Self::IntoIter { self.rows.iter() }
}

pub fn build_posts(raw: Vec<RawPost>) -> PostTable {
    PostTable { rows: raw.into_iter().map(PostRecord::from_raw).collect() }
}

pub fn build_comments(raw: Vec<RawComment>) -> CommentTable {
    CommentTable { rows: raw.into_iter().map(CommentRecord::from_raw).collect() }
}
