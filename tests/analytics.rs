#[path = "common/mod.rs"]
mod common;

use common::*;
use threadinsight::{
    activity_analysis, build_comments, build_posts, comment_summary, common_words, global_stats,
    post_summary, top_performers, user_insights, CommentTable, PostTable, PostType, RawPost,
};
use time::macros::date;

// 2023-11-14 00:00:00 UTC
const MIDNIGHT: f64 = 1_699_920_000.0;
const HOUR: f64 = 3600.0;

fn post(id: &str, author: &str, at: f64, upvotes: i64, num_comments: i64) -> RawPost {
    let mut p = raw_post(id, author, at);
    p.upvotes = upvotes;
    p.num_comments = Some(num_comments);
    p
}

fn sample() -> (PostTable, CommentTable) {
    let mut p1 = post("p1", "alice", MIDNIGHT + 9.0 * HOUR, 50, 2);
    p1.title = "Rust compiler speed".into();
    p1.selftext = "The compiler got faster: https://blog.rust-lang.org".into();
    p1.over_18 = true;
    p1.account_age_days = Some(10);
    let mut p2 = post("p2", "bob", MIDNIGHT - 2.0 * HOUR, 50, 30);
    p2.title = "Compiler errors explained".into();
    p2.spoiler = true;
    p2.gilded = 2;
    p2.post_type = PostType::Image;
    p2.account_age_days = Some(400);
    let mut p3 = post("p3", "alice", MIDNIGHT + 9.5 * HOUR, 5, 1);
    p3.title = "Borrow checker".into();
    p3.locked = true;
    p3.account_age_days = Some(20);
    let posts = build_posts(vec![p1, p2, p3]);

    let comments = build_comments(vec![
        raw_comment("c1", "carol", 7, MIDNIGHT + 10.0 * HOUR, "p1"),
        raw_comment("c2", "AutoModerator", 100, MIDNIGHT + 10.0 * HOUR, "p1"),
        raw_comment("c3", "automoderator", 90, MIDNIGHT + 11.0 * HOUR, "p2"),
        raw_comment("c4", "[deleted]", 3, MIDNIGHT - HOUR, "p2"),
        raw_comment("c5", "carol", 7, MIDNIGHT + 10.0 * HOUR, "p3"),
        raw_comment("c6", "dave", -4, MIDNIGHT + 11.5 * HOUR, "p3"),
        raw_comment("c7", "bob", 2, MIDNIGHT + 11.0 * HOUR, "p1"),
    ]);
    (posts, comments)
}

#[test]
fn global_stats_over_sample() {
    let (posts, comments) = sample();
    let s = global_stats(&posts, &comments);
    assert_eq!(s.posts_count, 3);
    assert_eq!(s.comments_count, 7);
    assert_eq!(s.start_date, Some(date!(2023 - 11 - 13)));
    assert_eq!(s.end_date, Some(date!(2023 - 11 - 14)));
    // alice bob carol AutoModerator automoderator [deleted] dave
    assert_eq!(s.unique_users, 7);
}

/// No posts: zero counts and no dates, rather than a panic.
#[test]
fn global_stats_on_empty_tables() {
    let s = global_stats(&build_posts(vec![]), &build_comments(vec![]));
    assert_eq!((s.posts_count, s.comments_count, s.unique_users), (0, 0, 0));
    assert_eq!(s.start_date, None);
    assert_eq!(s.end_date, None);
    let json = serde_json::to_value(&s).unwrap();
    assert!(json["start_date"].is_null());
}

#[test]
fn post_summary_over_sample() {
    let (posts, _) = sample();
    let s = post_summary(&posts);
    assert_eq!(s.total_posts, 3);
    assert_eq!(s.avg_upvotes, 35.0);
    assert_eq!(s.avg_comments, 11.0);
    assert_eq!(s.link_posts, 1);
    assert_eq!(s.nsfw_posts, 1);
    assert_eq!(s.spoiler_posts, 1);
    assert_eq!(s.locked_posts, 1);
    assert_eq!(s.gilded_posts, 1);
    assert_eq!(s.post_types.get(&PostType::Text), Some(&2));
    assert_eq!(s.post_types.get(&PostType::Image), Some(&1));
    assert_eq!(s.post_types.get(&PostType::Video), None);

    let empty = post_summary(&build_posts(vec![]));
    assert_eq!((empty.avg_upvotes, empty.avg_comments, empty.total_posts), (0.0, 0.0, 0));
}

#[test]
fn post_summary_rounds_means() {
    let posts = build_posts(vec![post("a", "x", NOW, 1, 0), post("b", "x", NOW, 1, 0), post("c", "x", NOW, 0, 1)]);
    let s = post_summary(&posts);
    assert_eq!(s.avg_upvotes, 0.67);
    assert_eq!(s.avg_comments, 0.33);
}

/// Sentinel and bot authors are left out of the commenter ranking; buckets are
/// sorted and only hold hours/dates that occur.
#[test]
fn comment_summary_over_sample() {
    let (_, comments) = sample();
    let s = comment_summary(&comments, 5);
    assert_eq!(s.total_comments, 7);
    assert_eq!(s.avg_upvotes, 29.29);

    let top: Vec<_> = s.top_authors.iter().map(|a| (a.author.as_str(), a.count)).collect();
    // lowercase "automoderator" is not in the exact-match exclusion set
    assert_eq!(top, vec![("carol", 2), ("automoderator", 1), ("bob", 1), ("dave", 1)]);

    let dates: Vec<_> = s.comments_per_date.iter().map(|d| (d.date, d.count)).collect();
    assert_eq!(dates, vec![(date!(2023 - 11 - 13), 1), (date!(2023 - 11 - 14), 6)]);
    let hours: Vec<_> = s.comments_per_hour.iter().map(|h| (h.hour, h.count)).collect();
    assert_eq!(hours, vec![(10, 3), (11, 3), (23, 1)]);
}

/// The comment ranking drops AutoModerator in any case even though it has the
/// highest score; ties keep table order.
#[test]
fn top_performers_over_sample() {
    let (posts, comments) = sample();
    let t = top_performers(&posts, &comments, 5);

    let by_up: Vec<_> = t.by_upvotes.iter().map(|p| (p.title.as_str(), p.upvotes)).collect();
    assert_eq!(
        by_up,
        vec![("Rust compiler speed", 50), ("Compiler errors explained", 50), ("Borrow checker", 5)]
    );
    let by_eng: Vec<_> = t.by_engagement.iter().map(|p| (p.author.as_str(), p.engagement_score)).collect();
    assert_eq!(by_eng, vec![("bob", 80), ("alice", 52), ("alice", 6)]);

    let top_c: Vec<_> = t.comments_by_upvotes.iter().map(|c| (c.comment_author.as_str(), c.comment_upvotes)).collect();
    assert_eq!(top_c, vec![("carol", 7), ("carol", 7), ("[deleted]", 3), ("bob", 2), ("dave", -4)]);
    assert!(t.comments_by_upvotes.iter().all(|c| !c.comment_author.eq_ignore_ascii_case("automoderator")));
}

#[test]
fn activity_over_sample() {
    let (posts, comments) = sample();
    let a = activity_analysis(&posts, &comments);
    let ph: Vec<_> = a.post_hours.iter().map(|h| (h.hour, h.count)).collect();
    assert_eq!(ph, vec![(9, 2), (22, 1)]);
    let pd: Vec<_> = a.post_days.iter().map(|d| (d.date, d.count)).collect();
    assert_eq!(pd, vec![(date!(2023 - 11 - 13), 1), (date!(2023 - 11 - 14), 2)]);
    assert_eq!(a.comment_hours.len(), 3);

    let empty = activity_analysis(&build_posts(vec![]), &build_comments(vec![]));
    assert!(empty.post_hours.is_empty() && empty.post_days.is_empty() && empty.comment_hours.is_empty());
}

#[test]
fn user_insights_over_sample() {
    let (posts, comments) = sample();
    let u = user_insights(&posts, &comments, 5, 30);
    let active: Vec<_> = u.most_active.iter().map(|a| (a.author.as_str(), a.count)).collect();
    // alice 2 posts, bob 1 post + 1 comment, carol 2 comments; then first seen
    assert_eq!(
        active,
        vec![("alice", 2), ("bob", 2), ("carol", 2), ("AutoModerator", 1), ("automoderator", 1)]
    );
    // posts by alice (10, 20) and bob (400)
    assert_eq!(u.avg_account_age_days, Some(143));
    // 10 and 20 are <= 30 out of three known ages
    assert_eq!(u.new_account_pct, 66.67);
}

/// 31 days everywhere is 0 %, 29 days is 100 %, no posts is 0 %.
#[test]
fn new_account_percentage_edges() {
    let with_age = |days: i64| {
        let posts = (0..4)
            .map(|i| {
                let mut p = post(&format!("p{i}"), "u", NOW, 0, 0);
                p.account_age_days = Some(days);
                p
            })
            .collect();
        user_insights(&build_posts(posts), &build_comments(vec![]), 5, 30).new_account_pct
    };
    assert_eq!(with_age(31), 0.0);
    assert_eq!(with_age(29), 100.0);
    assert_eq!(with_age(30), 100.0);

    let empty = user_insights(&build_posts(vec![]), &build_comments(vec![]), 5, 30);
    assert_eq!(empty.new_account_pct, 0.0);
    assert_eq!(empty.avg_account_age_days, None);
    assert!(empty.most_active.is_empty());

    // unknown ages do not count toward the denominator
    let posts = build_posts(vec![post("a", "x", NOW, 0, 0)]);
    assert_eq!(user_insights(&posts, &build_comments(vec![]), 5, 30).new_account_pct, 0.0);
}

#[test]
fn common_words_over_sample() {
    let (posts, _) = sample();
    let words = common_words(&posts, 20);
    assert_eq!(words[0].word, "compiler");
    assert_eq!(words[0].count, 3);
    assert!(words.iter().all(|w| w.word.chars().count() >= 3));
    assert!(words.iter().all(|w| w.word != "the"));
    assert!(words.iter().any(|w| w.word == "https"));

    let top2 = common_words(&posts, 2);
    assert_eq!(top2.len(), 2);
    assert!(common_words(&build_posts(vec![]), 20).is_empty());
}

/// Reordering posts changes nothing but tie order among equal counts.
#[test]
fn common_words_ignore_post_order() {
    let mk = |id: &str, title: &str| {
        let mut p = post(id, "u", NOW, 0, 0);
        p.title = title.into();
        p
    };
    let a = vec![mk("1", "tokio runtime tokio"), mk("2", "runtime async rayon"), mk("3", "rayon threads")];
    let mut b = a.clone();
    b.reverse();

    let mut wa = common_words(&build_posts(a), 20);
    let mut wb = common_words(&build_posts(b), 20);
    assert_eq!(wa.len(), wb.len());
    wa.sort_by(|x, y| x.word.cmp(&y.word));
    wb.sort_by(|x, y| x.word.cmp(&y.word));
    assert_eq!(wa, wb);
}
