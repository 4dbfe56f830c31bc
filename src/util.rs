//! Shared sentinels, name normalisation and tracing bootstrap.

/// Author recorded when the account behind a post or comment is gone.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// The moderation bot present in most subreddits.
pub const AUTOMODERATOR: &str = "AutoModerator";

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Authors left out of the top-commenter ranking (exact, case-sensitive match).
pub fn excluded_commenters() -> [&'static str; 2] {
    [DELETED_AUTHOR, AUTOMODERATOR]
}

/// Case-insensitive AutoModerator check used by the comment ranking.
#[inline]
pub fn is_automoderator(author: &str) -> bool {
    author.eq_ignore_ascii_case(AUTOMODERATOR)
}

/// Trim and strip an optional `r/` (or `/r/`) prefix. Case is preserved.
#[inline]
pub fn normalize_subreddit(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('/').unwrap_or(s);
    match s.get(..2) {
        Some(p) if p.eq_ignore_ascii_case("r/") => s[2..].to_string(),
        _ => s.to_string(),
    }
}
