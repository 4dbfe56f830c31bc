use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use zstd::stream::read::Decoder;

/// Submission line of a Pushshift-style dump. Extra fields are ignored by serde.
#[derive(Debug, Deserialize)]
pub struct SubmissionLine {
    pub id: String,
    pub subreddit: Option<String>,
    pub author: Option<String>,
    pub author_created_utc: Option<f64>,
    #[serde(default)]
    pub title: String,
    pub selftext: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub is_self: bool,
    pub num_comments: Option<i64>,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default)]
    pub locked: bool,
    pub gilded: Option<i64>,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
    pub subreddit_subscribers: Option<u64>,
}

/// Comment line of a Pushshift-style dump.
#[derive(Debug, Deserialize)]
pub struct CommentLine {
    pub id: String,
    pub author: Option<String>,
    /// `t3_<post>` for top-level comments, `t1_<comment>` for replies.
    pub parent_id: String,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
}

/// Parse one JSON line.
#[inline]
pub fn parse_line<'a, T: Deserialize<'a>>(line: &'a str) -> Result<T> {
    Ok(serde_json::from_str(line)?)
}

#[inline]
fn warn_decode_skip(path: &Path, e: &anyhow::Error) {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::warn!(
        "Skipping dump file after read error\n  path : {}\n  error: {}",
        abs.display(),
        e
    );
}

/// Stream a `.zst` or plain `.jsonl` file line by line. Empty lines are skipped.
///
/// A decode failure part-way through logs a warning and keeps whatever was read
/// up to that point; an `on_line` error aborts.
pub fn for_each_line(path: &Path, mut on_line: impl FnMut(&str) -> Result<()>) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let compressed = path.extension().is_some_and(|e| e == "zst");
    let reader: Box<dyn Read> = if compressed {
        let mut decoder = Decoder::new(file)?;
        decoder.window_log_max(31)?;
        Box::new(decoder)
    } else {
        Box::new(file)
    };
    let mut reader = BufReader::with_capacity(64 * 1024, reader);

    let mut buf = String::with_capacity(16 * 1024);
    loop {
        buf.clear();
        let n = match reader.read_line(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn_decode_skip(path, &anyhow::Error::from(e));
                return Ok(());
            }
        };
        if n == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            continue;
        }
        on_line(line)?;
    }
    Ok(())
}

/// Stream a file and parse every line as `T`; lines that fail to parse are
/// counted and skipped.
pub fn for_each_record<T: for<'de> Deserialize<'de>>(
    path: &Path,
    mut on_record: impl FnMut(T),
) -> Result<usize> {
    let mut bad = 0usize;
    for_each_line(path, |line| {
        match parse_line::<T>(line) {
            Ok(rec) => on_record(rec),
            Err(_) => bad += 1,
        }
        Ok(())
    })?;
    if bad > 0 {
        tracing::debug!("{}: skipped {} unparseable line(s)", path.display(), bad);
    }
    Ok(bad)
}
