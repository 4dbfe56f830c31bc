use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Type of dump file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Comment,    // comments/*.zst | *.jsonl
    Submission, // submissions/*.zst | *.jsonl
}

impl FileKind {
    fn dir_name(self) -> &'static str {
        match self {
            FileKind::Comment => "comments",
            FileKind::Submission => "submissions",
        }
    }
}

fn dump_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.(zst|jsonl|ndjson)$").expect("static dump regex"))
}

/// Dump files of `kind` under `base/<kind dir>`, sorted by file name.
/// A missing directory yields nothing.
pub fn discover(base: &Path, kind: FileKind) -> Vec<PathBuf> {
    let dir = base.join(kind.dir_name());
    if !dir.exists() {
        return Vec::new();
    }
    WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|ent| ent.file_type().is_file())
        .filter(|ent| ent.file_name().to_str().is_some_and(|n| dump_name_re().is_match(n)))
        .map(|ent| ent.into_path())
        .collect()
}
