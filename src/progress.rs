//! Progress reporting: count-style bars for the extraction and comment phases.
//! Bars of one run share a [`MultiProgress`] so they render stacked instead of
//! overwriting each other.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Count-style progress bar (items processed out of total), with an optional label.
/// With a `group` the bar is added to it; otherwise it draws to the terminal.
pub fn make_count_progress(group: Option<&MultiProgress>, total: u64, label: &str) -> ProgressBar {
    let pb = match group {
        Some(mp) => mp.add(ProgressBar::new(total)),
        None => ProgressBar::new(total),
    };
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         it/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}"
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// `Some(bar)` when progress is enabled, so call sites can `if let Some(pb)`.
pub fn count_progress_if(enabled: bool, group: Option<&MultiProgress>, total: u64, label: &str) -> Option<ProgressBar> {
    if enabled { Some(make_count_progress(group, total, label)) } else { None }
}
