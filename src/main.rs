use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use threadinsight::{init_tracing_once, ArchiveClient, FetchError, ThreadInsight};

const DATA_ROOT: &str = "./data";

fn main() -> Result<ExitCode> {
    init_tracing_once();
    let mut args = std::env::args().skip(1);
    let Some(subreddit) = args.next() else {
        bail!("usage: threadinsight <subreddit> [archive_dir] [as_of_epoch]");
    };
    let base_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DATA_ROOT));
    let as_of: Option<f64> = args
        .next()
        .map(|s| s.parse().with_context(|| format!("invalid epoch timestamp: {s}")))
        .transpose()?;

    let client = ArchiveClient::open(&base_dir)
        .with_context(|| format!("loading archive from {}", base_dir.display()))?;
    let mut run = ThreadInsight::new(client).progress(true);
    if let Some(ts) = as_of {
        run = run.as_of(ts);
    }

    let snapshot = match run.fetch(&subreddit) {
        Ok(s) => s,
        Err(e @ FetchError::NotFound(_)) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    match snapshot.analyze() {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => println!("{}", snapshot.no_posts_notice()),
    }
    Ok(ExitCode::SUCCESS)
}
