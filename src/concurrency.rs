//! Bounded worker pools with completion-order collection and pacing, plus the
//! per-post comment fan-out built on top of them.

use crate::backoff::Sleeper;
use crate::client::ForumClient;
use crate::comments::{CommentTreeFetcher, RawComment};
use crate::error::{FetchError, PoolError};
use crate::posts::RawPost;
use crate::progress::count_progress_if;
use indicatif::MultiProgress;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Why a unit of work produced no value.
#[derive(Debug)]
pub enum UnitError<E> {
    Failed(E),
    Panicked(String),
}

/// One finished unit. `index` is the submission position of its input.
#[derive(Debug)]
pub struct Completion<R, E> {
    pub index: usize,
    pub result: Result<R, UnitError<E>>,
}

/// Pacing for a pool: after every `every` completions, pause for `pause`
/// before admitting more work.
#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    pub every: usize,
    pub pause: Duration,
}

fn panic_message(p: &(dyn Any + Send)) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `job` over `items` on a dedicated pool of `workers` threads.
///
/// At most `workers` units are in flight. Completions are returned in arrival
/// order, not submission order. A failing or panicking unit yields its own
/// `Err` and never affects the others. `on_complete(n)` is called with the running
/// completion count, before any pacing pause.
pub fn run_paced_pool<T, R, E, F>(
    label: &str,
    items: Vec<T>,
    workers: usize,
    pacing: Pacing,
    sleeper: &dyn Sleeper,
    job: F,
    mut on_complete: impl FnMut(usize),
) -> Result<Vec<Completion<R, E>>, PoolError>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    let workers = workers.max(1);
    let prefix = label.to_string();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("{prefix}-{i}"))
        .build()?;

    let job = Arc::new(job);
    let (tx, rx) = mpsc::channel::<(usize, Result<R, UnitError<E>>)>();
    let submit = |tx: &mpsc::Sender<_>, (index, item): (usize, T)| {
        let tx = tx.clone();
        let job = Arc::clone(&job);
        pool.spawn(move || {
            let result = match panic::catch_unwind(AssertUnwindSafe(|| job(item))) {
                Ok(Ok(v)) => Ok(v),
                Ok(Err(e)) => Err(UnitError::Failed(e)),
                Err(p) => Err(UnitError::Panicked(panic_message(p.as_ref()))),
            };
            let _ = tx.send((index, result));
        });
    };

    let mut pending = items.into_iter().enumerate();
    for unit in pending.by_ref().take(workers) {
        submit(&tx, unit);
    }
    // Once everything is submitted only the spawned units hold senders, so a
    // unit that goes away without reporting shows up as a disconnect.
    let mut tx = (pending.len() > 0).then_some(tx);

    let every = pacing.every.max(1);
    let mut done = Vec::with_capacity(total);
    while done.len() < total {
        let (index, result) = rx
            .recv()
            .map_err(|_| PoolError::Disconnected { pending: total - done.len() })?;
        done.push(Completion { index, result });
        let n = done.len();
        on_complete(n);
        if n % every == 0 {
            tracing::debug!("{}: {} completed, pausing {:?}", label, n, pacing.pause);
            sleeper.sleep(pacing.pause);
        }
        if let (Some(sender), Some(unit)) = (&tx, pending.next()) {
            submit(sender, unit);
        }
        if pending.len() == 0 {
            tx = None;
        }
    }
    Ok(done)
}

/// Comments for one post, or `None` when that post's fetch was abandoned.
#[derive(Debug)]
pub struct PostComments {
    pub post_id: String,
    pub comments: Option<Vec<RawComment>>,
}

/// Fans [`CommentTreeFetcher`] out over many posts.
pub struct ParallelFetchCoordinator<C> {
    fetcher: Arc<CommentTreeFetcher<C>>,
    workers: usize,
    pacing: Pacing,
    sleeper: Arc<dyn Sleeper>,
    progress: bool,
    progress_group: Option<MultiProgress>,
}

impl<C: ForumClient + 'static> ParallelFetchCoordinator<C> {
    pub fn new(fetcher: CommentTreeFetcher<C>, workers: usize, pacing: Pacing, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { fetcher: Arc::new(fetcher), workers: workers.max(1), pacing, sleeper, progress: false, progress_group: None }
    }

    pub fn progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    /// Draw the comment bar inside `group`.
    pub fn progress_group(mut self, group: MultiProgress) -> Self {
        self.progress_group = Some(group);
        self
    }

    /// Per-post outcomes in completion order; failed posts carry `comments: None`.
    pub fn fetch_each(&self, posts: &[RawPost]) -> Result<Vec<PostComments>, PoolError> {
        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let pb = count_progress_if(self.progress, self.progress_group.as_ref(), ids.len() as u64, "Fetching comments");
        let fetcher = Arc::clone(&self.fetcher);
        let completions = run_paced_pool(
            "comments",
            ids.clone(),
            self.workers,
            self.pacing,
            self.sleeper.as_ref(),
            move |post_id: String| fetcher.try_fetch(&post_id),
            |_| if let Some(pb) = &pb { pb.inc(1); },
        )?;
        if let Some(pb) = pb { pb.finish_with_message("Comments fetched"); }

        Ok(completions
            .into_iter()
            .map(|c| {
                let post_id = ids[c.index].clone();
                let comments = match c.result {
                    Ok(v) => Some(v),
                    Err(UnitError::Failed(e)) => {
                        tracing::warn!("comment fetch for post {} abandoned: {}", post_id, e);
                        None
                    }
                    Err(UnitError::Panicked(msg)) => {
                        tracing::warn!("comment fetch for post {} panicked: {}", post_id, msg);
                        None
                    }
                };
                PostComments { post_id, comments }
            })
            .collect())
    }

    /// Union of all comments. A post whose fetch failed contributes nothing.
    pub fn fetch_all(&self, posts: &[RawPost]) -> Result<Vec<RawComment>, FetchError> {
        let per_post = self.fetch_each(posts)?;
        let missing = per_post.iter().filter(|p| p.comments.is_none()).count();
        if missing > 0 {
            tracing::info!("{} of {} post(s) yielded no comments due to fetch errors", missing, per_post.len());
        }
        Ok(per_post.into_iter().flat_map(|p| p.comments.unwrap_or_default()).collect())
    }
}
