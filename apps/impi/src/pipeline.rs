//! Concurrent multi-file verification.
//!
//! Three kinds of stage run as tasks of one `JoinSet`: a discovery stage
//! feeding paths, a bounded pool of workers verifying files, and a single
//! aggregator handing failures to the reporter. Two bounded conduits join
//! them, so discovery waits when workers fall behind and workers wait when
//! the aggregator does. The first fatal error raises the shared
//! cancellation token and closes both conduits; every stage then unwinds
//! and the error is returned.

use crate::config::VerifyOptions;
use crate::discover::{expand_root, FileFilter};
use crate::error::{RunError, SetupError};
use crate::models::{RunSummary, VerificationError};
use crate::verify::Verifier;
use async_channel::{Receiver, Sender};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Receives each failing file exactly once, as soon as it is known.
pub trait Reporter: Send + Sync {
    fn report(&self, err: &VerificationError);
}

enum StageDone {
    Discovery { files: usize },
    Worker,
    Aggregator { failed: usize },
}

/// A configured run: worker count plus the shared, read-only options.
pub struct Pipeline {
    workers: usize,
    options: Arc<VerifyOptions>,
}

impl Pipeline {
    pub fn new(workers: usize, options: VerifyOptions) -> Self {
        Self {
            workers: workers.max(1),
            options: Arc::new(options),
        }
    }

    /// Verify every Go file under `roots`, streaming failures to `reporter`.
    ///
    /// Returns `RunError::Failed` when at least one file failed, or the first
    /// fatal error (discovery failure, unreadable file) otherwise.
    pub async fn run(&self, roots: &[String], reporter: Arc<dyn Reporter>) -> Result<RunSummary, RunError> {
        if roots.is_empty() {
            return Err(SetupError::NoRoots.into());
        }
        info!(
            "verifying {} root(s) with {} workers, scheme {}",
            roots.len(),
            self.workers,
            self.options.scheme.id
        );

        let token = CancellationToken::new();
        let (path_tx, path_rx) = async_channel::bounded::<PathBuf>(self.workers);
        let (result_tx, result_rx) = async_channel::bounded::<VerificationError>(self.workers);

        let mut stages = JoinSet::new();
        stages.spawn(discover(
            roots.to_vec(),
            self.options.clone(),
            path_tx,
            token.clone(),
        ));
        for id in 0..self.workers {
            stages.spawn(work(
                id,
                self.options.clone(),
                path_rx.clone(),
                result_tx.clone(),
                token.clone(),
            ));
        }
        // Workers hold the only result senders, so the aggregator sees the
        // conduit close once the last of them exits.
        drop(result_tx);
        stages.spawn(aggregate(result_rx.clone(), reporter, token.clone()));

        let mut first_error: Option<RunError> = None;
        let mut summary = RunSummary::default();
        while let Some(joined) = stages.join_next().await {
            match joined.map_err(RunError::from).and_then(|done| done) {
                Ok(StageDone::Discovery { files }) => summary.files = files,
                Ok(StageDone::Worker) => {}
                Ok(StageDone::Aggregator { failed }) => summary.failed = failed,
                Err(e) if first_error.is_none() => {
                    warn!("cancelling run: {}", e);
                    token.cancel();
                    path_rx.close();
                    result_rx.close();
                    first_error = Some(e);
                }
                Err(e) => debug!("ignoring error after cancellation: {}", e),
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        info!("verified {} files, {} failed", summary.files, summary.failed);
        if summary.failed > 0 {
            return Err(RunError::Failed {
                count: summary.failed,
                files: summary.files,
            });
        }
        Ok(summary)
    }
}

async fn discover(
    roots: Vec<String>,
    options: Arc<VerifyOptions>,
    tx: Sender<PathBuf>,
    token: CancellationToken,
) -> Result<StageDone, RunError> {
    let filter = FileFilter::new(&options);
    let mut sent = 0usize;
    for root in roots {
        let packages = tokio::task::spawn_blocking(move || expand_root(&root)).await??;
        for package in packages {
            let candidates = if is_dir(&package).await {
                list_files(&package).await?
            } else {
                vec![package]
            };
            for path in candidates {
                if let Some(reason) = filter.skip_reason(&path) {
                    debug!("skipping {}: {:?}", path.display(), reason);
                    continue;
                }
                tokio::select! {
                    _ = token.cancelled() => return Ok(StageDone::Discovery { files: sent }),
                    res = tx.send(path) => {
                        if res.is_err() {
                            return Ok(StageDone::Discovery { files: sent });
                        }
                    }
                }
                sent += 1;
            }
        }
    }
    debug!("discovery done, {} files queued", sent);
    Ok(StageDone::Discovery { files: sent })
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Non-directory entries of `dir`, sorted by name.
async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, RunError> {
    let io_err = |source| RunError::Discover {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        if !entry.file_type().await.map_err(io_err)?.is_dir() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

async fn work(
    id: usize,
    options: Arc<VerifyOptions>,
    rx: Receiver<PathBuf>,
    tx: Sender<VerificationError>,
    token: CancellationToken,
) -> Result<StageDone, RunError> {
    let verifier = Verifier::new(&options);
    loop {
        let path = tokio::select! {
            _ = token.cancelled() => break,
            next = rx.recv() => match next {
                Ok(path) => path,
                Err(_) => break,
            },
        };
        let bytes = tokio::fs::read(&path).await.map_err(|source| RunError::Read {
            path: path.clone(),
            source,
        })?;
        match verifier.verify_bytes(&bytes) {
            Ok(verdict) => debug!("worker {}: {} ok ({:?})", id, path.display(), verdict),
            Err(failure) => {
                let err = VerificationError {
                    file_path: path.to_string_lossy().into_owned(),
                    message: failure.to_string(),
                };
                if tx.send(err).await.is_err() {
                    break;
                }
            }
        }
    }
    Ok(StageDone::Worker)
}

async fn aggregate(
    rx: Receiver<VerificationError>,
    reporter: Arc<dyn Reporter>,
    token: CancellationToken,
) -> Result<StageDone, RunError> {
    let mut failed = 0usize;
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            next = rx.recv() => match next {
                Ok(err) => {
                    reporter.report(&err);
                    failed += 1;
                }
                Err(_) => break,
            },
        }
    }
    Ok(StageDone::Aggregator { failed })
}
