//! Concurrent manifest generation.
//!
//! Every source is opened and scanned as its own unit of work on a
//! dedicated thread pool sized by [`BuildOptions::concurrency`], so the
//! number of open files and in-flight parses never exceeds the pool size.
//! Outcomes come back over a bounded channel holding at most
//! `min(sources, MAX_BUFFERED_RESULTS)` unread results, and the caller
//! drains exactly one outcome per source.
//!
//! Failures are contained per source: they are logged and returned in
//! [`BuildReport::errors`], and the manifest covers every source that
//! succeeded.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossbeam::channel;
use thiserror::Error;

use super::normalize::PathNormalizer;
use super::walk::unique;
use super::Manifest;
use crate::asset::{Asset, ScanError, ScanOptions, scan_reader};
use crate::logger::ProgressLine;
use crate::{debug, log};

/// Upper bound on completed-but-unread results.
pub const MAX_BUFFERED_RESULTS: usize = 100;

/// Batch generation settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Scan workers; `0` uses the available parallelism.
    pub concurrency: usize,
    pub scan: ScanOptions,
    /// Show a progress counter on stderr.
    pub progress: bool,
}

impl BuildOptions {
    fn workers(&self) -> usize {
        if self.concurrency > 0 {
            return self.concurrency;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

/// Failure of a single source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{}: {error}", path.display())]
    Open { path: PathBuf, error: std::io::Error },

    #[error("{}: {error}", path.display())]
    Scan { path: PathBuf, error: ScanError },
}

impl SourceError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::Scan { path, .. } => path,
        }
    }
}

/// Result of a batch build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub errors: Vec<SourceError>,
}

struct Outcome {
    index: usize,
    result: Result<Vec<Asset>, SourceError>,
}

/// Build a manifest by scanning `sources` concurrently.
///
/// Repeated sources are scanned once. When two sources normalize to the
/// same key, the one later in `sources` wins.
pub fn build_manifest(
    sources: &[PathBuf],
    normalizer: &PathNormalizer,
    options: &BuildOptions,
) -> Result<BuildReport> {
    let sources = unique(sources.to_vec());
    let total = sources.len();
    let mut report = BuildReport::default();

    if total == 0 {
        return Ok(report);
    }

    let workers = options.workers();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("preload-scan-{i}"))
        .build()
        .context("failed to create scan thread pool")?;

    debug!("generate"; "scanning {} sources with {} workers", total, workers);

    let progress = options
        .progress
        .then(|| ProgressLine::new("generate", &[("scan", total)]));

    let scan = options.scan;
    let (tx, rx) = channel::bounded::<Outcome>(total.min(MAX_BUFFERED_RESULTS));
    let mut scanned: Vec<Option<Vec<Asset>>> = (0..total).map(|_| None).collect();

    pool.in_place_scope(|scope| {
        for (index, path) in sources.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = scan_source(path, scan);
                // Receiver outlives every worker.
                let _ = tx.send(Outcome { index, result });
            });
        }
        // Only worker clones remain, so a panicking worker cannot hang the drain.
        drop(tx);

        for _ in 0..total {
            let Ok(outcome) = rx.recv() else {
                break;
            };
            if let Some(progress) = &progress {
                progress.inc("scan");
            }
            match outcome.result {
                Ok(assets) => scanned[outcome.index] = Some(assets),
                Err(err) => {
                    log!("generate"; "{}", err);
                    report.errors.push(err);
                }
            }
        }
    });

    if let Some(progress) = progress {
        progress.finish();
    }

    for (path, assets) in sources.iter().zip(scanned) {
        let Some(assets) = assets else { continue };
        let key = normalizer.normalize(path);
        if report.manifest.insert(key.clone(), assets).is_some() {
            debug!("generate"; "{} overrides an earlier source for `{}`", path.display(), key);
        }
    }

    Ok(report)
}

/// Open one source and scan it.
fn scan_source(path: &Path, options: ScanOptions) -> Result<Vec<Asset>, SourceError> {
    let file = File::open(path).map_err(|error| SourceError::Open {
        path: path.to_path_buf(),
        error,
    })?;
    scan_reader(BufReader::new(file), options).map_err(|error| SourceError::Scan {
        path: path.to_path_buf(),
        error,
    })
}
