// src/session.rs
//! Concurrent processing of a fixed list of files
//!
//! One tokio task per path, optionally capped by a semaphore. Each task
//! bumps exactly one of two atomic counters when it finishes, so
//! `done + errored <= total` holds at every observation point and
//! [`ProcessingSession::summary`] can be read while a run is in flight.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::SessionConfig;
use crate::enums::{Mode, Scheme};
use crate::error::{CoreError, Result};
use crate::file_ops::{decrypt_file, encrypt_file};
use crate::keys::KeyStore;

/// Knobs for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Maximum files in flight; `None` spawns everything at once
    pub concurrency: Option<usize>,
    /// Upper bound of the simulated per-file delay in dry-run mode
    pub dry_run_max_delay: Duration,
    /// Envelope used for encryption
    pub scheme: Scheme,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionConfig::default().settings()
    }
}

/// One unit of work: a single path in a given direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    pub mode: Mode,
    pub dry_run: bool,
}

/// Key material loaded once per run and shared read-only by every task
#[derive(Clone)]
enum SharedKey {
    Public(Arc<RsaPublicKey>),
    Private(Arc<RsaPrivateKey>),
}

impl SharedKey {
    fn load(mode: Mode, keys: &KeyStore) -> Result<Self> {
        Ok(match mode {
            Mode::Encrypt => SharedKey::Public(Arc::new(keys.load_public()?)),
            Mode::Decrypt => SharedKey::Private(Arc::new(keys.load_private()?)),
        })
    }

    fn transform(&self, path: &Path, mode: Mode, scheme: Scheme) -> Result<u64> {
        match (mode, self) {
            (Mode::Encrypt, SharedKey::Public(key)) => encrypt_file(path, key, scheme),
            (Mode::Decrypt, SharedKey::Private(key)) => decrypt_file(path, key),
            _ => Err(CoreError::Config(format!("no {mode} key loaded"))),
        }
    }
}

impl FileTask {
    async fn execute(self, key: Option<SharedKey>, settings: &SessionSettings) -> Result<u64> {
        if self.dry_run {
            tokio::time::sleep(random_delay(settings.dry_run_max_delay)).await;
            info!(path = %self.path.display(), "dry run, not actually processing file");
            return Ok(0);
        }

        let key = key.ok_or_else(|| CoreError::Config(format!("no {} key loaded", self.mode)))?;
        let scheme = settings.scheme;
        tokio::task::spawn_blocking(move || key.transform(&self.path, self.mode, scheme))
            .await
            .map_err(|e| CoreError::Task(e.to_string()))?
    }
}

fn random_delay(max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub total: usize,
    pub done: usize,
    pub errored: usize,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} of {} files. Failed: {}",
            self.done, self.total, self.errored
        )
    }
}

/// What a finished run looked like
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub dry_run: bool,
    #[serde(flatten)]
    pub status: StatusSnapshot,
    pub elapsed: Duration,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {:?})", self.status, self.elapsed)
    }
}

#[derive(Debug, Default)]
struct Counters {
    done: AtomicUsize,
    errored: AtomicUsize,
}

impl Counters {
    fn record(&self, path: &Path, outcome: Result<u64>, elapsed: Duration) {
        match outcome {
            Ok(bytes) => {
                self.done.fetch_add(1, Ordering::Relaxed);
                info!(path = %path.display(), bytes, ?elapsed, "processed file");
            }
            Err(e) => {
                self.errored.fetch_add(1, Ordering::Relaxed);
                warn!(
                    path = %path.display(),
                    kind = ?e.kind(),
                    error = %e,
                    "failed to process file"
                );
            }
        }
    }
}

/// A fixed set of target paths and the progress made on them
#[derive(Debug)]
pub struct ProcessingSession {
    paths: Vec<PathBuf>,
    total: usize,
    counters: Arc<Counters>,
    started: AtomicBool,
}

impl ProcessingSession {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let total = paths.len();
        Self {
            paths,
            total,
            counters: Arc::default(),
            started: AtomicBool::new(false),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Transform every path and wait for all of them.
    ///
    /// Per-file failures are logged and counted, never propagated. The key
    /// for `mode` is loaded once up front; if that fails every path counts
    /// as errored. A session runs at most once.
    pub async fn run(
        &self,
        mode: Mode,
        dry_run: bool,
        keys: &KeyStore,
        settings: &SessionSettings,
    ) -> Result<RunReport> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CoreError::Config("session has already been run".into()));
        }

        let started = Instant::now();
        info!(
            %mode,
            dry_run,
            total = self.total,
            concurrency = ?settings.concurrency,
            scheme = %settings.scheme,
            "start processing"
        );

        let key = if dry_run {
            None
        } else {
            match SharedKey::load(mode, keys) {
                Ok(key) => Some(key),
                Err(e) => {
                    error!(%mode, kind = ?e.kind(), error = %e, "failed to load key, no file can be processed");
                    self.counters.errored.fetch_add(self.total, Ordering::Relaxed);
                    return Ok(self.report(mode, dry_run, started.elapsed()));
                }
            }
        };

        let limiter = settings.concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
        let mut tasks = JoinSet::new();

        for path in &self.paths {
            // Backpressure: wait for a free slot before spawning the next file
            let permit = match &limiter {
                Some(sem) => sem.clone().acquire_owned().await.ok(),
                None => None,
            };

            let task = FileTask {
                path: path.clone(),
                mode,
                dry_run,
            };
            let key = key.clone();
            let counters = self.counters.clone();
            let settings = settings.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let task_started = Instant::now();
                let path = task.path.clone();
                let outcome = task.execute(key, &settings).await;
                counters.record(&path, outcome, task_started.elapsed());
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                self.counters.errored.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "file task aborted");
            }
        }

        let report = self.report(mode, dry_run, started.elapsed());
        info!(elapsed = ?report.elapsed, "processed all files");
        Ok(report)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            total: self.total,
            done: self.counters.done.load(Ordering::Relaxed),
            errored: self.counters.errored.load(Ordering::Relaxed),
        }
    }

    /// Human-readable progress; safe to call while `run` is in flight
    pub fn summary(&self) -> String {
        self.snapshot().to_string()
    }

    fn report(&self, mode: Mode, dry_run: bool, elapsed: Duration) -> RunReport {
        RunReport {
            mode,
            dry_run,
            status: self.snapshot(),
            elapsed,
        }
    }
}
