//! Per-document resolution runtime.
//!
//! Resolution is CPU-bound and synchronous. When many uploaded documents need
//! resolving at once, this module runs them on a small bounded pool of named
//! worker threads. Every job resolves one document in isolation; workers
//! share only the read-only [`EntityResolver`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, warn};

use crate::error::{CastlistError, CastlistResult, ExecutionError};
use crate::mention::RawMention;
use crate::resolver::{EntityResolver, Resolution};
use crate::storage::DocumentId;

/// Runtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued jobs.
    pub queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 64,
        }
    }
}

enum Job {
    Resolve {
        document_id: DocumentId,
        mentions: Vec<RawMention>,
        reply: Sender<Resolution>,
    },

    #[cfg(test)]
    Block {
        started: Sender<()>,
        release: Receiver<()>,
    },
}

struct WorkerPool {
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

fn run_worker(rx: &Receiver<Job>, resolver: &EntityResolver) {
    while let Ok(job) = rx.recv() {
        match job {
            Job::Resolve {
                document_id,
                mentions,
                reply,
            } => {
                debug!(document = %document_id, mentions = mentions.len(), "resolving document");
                let resolution = resolver.resolve_detailed(&mentions);
                let _ = reply.send(resolution);
            }

            #[cfg(test)]
            Job::Block { started, release } => {
                let _ = started.send(());
                let _ = release.recv();
            }
        }
    }
}

impl WorkerPool {
    fn start(
        workers: usize,
        queue_capacity: usize,
        resolver: &Arc<EntityResolver>,
    ) -> Result<Self, ExecutionError> {
        let workers = workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        // Built incrementally so a failed spawn still joins the threads
        // already started when `pool` is dropped.
        let mut pool = Self {
            tx: Some(tx),
            workers: Vec::with_capacity(workers),
            queue_capacity,
        };
        for idx in 0..workers {
            let rx = rx.clone();
            let resolver = Arc::clone(resolver);
            let handle = thread::Builder::new()
                .name(format!("castlist-worker-{idx}"))
                .spawn(move || run_worker(&rx, &resolver))
                .map_err(|e| ExecutionError::WorkerSpawn {
                    message: e.to_string(),
                })?;
            pool.workers.push(handle);
        }
        Ok(pool)
    }

    fn try_submit(&self, job: Job) -> Result<(), ExecutionError> {
        let tx = self.tx.as_ref().ok_or(ExecutionError::Disconnected)?;
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(capacity = self.queue_capacity, "resolution queue full");
                Err(ExecutionError::QueueFull {
                    capacity: self.queue_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(ExecutionError::Disconnected),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain queued jobs, then exit.
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Handle returned by [`ResolutionRuntime::submit`].
#[derive(Debug)]
pub struct ResolutionHandle {
    document_id: DocumentId,
    rx: Receiver<Resolution>,
}

impl ResolutionHandle {
    /// Returns the document being resolved.
    #[must_use]
    pub const fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// Waits for the resolution to complete.
    pub fn join(self) -> CastlistResult<Resolution> {
        self.rx
            .recv()
            .map_err(|_| CastlistError::Execution(ExecutionError::Disconnected))
    }

    /// Waits for the resolution to complete with a timeout.
    pub fn join_timeout(self, timeout: Duration) -> CastlistResult<Resolution> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => CastlistError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => {
                CastlistError::Execution(ExecutionError::Disconnected)
            }
        })
    }
}

/// Bounded worker pool resolving documents independently.
///
/// Dropping the runtime closes the queue, lets workers finish what is already
/// queued and joins them.
pub struct ResolutionRuntime {
    resolver: Arc<EntityResolver>,
    pool: WorkerPool,
}

impl ResolutionRuntime {
    /// Starts a runtime around a resolver.
    pub fn new(resolver: EntityResolver, config: RuntimeConfig) -> CastlistResult<Self> {
        Self::with_shared(Arc::new(resolver), config)
    }

    /// Starts a runtime around a resolver that is also used elsewhere.
    pub fn with_shared(
        resolver: Arc<EntityResolver>,
        config: RuntimeConfig,
    ) -> CastlistResult<Self> {
        let pool = WorkerPool::start(config.workers, config.queue_capacity, &resolver)?;
        Ok(Self { resolver, pool })
    }

    /// Queues a document for resolution. Fails fast with `QueueFull` when
    /// the queue is at capacity.
    pub fn submit(
        &self,
        document_id: DocumentId,
        mentions: Vec<RawMention>,
    ) -> CastlistResult<ResolutionHandle> {
        let (reply, rx) = bounded::<Resolution>(1);
        self.pool.try_submit(Job::Resolve {
            document_id,
            mentions,
            reply,
        })?;
        Ok(ResolutionHandle { document_id, rx })
    }

    /// Resolves a document on the pool and waits for the result.
    pub fn resolve(
        &self,
        document_id: DocumentId,
        mentions: Vec<RawMention>,
    ) -> CastlistResult<Resolution> {
        self.submit(document_id, mentions)?.join()
    }

    /// Returns the shared resolver.
    #[must_use]
    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.workers.len()
    }

    #[cfg(test)]
    fn block_worker(&self) -> Result<Sender<()>, ExecutionError> {
        let (started_tx, started_rx) = bounded::<()>(1);
        let (release_tx, release_rx) = bounded::<()>(1);
        self.pool.try_submit(Job::Block {
            started: started_tx,
            release: release_rx,
        })?;
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .map_err(|_| ExecutionError::Disconnected)?;
        Ok(release_tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;

    fn runtime(workers: usize, queue_capacity: usize) -> ResolutionRuntime {
        let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
        ResolutionRuntime::new(
            resolver,
            RuntimeConfig {
                workers,
                queue_capacity,
            },
        )
        .unwrap()
    }

    fn names(mentions: &[&str]) -> Vec<RawMention> {
        mentions.iter().map(|n| RawMention::new(*n)).collect()
    }

    #[test]
    fn test_documents_resolve_independently() {
        let rt = runtime(2, 8);
        let a = rt.submit(DocumentId::new(), names(&["Lena", "Vladilena Milizé"])).unwrap();
        let b = rt.submit(DocumentId::new(), names(&["Aragorn", "Legolas"])).unwrap();

        let a = a.join().unwrap();
        let b = b.join().unwrap();
        assert_eq!(a.characters.len(), 1);
        assert_eq!(b.characters.len(), 2);
    }

    #[test]
    fn test_zero_workers_is_clamped() {
        let rt = runtime(0, 0);
        assert_eq!(rt.workers(), 1);
        let res = rt.resolve(DocumentId::new(), names(&["Kurena"])).unwrap();
        assert_eq!(res.characters[0].name, "Kurena");
    }

    #[test]
    fn test_full_queue_fails_fast() {
        let rt = runtime(1, 1);
        let release = rt.block_worker().unwrap();

        let queued = rt.submit(DocumentId::new(), names(&["Theo"])).unwrap();
        let err = rt.submit(DocumentId::new(), names(&["Raiden"])).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            CastlistError::Execution(ExecutionError::QueueFull { capacity: 1 })
        ));

        release.send(()).unwrap();
        assert_eq!(queued.join().unwrap().characters[0].name, "Theo");
    }

    #[test]
    fn test_join_timeout_reports_timeout_while_worker_busy() {
        let rt = runtime(1, 4);
        let release = rt.block_worker().unwrap();

        let handle = rt.submit(DocumentId::new(), names(&["Anju"])).unwrap();
        let err = handle.join_timeout(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(
            err,
            CastlistError::Execution(ExecutionError::Timeout { duration_ms: 10 })
        ));
        release.send(()).unwrap();
    }

    #[test]
    fn test_join_reports_disconnected_when_reply_sender_dropped() {
        let (tx, rx) = bounded::<Resolution>(1);
        drop(tx);
        let handle = ResolutionHandle {
            document_id: DocumentId::new(),
            rx,
        };
        assert!(matches!(
            handle.join(),
            Err(CastlistError::Execution(ExecutionError::Disconnected))
        ));
    }

    #[test]
    fn test_drop_drains_queued_jobs() {
        let rt = runtime(1, 8);
        let doc = DocumentId::new();
        let handle = rt.submit(doc, names(&["Shinei Nouzen", "Shin"])).unwrap();
        drop(rt);

        assert_eq!(handle.document_id(), doc);
        let res = handle.join().unwrap();
        assert_eq!(res.characters.len(), 1);
    }
}
