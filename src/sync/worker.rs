use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

use super::synchronizer::MatchHistorySynchronizer;

/// A synchronization scheduled by a read path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub owner_id: String,
    pub display_name: String,
    pub tag_line: String,
}

/// Owners with a job queued or running.
#[derive(Debug, Clone, Default)]
struct PendingOwners(Arc<Mutex<HashSet<String>>>);

impl PendingOwners {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, owner_id: &str) {
        self.lock().remove(owner_id);
    }
}

/// Producer side of the background synchronization queue.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    sender: mpsc::Sender<SyncJob>,
    pending: PendingOwners,
}

impl SyncQueue {
    /// Schedule `job` without waiting.
    ///
    /// At most one job per owner is queued or running at a time, a second
    /// request for the same owner is folded into the pending one. Returns
    /// `true` when a refresh of the owner is pending afterwards, `false`
    /// when the job was dropped because the queue is full or the worker is
    /// gone.
    pub fn enqueue(&self, job: SyncJob) -> bool {
        let mut pending = self.pending.lock();
        if !pending.insert(job.owner_id.clone()) {
            debug!(owner_id = job.owner_id, "🔁 Sync already pending");
            return true;
        }

        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                pending.remove(&job.owner_id);
                warn!(owner_id = job.owner_id, "🔁 ⚠️ Sync queue full, refresh dropped");
                false
            }
            Err(TrySendError::Closed(job)) => {
                pending.remove(&job.owner_id);
                error!(owner_id = job.owner_id, "🔁 ❌ Sync worker stopped, refresh dropped");
                false
            }
        }
    }
}

/// Runs queued synchronizations one after another.
///
/// The worker stops once every [`SyncQueue`] handle has been dropped and the
/// remaining jobs are done.
pub struct SyncWorker {
    synchronizer: Arc<MatchHistorySynchronizer>,
    receiver: mpsc::Receiver<SyncJob>,
    pending: PendingOwners,
}

impl SyncWorker {
    pub fn new(synchronizer: Arc<MatchHistorySynchronizer>, capacity: usize) -> (Self, SyncQueue) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let pending = PendingOwners::default();

        (
            Self {
                synchronizer,
                receiver,
                pending: pending.clone(),
            },
            SyncQueue { sender, pending },
        )
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        info!("🔁 Sync worker started");

        while let Some(job) = self.receiver.recv().await {
            debug!(owner_id = job.owner_id, "🔁 Running queued sync");

            // Failures are logged by the synchronizer itself.
            if let Ok(report) = self
                .synchronizer
                .try_synchronize(&job.owner_id, &job.display_name, &job.tag_line)
                .await
            {
                debug!(
                    owner_id = job.owner_id,
                    match_count = report.match_count,
                    failed = report.failed_matches.len(),
                    "🔁 Queued sync done"
                );
            }

            self.pending.release(&job.owner_id);
        }

        info!("🔁 Sync worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{SyncJob, SyncWorker};
    use crate::db::{Game, Repository};
    use crate::sync::enricher::Pacing;
    use crate::sync::synchronizer::MatchHistorySynchronizer;
    use crate::sync::testing::{FakeRiotApi, match_dto, participant};

    fn job(owner_id: &str) -> SyncJob {
        SyncJob {
            owner_id: owner_id.to_string(),
            display_name: "Faker".to_string(),
            tag_line: "KR1".to_string(),
        }
    }

    #[tokio::test]
    async fn processes_queued_jobs_until_queue_is_dropped() {
        let repo = Repository::connect("sqlite::memory:").await.unwrap();
        let api = FakeRiotApi::new()
            .with_account("abc123", "Faker", "KR1")
            .with_match_ids(&["m1"])
            .with_match(
                "m1",
                match_dto(vec![participant("abc123", "Ahri", 3, true)]),
            );
        let synchronizer = Arc::new(MatchHistorySynchronizer::new(
            Arc::new(api),
            Arc::new(repo.clone()),
            Pacing::None,
        ));

        let (worker, queue) = SyncWorker::new(synchronizer, 4);
        let handle = worker.start();
        assert!(queue.enqueue(job("user42")));
        assert!(queue.enqueue(job("user43")));
        drop(queue);
        handle.await.unwrap();

        for owner in ["user42", "user43"] {
            let stored = repo
                .get_stats_record(owner, Game::League)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.match_summaries.len(), 1);
        }
    }

    #[tokio::test]
    async fn full_queue_drops_jobs() {
        let repo = Repository::connect("sqlite::memory:").await.unwrap();
        let synchronizer = Arc::new(MatchHistorySynchronizer::new(
            Arc::new(FakeRiotApi::new()),
            Arc::new(repo),
            Pacing::None,
        ));

        let (_worker, queue) = SyncWorker::new(synchronizer, 1);

        assert!(queue.enqueue(job("user42")));
        assert!(!queue.enqueue(job("user43")));
    }

    #[tokio::test]
    async fn stopped_worker_rejects_jobs() {
        let repo = Repository::connect("sqlite::memory:").await.unwrap();
        let synchronizer = Arc::new(MatchHistorySynchronizer::new(
            Arc::new(FakeRiotApi::new()),
            Arc::new(repo),
            Pacing::None,
        ));

        let (worker, queue) = SyncWorker::new(synchronizer, 1);
        drop(worker);

        assert!(!queue.enqueue(job("user42")));
    }

    #[tokio::test]
    async fn repeated_requests_for_one_owner_run_once() {
        let repo = Repository::connect("sqlite::memory:").await.unwrap();
        let api = Arc::new(
            FakeRiotApi::new()
                .with_account("abc123", "Faker", "KR1")
                .with_match_ids(&["m1"])
                .with_match(
                    "m1",
                    match_dto(vec![participant("abc123", "Ahri", 3, true)]),
                ),
        );
        let synchronizer = Arc::new(MatchHistorySynchronizer::new(
            api.clone(),
            Arc::new(repo),
            Pacing::None,
        ));

        let (worker, queue) = SyncWorker::new(synchronizer, 8);
        for _ in 0..5 {
            assert!(queue.enqueue(job("user42")));
        }
        assert!(queue.enqueue(job("user43")));
        let handle = worker.start();
        drop(queue);
        handle.await.unwrap();

        let lookups = api
            .calls()
            .iter()
            .filter(|call| call.starts_with("account:"))
            .count();
        assert_eq!(lookups, 2);
    }

    #[tokio::test]
    async fn dropped_job_can_be_requested_again() {
        let repo = Repository::connect("sqlite::memory:").await.unwrap();
        let synchronizer = Arc::new(MatchHistorySynchronizer::new(
            Arc::new(FakeRiotApi::new()),
            Arc::new(repo),
            Pacing::None,
        ));

        let (_worker, queue) = SyncWorker::new(synchronizer, 1);
        assert!(queue.enqueue(job("user42")));
        assert!(!queue.enqueue(job("user43")));

        // Still refused because the queue is full, not because it is pending.
        assert!(!queue.enqueue(job("user43")));
        assert!(queue.enqueue(job("user42")));
    }
}
