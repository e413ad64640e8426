//! Proof push tick scheduler.

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use keeper_blockchain::TransactionHandle;
use keeper_domain::{CalendarPolicy, Catalog, MonitoredSet, PairId, partition};
use keeper_observability::{
    record_batch_submitted, record_batches_dropped, record_eligible_pairs, record_task_cadence,
    record_tick,
};
use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{ProofPushConfig, ProofPushDeps};
use crate::{
    periodic::runner::run_with_shutdown,
    services::{RetryingProofFetcher, RetryingProofSubmitter, TickError},
};

const TASK_NAME: &str = "proof_push";
/// Pair ids listed in the per-batch success log.
const LOGGED_PAIRS_SAMPLE: usize = 5;

#[derive(Debug)]
pub(crate) enum TickOutcome {
    /// Another tick was still running.
    Skipped,
    /// No monitored pair was tradable at the tick instant.
    NoEligiblePairs,
    Completed { batches: usize, pairs: usize },
    Aborted(TickError),
}

impl TickOutcome {
    fn status(&self) -> &'static str {
        match self {
            TickOutcome::Skipped => "skipped",
            TickOutcome::NoEligiblePairs => "no_eligible_pairs",
            TickOutcome::Completed { .. } => "completed",
            TickOutcome::Aborted(_) => "aborted",
        }
    }
}

/// Marks the scheduler busy for as long as it lives.
struct TickGuard<'a>(&'a AtomicBool);

impl<'a> TickGuard<'a> {
    fn try_begin_tick(busy: &'a AtomicBool) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(busy))
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub(crate) struct ProofPushTask {
    catalog: Arc<Catalog>,
    monitored: MonitoredSet,
    calendar: CalendarPolicy,
    fetcher: RetryingProofFetcher,
    submitter: RetryingProofSubmitter,
    config: ProofPushConfig,
    busy: AtomicBool,
    /// Ticks in a row that took longer than the interval.
    consecutive_overruns: AtomicUsize,
}

impl ProofPushTask {
    pub(crate) fn new(deps: ProofPushDeps, config: ProofPushConfig) -> Self {
        Self {
            catalog: deps.catalog,
            monitored: deps.monitored,
            calendar: deps.calendar,
            fetcher: RetryingProofFetcher::new(deps.proof_source, config.fetch_retry),
            submitter: RetryingProofSubmitter::new(deps.proof_sink, config.submit_retry),
            config,
            busy: AtomicBool::new(false),
            consecutive_overruns: AtomicUsize::new(0),
        }
    }

    pub(crate) async fn run(self, shutdown: CancellationToken) {
        if !self.config.enabled {
            tracing::info!("Proof push disabled by configuration");
            shutdown.cancelled().await;
            return;
        }

        run_with_shutdown(TASK_NAME, shutdown, || self.execute()).await;
    }

    async fn execute(&self) -> Duration {
        self.fire().await;
        let delay = self.next_delay();
        record_task_cadence(TASK_NAME, delay);
        delay
    }

    /// Interval plus a uniform random jitter.
    pub(crate) fn next_delay(&self) -> Duration {
        self.config.interval + random_between(Duration::ZERO, self.config.interval_jitter)
    }

    pub(crate) async fn fire(&self) -> TickOutcome {
        self.fire_at(Utc::now()).await
    }

    /// Run one tick as of `now`, unless one is already running.
    #[tracing::instrument(name = "periodic.proof_push", skip(self, now), fields(now = %now))]
    pub(crate) async fn fire_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let Some(_guard) = TickGuard::try_begin_tick(&self.busy) else {
            tracing::debug!("Previous tick still running; skipping");
            record_tick(TASK_NAME, TickOutcome::Skipped.status(), Duration::ZERO, None);
            return TickOutcome::Skipped;
        };

        let started = Instant::now();
        let outcome = match AssertUnwindSafe(self.run_tick(now)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let error = TickError::Unexpected(panic_message(panic.as_ref()));
                tracing::error!(error = %error, kind = error.kind(), "Tick failed");
                TickOutcome::Aborted(error)
            }
        };
        let elapsed = started.elapsed();

        let overrun = elapsed.checked_sub(self.config.interval).filter(|d| !d.is_zero());
        if overrun.is_some() {
            let consecutive = self.consecutive_overruns.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::warn!(
                elapsed_ms = elapsed.as_millis(),
                interval_ms = self.config.interval.as_millis(),
                consecutive,
                "Tick took longer than the interval"
            );
        } else {
            self.consecutive_overruns.store(0, Ordering::Release);
        }
        record_tick(TASK_NAME, outcome.status(), elapsed, overrun);

        outcome
    }

    /// Monitored pairs whose market is open at `now`, in monitored order.
    pub(crate) fn eligible_pairs(&self, now: DateTime<Utc>) -> Vec<PairId> {
        self.monitored
            .iter()
            .filter(|id| {
                self.calendar
                    .is_eligible(self.catalog.category_of(*id), now)
            })
            .collect()
    }

    async fn run_tick(&self, now: DateTime<Utc>) -> TickOutcome {
        let eligible = self.eligible_pairs(now);
        record_eligible_pairs(self.monitored.len(), eligible.len());

        if eligible.is_empty() {
            tracing::info!(
                monitored = self.monitored.len(),
                "No eligible pairs; nothing to push"
            );
            return TickOutcome::NoEligiblePairs;
        }

        let batches: Vec<&[PairId]> = partition(&eligible, self.config.batch_size).collect();
        let total = batches.len();
        tracing::debug!(
            eligible = eligible.len(),
            batches = total,
            "Pushing proofs for eligible pairs"
        );

        for (index, batch) in batches.iter().enumerate() {
            let number = index + 1;

            if let Err(error) = self.process_batch(batch, number, total).await {
                let dropped = total - number;
                record_batches_dropped(dropped);
                tracing::error!(
                    error = %error,
                    kind = error.kind(),
                    submitted_batches = index,
                    dropped_batches = dropped,
                    "Tick aborted; remaining batches wait for the next tick"
                );
                return TickOutcome::Aborted(error);
            }

            if number < total {
                tokio::time::sleep(self.batch_pause()).await;
            }
        }

        TickOutcome::Completed {
            batches: total,
            pairs: eligible.len(),
        }
    }

    async fn process_batch(
        &self,
        batch: &[PairId],
        number: usize,
        total: usize,
    ) -> Result<TransactionHandle, TickError> {
        let payload =
            self.fetcher
                .fetch_proof(batch)
                .await
                .map_err(|source| TickError::ProofFetch {
                    batch: number,
                    batches: total,
                    source,
                })?;

        let handle = self
            .submitter
            .submit(&payload)
            .await
            .map_err(|source| TickError::Submission {
                batch: number,
                batches: total,
                source,
            })?;

        tracing::info!(
            tx_hash = %handle,
            batch = number,
            batches = total,
            batch_size = batch.len(),
            proof_bytes = payload.len(),
            pairs = %sample_pairs(batch),
            "Proof submitted"
        );
        record_batch_submitted(batch.len());

        Ok(handle)
    }

    fn batch_pause(&self) -> Duration {
        random_between(self.config.batch_pause_min, self.config.batch_pause_max)
    }
}

fn random_between(min: Duration, max: Duration) -> Duration {
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
}

fn sample_pairs(batch: &[PairId]) -> String {
    let shown = &batch[..batch.len().min(LOGGED_PAIRS_SAMPLE)];
    let joined = PairId::join(shown);
    match batch.len() - shown.len() {
        0 => joined,
        more => format!("{} (+{} more)", joined, more),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tick panicked".to_string()
    }
}
