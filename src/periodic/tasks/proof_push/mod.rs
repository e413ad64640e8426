//! Proof push
//!
//! Periodic task that keeps on-chain prices fresh. Every tick it:
//! 1. Filters the monitored pairs down to those whose market is open
//! 2. Splits the eligible pairs into bounded batches
//! 3. For each batch, fetches a proof from the proof service and submits it
//!    on-chain, pausing briefly between batches
//!
//! A failed batch ends the tick; remaining batches wait for the next tick.

mod config;
mod task;

use std::sync::Arc;

pub(crate) use config::{ProofPushConfig, ProofPushConfigRaw, RetryPolicyConfig};
use keeper_domain::{CalendarPolicy, Catalog, MonitoredSet};
pub(crate) use task::ProofPushTask;

use crate::services::{ProofSink, ProofSource};

#[derive(Clone)]
pub(crate) struct ProofPushDeps {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) monitored: MonitoredSet,
    pub(crate) calendar: CalendarPolicy,
    pub(crate) proof_source: Arc<dyn ProofSource>,
    pub(crate) proof_sink: Arc<dyn ProofSink>,
}
