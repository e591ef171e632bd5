//! Scheduling operators
//!
//! An [`Operator`] is a constructed, not yet executed, scheduling action.
//! The balancer only builds leader transfers; running them belongs to the
//! host's operator controller, reached through [`OperatorSink`].

use antiaffinity_core::{RegionId, RegionInfo, StoreId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::cluster::Cluster;

/// Operator construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperatorError {
    #[error("Source and target store are both {0}")]
    SameStore(StoreId),

    #[error("Region {0} has no leader")]
    NoLeader(RegionId),

    #[error("Region {region_id} leader is on store {actual}, not {expected}")]
    LeaderMismatch {
        region_id: RegionId,
        expected: StoreId,
        actual: StoreId,
    },

    #[error("Store {0} not found")]
    StoreNotFound(StoreId),

    #[error("Store {0} is down")]
    StoreDown(StoreId),

    #[error("Region {region_id} has no peer on store {store_id}")]
    NoPeerOnStore { region_id: RegionId, store_id: StoreId },
}

impl OperatorError {
    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorError::SameStore(_) => "same_store",
            OperatorError::NoLeader(_) => "no_leader",
            OperatorError::LeaderMismatch { .. } => "leader_mismatch",
            OperatorError::StoreNotFound(_) => "store_not_found",
            OperatorError::StoreDown(_) => "store_down",
            OperatorError::NoPeerOnStore { .. } => "no_peer_on_store",
        }
    }
}

/// What an operator touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Moves leadership only
    Leader,
}

/// A single step of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpStep {
    TransferLeader {
        from_store: StoreId,
        to_store: StoreId,
    },
}

/// A scheduling action for one region
#[derive(Debug, Clone, Serialize)]
pub struct Operator {
    /// Who built it and why
    pub desc: String,
    pub region_id: RegionId,
    pub kind: OpKind,
    pub steps: Vec<OpStep>,
    pub created_at: DateTime<Utc>,
}

impl Operator {
    /// Source and target of the first leader transfer step
    pub fn transfer_leader(&self) -> Option<(StoreId, StoreId)> {
        self.steps.first().map(|step| match step {
            OpStep::TransferLeader {
                from_store,
                to_store,
            } => (*from_store, *to_store),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (region {}, {:?})", self.desc, self.region_id, self.kind)?;
        for step in &self.steps {
            match step {
                OpStep::TransferLeader {
                    from_store,
                    to_store,
                } => write!(f, " transfer leader {} -> {}", from_store, to_store)?,
            }
        }
        Ok(())
    }
}

/// Builds operators against the current cluster state
pub trait OperatorBuilder: Send + Sync {
    /// Build an operator moving `region`'s leader from `from_store` to `to_store`
    fn create_transfer_leader(
        &self,
        desc: &str,
        region: &RegionInfo,
        from_store: StoreId,
        to_store: StoreId,
        kind: OpKind,
    ) -> Result<Operator, OperatorError>;
}

impl<T: OperatorBuilder + ?Sized> OperatorBuilder for Arc<T> {
    fn create_transfer_leader(
        &self,
        desc: &str,
        region: &RegionInfo,
        from_store: StoreId,
        to_store: StoreId,
        kind: OpKind,
    ) -> Result<Operator, OperatorError> {
        (**self).create_transfer_leader(desc, region, from_store, to_store, kind)
    }
}

/// Leader transfer builder that checks the move against a [`Cluster`]
pub struct TransferLeaderBuilder<C> {
    cluster: Arc<C>,
}

impl<C: Cluster> TransferLeaderBuilder<C> {
    pub fn new(cluster: Arc<C>) -> Self {
        Self { cluster }
    }

    pub fn cluster(&self) -> &Arc<C> {
        &self.cluster
    }
}

impl<C: Cluster> OperatorBuilder for TransferLeaderBuilder<C> {
    fn create_transfer_leader(
        &self,
        desc: &str,
        region: &RegionInfo,
        from_store: StoreId,
        to_store: StoreId,
        kind: OpKind,
    ) -> Result<Operator, OperatorError> {
        if from_store == to_store {
            return Err(OperatorError::SameStore(from_store));
        }

        let leader_store = region
            .leader_store_id()
            .ok_or(OperatorError::NoLeader(region.id))?;
        if leader_store != from_store {
            return Err(OperatorError::LeaderMismatch {
                region_id: region.id,
                expected: from_store,
                actual: leader_store,
            });
        }

        let target = self
            .cluster
            .get_store(to_store)
            .ok_or(OperatorError::StoreNotFound(to_store))?;
        if !target.is_up {
            return Err(OperatorError::StoreDown(to_store));
        }

        // Leadership can only move to an existing replica
        if region.store_peer(to_store).is_none() {
            return Err(OperatorError::NoPeerOnStore {
                region_id: region.id,
                store_id: to_store,
            });
        }

        Ok(Operator {
            desc: desc.to_string(),
            region_id: region.id,
            kind,
            steps: vec![OpStep::TransferLeader {
                from_store,
                to_store,
            }],
            created_at: Utc::now(),
        })
    }
}

/// Destination for built operators
pub trait OperatorSink: Send + Sync {
    fn dispatch(&self, op: Operator);
}

/// Sink that only logs operators
#[derive(Debug, Default)]
pub struct LoggingSink;

impl OperatorSink for LoggingSink {
    fn dispatch(&self, op: Operator) {
        info!(operator = %op, "Operator dispatched");
    }
}

/// Sink that keeps operators in memory until drained
#[derive(Debug, Default)]
pub struct QueueSink {
    queue: Mutex<Vec<Operator>>,
}

impl QueueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued operator
    pub fn drain(&self) -> Vec<Operator> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl OperatorSink for QueueSink {
    fn dispatch(&self, op: Operator) {
        self.queue.lock().push(op);
    }
}
