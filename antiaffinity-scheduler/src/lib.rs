//! Anti-Affinity Scheduler Library
//!
//! This crate provides leader balancing over anti-rules.
//!
//! The scheduler keeps, per anti-rule, a count of region leaders on each
//! store and moves leaders off the most loaded store:
//! - Rule and score bookkeeping (`AntiRuleManager`)
//! - Per-region evaluation (`AntiRuleChecker`)
//! - Leader transfer operators and the builder that validates them
//! - Cluster topology access

pub mod checker;
pub mod cluster;
pub mod config;
pub mod manager;
pub mod metrics;
pub mod operator;

// Re-export main types
pub use checker::{
    score_extremes, AntiRuleChecker, ScoredStore, ANTI_RULE_OPERATOR_DESC,
    DEFAULT_BALANCE_TOLERANCE,
};
pub use cluster::{Cluster, MemoryCluster, Topology, TopologyError};
pub use config::{ConfigError, SchedulerConfig};
pub use manager::{AntiRuleManager, StoreScores};
pub use operator::{
    LoggingSink, OpKind, OpStep, Operator, OperatorBuilder, OperatorError, OperatorSink,
    QueueSink, TransferLeaderBuilder,
};
