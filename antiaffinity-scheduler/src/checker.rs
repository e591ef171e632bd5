//! Anti-rule checker
//!
//! Evaluates one region at a time. When the region falls inside an anti-rule
//! and its leader sits on the most loaded store for that rule, the checker
//! builds an operator moving the leader to the least loaded store.

use antiaffinity_core::{AntiRule, RegionInfo, StoreId};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::manager::{AntiRuleManager, StoreScores};
use crate::metrics;
use crate::operator::{OpKind, Operator, OperatorBuilder};

/// Description attached to operators built by the checker
pub const ANTI_RULE_OPERATOR_DESC: &str = "anti-rule";

/// Score spread at or below which a rule counts as balanced
pub const DEFAULT_BALANCE_TOLERANCE: u64 = 1;

/// A store and its score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredStore {
    pub store_id: StoreId,
    pub score: u64,
}

/// Least and most loaded stores in a score table.
///
/// Ties go to the lowest store id.
pub fn score_extremes(scores: &StoreScores) -> Option<(ScoredStore, ScoredStore)> {
    let mut iter = scores.iter();
    let (&store_id, &score) = iter.next()?;
    let mut min = ScoredStore { store_id, score };
    let mut max = min;

    for (&store_id, &score) in iter {
        if score < min.score {
            min = ScoredStore { store_id, score };
        }
        if score > max.score {
            max = ScoredStore { store_id, score };
        }
    }
    Some((min, max))
}

/// Per-region leader balancing against anti-rules
pub struct AntiRuleChecker<B> {
    manager: Arc<AntiRuleManager>,
    builder: B,
    tolerance: u64,
    name: &'static str,
}

impl<B: OperatorBuilder> AntiRuleChecker<B> {
    /// Create a checker with the default tolerance
    pub fn new(manager: Arc<AntiRuleManager>, builder: B) -> Self {
        Self::with_tolerance(manager, builder, DEFAULT_BALANCE_TOLERANCE)
    }

    /// Create a checker that tolerates a score spread of `tolerance`
    pub fn with_tolerance(manager: Arc<AntiRuleManager>, builder: B, tolerance: u64) -> Self {
        Self {
            manager,
            builder,
            tolerance,
            name: "anti-affinity-checker",
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn manager(&self) -> &Arc<AntiRuleManager> {
        &self.manager
    }

    /// First rule, in insertion order, covering the region
    pub fn matching_rule(&self, region: &RegionInfo) -> Option<AntiRule> {
        self.manager.find_rule(|rule| rule.covers(region))
    }

    /// Evaluate a region, returning a leader transfer if it should move.
    ///
    /// Scores and the leader location are updated only once the operator has
    /// been built. The two updates are not atomic with each other.
    pub fn check(&self, region: &RegionInfo) -> Option<Operator> {
        metrics::record_check();

        // Only the first covering rule is considered
        let rule = self.matching_rule(region)?;
        metrics::record_rule_match(rule.id);
        debug!(rule_id = rule.id, region_id = region.id, "Region matches anti-rule");

        let scores = self.manager.scores_for_rule(rule.id);
        let (min, max) = score_extremes(&scores)?;
        if max.score - min.score <= self.tolerance {
            debug!(
                rule_id = rule.id,
                min = min.score,
                max = max.score,
                "Anti-rule balanced"
            );
            return None;
        }

        // Some other region on the max store will be moved instead
        let leader_store = region.leader_store_id()?;
        if leader_store != max.store_id {
            return None;
        }

        let op = match self.builder.create_transfer_leader(
            ANTI_RULE_OPERATOR_DESC,
            region,
            leader_store,
            min.store_id,
            OpKind::Leader,
        ) {
            Ok(op) => op,
            Err(e) => {
                error!(
                    rule_id = rule.id,
                    region_id = region.id,
                    error = %e,
                    "Create anti-rule transfer leader operator failed"
                );
                metrics::record_operator_failed(e.kind());
                return None;
            }
        };

        // The operator is already built; drift here is logged, never undone
        if let Err(e) = self.manager.decrement_score(rule.id, leader_store) {
            warn!(rule_id = rule.id, error = %e, "Anti-score drift");
            metrics::record_score_drift(rule.id);
        }
        self.manager.increment_score(rule.id, min.store_id);
        self.manager.set_leader_location(region.id, min.store_id);
        metrics::record_operator_created(rule.id);

        info!(
            rule_id = rule.id,
            region_id = region.id,
            from_store = leader_store,
            to_store = min.store_id,
            "Transfer leader for anti-rule"
        );
        Some(op)
    }
}
