//! Anti-rule manager
//!
//! Holds the anti-rules and the indices derived from balancing decisions:
//! per-rule leader counts per store, and the store each region's leader was
//! last moved to. Everything sits behind one reader/writer lock.

use antiaffinity_core::{AntiAffinityError, AntiRule, RegionId, Result, RuleId, StoreId};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Leader counts per store for one rule, ordered by store id
pub type StoreScores = BTreeMap<StoreId, u64>;

#[derive(Default)]
struct ManagerState {
    /// Rules in insertion order
    rules: Vec<AntiRule>,

    /// rule id -> store id -> leaders attributed to that store
    scores: HashMap<RuleId, StoreScores>,

    /// region id -> store the leader was last moved to
    leader_locations: HashMap<RegionId, StoreId>,
}

/// Lifecycle owner of all anti-rules and their scores
#[derive(Default)]
pub struct AntiRuleManager {
    state: RwLock<ManagerState>,
}

impl AntiRuleManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    ///
    /// The range is checked again here so no inverted rule can enter the
    /// list. Duplicate ids are accepted; matching always uses the first.
    pub fn add_rule(&self, rule: AntiRule) -> Result<()> {
        rule.validate()?;

        let mut state = self.state.write();
        info!(rule = %rule, total = state.rules.len() + 1, "Anti-rule added");
        state.rules.push(rule);
        Ok(())
    }

    /// Snapshot of all rules in insertion order
    pub fn rules(&self) -> Vec<AntiRule> {
        self.state.read().rules.clone()
    }

    /// First rule, in insertion order, accepted by `pred`
    pub fn find_rule<F>(&self, mut pred: F) -> Option<AntiRule>
    where
        F: FnMut(&AntiRule) -> bool,
    {
        self.state.read().rules.iter().find(|r| pred(r)).cloned()
    }

    /// Number of rules
    pub fn rule_count(&self) -> usize {
        self.state.read().rules.len()
    }

    /// Snapshot of the score table for a rule (empty if never scored)
    pub fn scores_for_rule(&self, rule_id: RuleId) -> StoreScores {
        self.state
            .read()
            .scores
            .get(&rule_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Attribute one more leader to `store_id` under `rule_id`
    pub fn increment_score(&self, rule_id: RuleId, store_id: StoreId) {
        let mut state = self.state.write();
        let score = state
            .scores
            .entry(rule_id)
            .or_default()
            .entry(store_id)
            .or_insert(0);
        *score += 1;
        debug!(rule_id, store_id, score = *score, "Anti-score incremented");
    }

    /// Take one leader away from `store_id` under `rule_id`.
    ///
    /// Fails without touching the table when the rule or store has no entry,
    /// or when the count is already zero.
    pub fn decrement_score(&self, rule_id: RuleId, store_id: StoreId) -> Result<()> {
        let mut state = self.state.write();
        let score = state
            .scores
            .get_mut(&rule_id)
            .and_then(|stores| stores.get_mut(&store_id))
            .filter(|score| **score > 0)
            .ok_or(AntiAffinityError::ScoreNotFound { rule_id, store_id })?;
        *score -= 1;
        debug!(rule_id, store_id, score = *score, "Anti-score decremented");
        Ok(())
    }

    /// Record the store a region's leader was moved to
    pub fn set_leader_location(&self, region_id: RegionId, store_id: StoreId) {
        self.state.write().leader_locations.insert(region_id, store_id);
    }

    /// Store a region's leader was last moved to, if any
    pub fn get_leader_location(&self, region_id: RegionId) -> Option<StoreId> {
        self.state.read().leader_locations.get(&region_id).copied()
    }

    /// Number of regions with a recorded leader location
    pub fn leader_location_count(&self) -> usize {
        self.state.read().leader_locations.len()
    }
}
