//! Balancer metrics
//!
//! Recorded through the `metrics` facade; the server installs a Prometheus
//! recorder. Without a recorder these calls are no-ops.

use metrics::{counter, gauge};

/// Record one region evaluation
pub fn record_check() {
    counter!("anti_rule_checks_total").increment(1);
}

/// Record a region matching a rule
pub fn record_rule_match(rule_id: u64) {
    counter!("anti_rule_matches_total", "rule" => rule_id.to_string()).increment(1);
}

/// Record a leader transfer operator built for a rule
pub fn record_operator_created(rule_id: u64) {
    counter!("anti_rule_operators_total", "rule" => rule_id.to_string()).increment(1);
}

/// Record a failed operator build
pub fn record_operator_failed(reason: &'static str) {
    counter!("anti_rule_operator_failures_total", "reason" => reason).increment(1);
}

/// Record a score decrement that found no entry
pub fn record_score_drift(rule_id: u64) {
    counter!("anti_rule_score_drift_total", "rule" => rule_id.to_string()).increment(1);
}

/// Record the number of configured rules
pub fn set_rule_count(count: usize) {
    gauge!("anti_rules").set(count as f64);
}
