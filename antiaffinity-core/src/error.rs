//! Error types for anti-affinity balancing
//!
//! Provides a unified error type for rule and score operations.

use thiserror::Error;

/// Result type alias for anti-affinity operations
pub type Result<T> = std::result::Result<T, AntiAffinityError>;

/// Unified error type for anti-affinity operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AntiAffinityError {
    // ===== Rule Errors =====
    #[error("Invalid anti-rule: {0}")]
    InvalidRule(String),

    #[error("{field} is not in hex format: {value}")]
    DecodeFailure { field: &'static str, value: String },

    // ===== Score Errors =====
    #[error("Anti-score not found: rule {rule_id}, store {store_id}")]
    ScoreNotFound { rule_id: u64, store_id: u64 },
}
