//! Anti-affinity rules
//!
//! An anti-rule names a key range `[start_key, end_key)` over which region
//! leaders should be spread evenly across stores.

use serde::{Deserialize, Serialize};

use crate::error::{AntiAffinityError, Result};
use crate::region::RegionInfo;
use crate::RuleId;

/// An operator-declared key range for leader balancing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiRule {
    /// Caller-supplied rule handle (not checked for uniqueness)
    pub id: RuleId,
    /// Inclusive start of the range
    #[serde(with = "crate::hex_key")]
    pub start_key: Vec<u8>,
    /// Exclusive end of the range
    #[serde(with = "crate::hex_key")]
    pub end_key: Vec<u8>,
}

impl AntiRule {
    /// Create a rule from raw keys, validating the range
    pub fn new(
        id: RuleId,
        start_key: impl Into<Vec<u8>>,
        end_key: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let rule = Self {
            id,
            start_key: start_key.into(),
            end_key: end_key.into(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Create a rule from hex-encoded keys
    ///
    /// This is the only place request keys are decoded.
    pub fn from_hex(id: RuleId, start_key_hex: &str, end_key_hex: &str) -> Result<Self> {
        let start_key = hex::decode(start_key_hex).map_err(|_| AntiAffinityError::DecodeFailure {
            field: "start key",
            value: start_key_hex.to_string(),
        })?;
        let end_key = hex::decode(end_key_hex).map_err(|_| AntiAffinityError::DecodeFailure {
            field: "end key",
            value: end_key_hex.to_string(),
        })?;
        Self::new(id, start_key, end_key)
    }

    /// Check the range invariant: end key is empty or strictly after start key
    pub fn validate(&self) -> Result<()> {
        if !self.end_key.is_empty() && self.end_key <= self.start_key {
            return Err(AntiAffinityError::InvalidRule(format!(
                "end key {} should be greater than start key {}",
                hex::encode(&self.end_key),
                hex::encode(&self.start_key)
            )));
        }
        Ok(())
    }

    /// Whether the region's key range lies entirely inside this rule.
    ///
    /// Regions with an empty start or end key never match, and a rule with an
    /// empty end key only matches regions whose end key is also empty, which
    /// the first condition already excludes.
    pub fn covers(&self, region: &RegionInfo) -> bool {
        if region.start_key.is_empty() || region.end_key.is_empty() {
            return false;
        }
        self.start_key <= region.start_key && self.end_key >= region.end_key
    }
}

impl std::fmt::Display for AntiRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AntiRule(id={}, [{}, {}))",
            self.id,
            hex::encode(&self.start_key),
            hex::encode(&self.end_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn region(start: &[u8], end: &[u8]) -> RegionInfo {
        RegionInfo::new(1, start.to_vec(), end.to_vec())
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(AntiRule::new(1, b"a".to_vec(), b"z".to_vec()).is_ok());
        assert!(matches!(
            AntiRule::new(1, b"z".to_vec(), b"a".to_vec()),
            Err(AntiAffinityError::InvalidRule(_))
        ));
        // Equal keys describe an empty range
        assert!(AntiRule::new(1, b"m".to_vec(), b"m".to_vec()).is_err());
    }

    #[test]
    fn test_empty_end_key_is_unbounded() {
        assert!(AntiRule::new(1, b"m".to_vec(), Vec::new()).is_ok());
        assert!(AntiRule::new(1, Vec::new(), Vec::new()).is_ok());
    }

    #[test]
    fn test_from_hex() {
        let rule = AntiRule::from_hex(3, "61", "7a").unwrap();
        assert_eq!(rule.start_key, b"a");
        assert_eq!(rule.end_key, b"z");

        let err = AntiRule::from_hex(3, "zz", "7a").unwrap_err();
        assert_eq!(
            err,
            AntiAffinityError::DecodeFailure {
                field: "start key",
                value: "zz".to_string()
            }
        );
        assert!(matches!(
            AntiRule::from_hex(3, "61", "7"),
            Err(AntiAffinityError::DecodeFailure { field: "end key", .. })
        ));
        assert!(matches!(
            AntiRule::from_hex(3, "7a", "61"),
            Err(AntiAffinityError::InvalidRule(_))
        ));
    }

    #[test]
    fn test_covers() {
        let rule = AntiRule::new(1, b"a".to_vec(), b"z".to_vec()).unwrap();
        assert!(rule.covers(&region(b"b", b"c")));
        assert!(rule.covers(&region(b"a", b"z")));
        assert!(!rule.covers(&region(b"0", b"c")));
        assert!(!rule.covers(&region(b"y", b"zz")));
        assert!(!rule.covers(&region(b"", b"c")));
        assert!(!rule.covers(&region(b"b", b"")));
    }

    #[test]
    fn test_unbounded_rule_never_covers() {
        let rule = AntiRule::new(1, b"a".to_vec(), Vec::new()).unwrap();
        assert!(!rule.covers(&region(b"b", b"c")));
    }

    #[test]
    fn test_json_uses_hex_keys() {
        let rule = AntiRule::new(9, b"a".to_vec(), b"z".to_vec()).unwrap();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 9, "start_key": "61", "end_key": "7a"})
        );
        let back: AntiRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    proptest! {
        #[test]
        fn prop_non_empty_end_valid_iff_greater(
            start in proptest::collection::vec(any::<u8>(), 0..8),
            end in proptest::collection::vec(any::<u8>(), 1..8),
        ) {
            let result = AntiRule::new(1, start.clone(), end.clone());
            prop_assert_eq!(result.is_ok(), end > start);
        }
    }
}
