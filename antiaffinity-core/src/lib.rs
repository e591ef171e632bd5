//! Anti-Affinity Core Library
//!
//! Core abstractions for anti-affinity leader balancing.
//! This crate provides:
//! - Anti-rules: key ranges whose region leaders should be spread across stores
//! - Region, peer and store views of the cluster topology
//! - Common types and error handling

pub mod error;
pub mod region;
pub mod rule;

pub use error::{AntiAffinityError, Result};
pub use region::{PeerInfo, RegionInfo, StoreInfo};
pub use rule::AntiRule;

/// Anti-rule identifier
pub type RuleId = u64;
/// Region (shard) identifier
pub type RegionId = u64;
/// Storage node identifier
pub type StoreId = u64;
/// Replica identifier
pub type PeerId = u64;

/// Serde adapter storing raw keys as hex strings
pub mod hex_key {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(D::Error::custom)
    }
}
