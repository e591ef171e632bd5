//! Cluster topology types
//!
//! The views of regions and stores the balancer works against. They are
//! produced by the host's topology layer.

use serde::{Deserialize, Serialize};

use crate::{PeerId, RegionId, StoreId};

/// A replica of a region on one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: PeerId,
    pub store_id: StoreId,
}

/// A contiguous key-range shard and its replicas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub id: RegionId,
    #[serde(with = "crate::hex_key")]
    pub start_key: Vec<u8>,
    #[serde(with = "crate::hex_key")]
    pub end_key: Vec<u8>,
    /// Current leader replica, if one is elected
    #[serde(default)]
    pub leader: Option<PeerInfo>,
    /// All replicas, leader included
    #[serde(default)]
    pub peers: Vec<PeerInfo>,
}

impl RegionInfo {
    /// Create a region with no replicas
    pub fn new(id: RegionId, start_key: impl Into<Vec<u8>>, end_key: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            start_key: start_key.into(),
            end_key: end_key.into(),
            leader: None,
            peers: Vec::new(),
        }
    }

    /// Add a replica on a store
    pub fn with_peer(mut self, peer_id: PeerId, store_id: StoreId) -> Self {
        self.peers.push(PeerInfo {
            id: peer_id,
            store_id,
        });
        self
    }

    /// Mark the replica on `store_id` as leader, adding it if missing
    pub fn with_leader(mut self, peer_id: PeerId, store_id: StoreId) -> Self {
        let peer = PeerInfo {
            id: peer_id,
            store_id,
        };
        if !self.peers.iter().any(|p| p.store_id == store_id) {
            self.peers.push(peer);
        }
        self.leader = Some(peer);
        self
    }

    /// Store currently holding the leader
    pub fn leader_store_id(&self) -> Option<StoreId> {
        self.leader.map(|p| p.store_id)
    }

    /// Replica on the given store
    pub fn store_peer(&self, store_id: StoreId) -> Option<&PeerInfo> {
        self.peers.iter().find(|p| p.store_id == store_id)
    }
}

/// A storage node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub id: StoreId,
    pub address: String,
    #[serde(default = "default_up")]
    pub is_up: bool,
}

fn default_up() -> bool {
    true
}

impl StoreInfo {
    pub fn new(id: StoreId, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
            is_up: true,
        }
    }
}
