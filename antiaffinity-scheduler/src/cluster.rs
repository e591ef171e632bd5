//! Cluster topology access
//!
//! The balancer never discovers regions itself; it reads them through the
//! [`Cluster`] trait. [`MemoryCluster`] is an in-memory implementation that
//! can be loaded from a JSON topology file.

use antiaffinity_core::{RegionId, RegionInfo, StoreId, StoreInfo};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Topology loading errors
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Failed to read topology file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse topology: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read access to regions and stores
pub trait Cluster: Send + Sync {
    /// All known regions, ordered by id
    fn regions(&self) -> Vec<RegionInfo>;

    /// Look up one region
    fn get_region(&self, region_id: RegionId) -> Option<RegionInfo>;

    /// Look up one store
    fn get_store(&self, store_id: StoreId) -> Option<StoreInfo>;
}

/// Serialized cluster layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub stores: Vec<StoreInfo>,
    #[serde(default)]
    pub regions: Vec<RegionInfo>,
}

impl Topology {
    /// Load a topology from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let topology: Topology = serde_json::from_str(&data)?;
        info!(
            path = %path.as_ref().display(),
            stores = topology.stores.len(),
            regions = topology.regions.len(),
            "Loaded cluster topology"
        );
        Ok(topology)
    }
}

/// In-memory cluster view
#[derive(Default)]
pub struct MemoryCluster {
    stores: RwLock<BTreeMap<StoreId, StoreInfo>>,
    regions: RwLock<BTreeMap<RegionId, RegionInfo>>,
}

impl MemoryCluster {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cluster from a topology
    pub fn from_topology(topology: Topology) -> Self {
        let cluster = Self::new();
        for store in topology.stores {
            cluster.put_store(store);
        }
        for region in topology.regions {
            cluster.put_region(region);
        }
        cluster
    }

    /// Insert or replace a store
    pub fn put_store(&self, store: StoreInfo) {
        self.stores.write().insert(store.id, store);
    }

    /// Insert or replace a region
    pub fn put_region(&self, region: RegionInfo) {
        self.regions.write().insert(region.id, region);
    }

    /// Mark a store up or down. Returns false if the store is unknown.
    pub fn set_store_up(&self, store_id: StoreId, is_up: bool) -> bool {
        match self.stores.write().get_mut(&store_id) {
            Some(store) => {
                store.is_up = is_up;
                true
            }
            None => false,
        }
    }
}

impl Cluster for MemoryCluster {
    fn regions(&self) -> Vec<RegionInfo> {
        self.regions.read().values().cloned().collect()
    }

    fn get_region(&self, region_id: RegionId) -> Option<RegionInfo> {
        self.regions.read().get(&region_id).cloned()
    }

    fn get_store(&self, store_id: StoreId) -> Option<StoreInfo> {
        self.stores.read().get(&store_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_cluster() {
        let cluster = MemoryCluster::new();
        cluster.put_store(StoreInfo::new(1, "s1:20160"));
        cluster.put_region(RegionInfo::new(9, b"b".to_vec(), b"c".to_vec()));
        cluster.put_region(RegionInfo::new(3, b"a".to_vec(), b"b".to_vec()));

        let ids: Vec<_> = cluster.regions().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 9]);
        assert!(cluster.get_store(1).unwrap().is_up);
        assert!(cluster.set_store_up(1, false));
        assert!(!cluster.get_store(1).unwrap().is_up);
        assert!(!cluster.set_store_up(2, false));
        assert!(cluster.get_region(4).is_none());
    }

    #[test]
    fn test_topology_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"stores": [{{"id": 1, "address": "s1"}}, {{"id": 2, "address": "s2"}}],
                "regions": [{{"id": 5, "start_key": "62", "end_key": "63",
                              "leader": {{"id": 51, "store_id": 1}},
                              "peers": [{{"id": 51, "store_id": 1}},
                                        {{"id": 52, "store_id": 2}}]}}]}}"#
        )
        .unwrap();

        let topology = Topology::from_file(file.path()).unwrap();
        let cluster = MemoryCluster::from_topology(topology);
        assert_eq!(cluster.get_region(5).unwrap().leader_store_id(), Some(1));
        assert_eq!(cluster.get_store(2).unwrap().address, "s2");
    }

    #[test]
    fn test_topology_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Topology::from_file(file.path()),
            Err(TopologyError::Parse(_))
        ));
        assert!(matches!(
            Topology::from_file("/nonexistent/topology.json"),
            Err(TopologyError::Io(_))
        ));
    }
}
