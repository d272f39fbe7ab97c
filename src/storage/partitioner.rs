use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps file ids onto a fixed number of shards so writers to different files
/// rarely contend on the same map.
#[derive(Debug, Clone)]
pub struct PartitionManager {
    num_partitions: u32,
}

impl PartitionManager {
    pub fn new(num_partitions: u32) -> Self {
        Self {
            num_partitions: num_partitions.max(1),
        }
    }

    pub fn num_partitions(&self) -> u32 {
        self.num_partitions
    }

    pub fn get_partition(&self, key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let hash = hasher.finish() as u32;
        hash % self.num_partitions
    }

    pub fn all_partitions(&self) -> impl Iterator<Item = u32> {
        0..self.num_partitions
    }
}
