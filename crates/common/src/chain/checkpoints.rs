use std::collections::BTreeMap;

use bitcoin::BlockHash;
use thiserror::Error;

/// Errors raised while building a checkpoint table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckpointError {
    /// Heights are not strictly increasing.
    #[error("Checkpoint at height {height} does not follow height {previous}")]
    NotIncreasing {
        /// Height of the preceding entry
        previous: u32,
        /// Height of the offending entry
        height: u32,
    },
    /// No checkpoints were given.
    #[error("Checkpoint table is empty")]
    Empty,
}

/// Hard-coded (height, hash) anchors; alternate histories below the last
/// anchor are rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Checkpoints(BTreeMap<u32, BlockHash>);

impl Checkpoints {
    /// Builds a table from a list ordered by strictly increasing height.
    pub fn from_ordered(
        entries: impl IntoIterator<Item = (u32, BlockHash)>,
    ) -> Result<Self, CheckpointError> {
        let mut map = BTreeMap::new();
        let mut previous: Option<u32> = None;
        for (height, hash) in entries {
            if let Some(previous) = previous.filter(|previous| height <= *previous) {
                return Err(CheckpointError::NotIncreasing { previous, height });
            }
            previous = Some(height);
            map.insert(height, hash);
        }
        if map.is_empty() {
            return Err(CheckpointError::Empty);
        }
        Ok(Self(map))
    }

    /// Returns the checkpointed hash at `height`, if any.
    pub fn get(&self, height: u32) -> Option<&BlockHash> {
        self.0.get(&height)
    }

    /// Returns the highest checkpoint.
    pub fn last(&self) -> Option<(u32, &BlockHash)> {
        let (height, hash) = self.0.last_key_value()?;
        Some((*height, hash))
    }

    /// Iterates over the checkpoints in increasing height order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BlockHash)> {
        self.0.iter().map(|(height, hash)| (*height, hash))
    }

    /// Number of checkpoints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table holds no checkpoints.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns false only when a checkpoint exists at `height` and its hash
    /// differs from `hash`.
    pub fn verify(&self, height: u32, hash: &BlockHash) -> bool {
        self.get(height).is_none_or(|expected| expected == hash)
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::hashes::Hash;

    use super::*;

    fn hash(byte: u8) -> BlockHash {
        BlockHash::from_byte_array([byte; 32])
    }

    #[test]
    fn test_from_ordered() {
        let entries = [(0, hash(0)), (1, hash(1)), (16, hash(16))];
        let checkpoints = Checkpoints::from_ordered(entries).unwrap();
        assert_eq!(checkpoints.len(), 3);
        assert_eq!(checkpoints.get(16), Some(&hash(16)));
        assert_eq!(checkpoints.get(2), None);
        assert_eq!(checkpoints.last(), Some((16, &hash(16))));
        let heights: Vec<u32> = checkpoints.iter().map(|(height, _)| height).collect();
        assert_eq!(heights, vec![0, 1, 16]);
    }

    #[test]
    fn test_rejects_out_of_order() {
        assert_eq!(
            Checkpoints::from_ordered([(0, hash(0)), (16, hash(16)), (1, hash(1))]),
            Err(CheckpointError::NotIncreasing {
                previous: 16,
                height: 1
            })
        );
        assert_eq!(
            Checkpoints::from_ordered([(0, hash(0)), (0, hash(1))]),
            Err(CheckpointError::NotIncreasing {
                previous: 0,
                height: 0
            })
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            Checkpoints::from_ordered(std::iter::empty()),
            Err(CheckpointError::Empty)
        );
    }

    #[test]
    fn test_verify() {
        let entries = [(0, hash(0)), (10, hash(10))];
        let checkpoints = Checkpoints::from_ordered(entries).unwrap();
        assert!(checkpoints.verify(10, &hash(10)));
        assert!(!checkpoints.verify(10, &hash(11)));
        // Heights without a checkpoint accept any hash.
        assert!(checkpoints.verify(5, &hash(99)));
    }
}
