use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Soft forks deployed through version-bits signalling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeploymentId {
    /// Dummy deployment used to exercise the signalling machinery.
    TestDummy,
    /// Relative lock-time (BIP68, BIP112 and BIP113).
    Csv,
    /// Segregated witness (BIP141, BIP143 and BIP147).
    SegWit,
}

impl DeploymentId {
    /// Every deployment, in declaration order.
    pub const ALL: [DeploymentId; 3] = [
        DeploymentId::TestDummy,
        DeploymentId::Csv,
        DeploymentId::SegWit,
    ];

    /// Returns the deployment name as used by RPC and logs.
    pub fn name(&self) -> &'static str {
        match self {
            DeploymentId::TestDummy => "testdummy",
            DeploymentId::Csv => "csv",
            DeploymentId::SegWit => "segwit",
        }
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A version-bits signalling window for one soft fork.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Bit position in the block version used to signal readiness.
    pub bit: u8,
    /// Median time past at which signalling may begin.
    pub start_time: i64,
    /// Median time past after which the deployment is abandoned if not locked
    /// in.
    pub timeout: i64,
}

impl Deployment {
    /// Highest bit usable for signalling; the top three bits of the version
    /// are reserved.
    pub const MAX_BIT: u8 = 28;

    /// Timeout used by test networks for windows that never expire.
    pub const NO_TIMEOUT: i64 = 999_999_999_999;

    /// Creates a deployment window.
    pub const fn new(bit: u8, start_time: i64, timeout: i64) -> Self {
        Self {
            bit,
            start_time,
            timeout,
        }
    }

    /// Block version mask that signals this deployment, or `None` when the
    /// bit is outside the signalling range.
    pub fn mask(&self) -> Option<u32> {
        if self.bit > Self::MAX_BIT {
            return None;
        }
        1u32.checked_shl(u32::from(self.bit))
    }

    /// Returns true if `median_time_past` falls inside `[start_time, timeout)`.
    pub fn is_within_window(&self, median_time_past: i64) -> bool {
        median_time_past >= self.start_time && median_time_past < self.timeout
    }
}

/// The full set of deployments of a network, one per [`DeploymentId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployments {
    test_dummy: Deployment,
    csv: Deployment,
    segwit: Deployment,
}

impl Deployments {
    /// Creates the deployment set.
    pub const fn new(test_dummy: Deployment, csv: Deployment, segwit: Deployment) -> Self {
        Self {
            test_dummy,
            csv,
            segwit,
        }
    }

    /// Returns the window of a deployment.
    pub fn get(&self, id: DeploymentId) -> &Deployment {
        match id {
            DeploymentId::TestDummy => &self.test_dummy,
            DeploymentId::Csv => &self.csv,
            DeploymentId::SegWit => &self.segwit,
        }
    }

    pub(crate) fn get_mut(&mut self, id: DeploymentId) -> &mut Deployment {
        match id {
            DeploymentId::TestDummy => &mut self.test_dummy,
            DeploymentId::Csv => &mut self.csv,
            DeploymentId::SegWit => &mut self.segwit,
        }
    }

    /// Iterates over all deployments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (DeploymentId, &Deployment)> {
        DeploymentId::ALL.into_iter().map(|id| (id, self.get(id)))
    }

    /// Finds the deployment signalled by `bit`, if any.
    pub fn find_by_bit(&self, bit: u8) -> Option<DeploymentId> {
        self.iter()
            .find(|(_, deployment)| deployment.bit == bit)
            .map(|(id, _)| id)
    }

    /// Returns true if no two deployments share a signalling bit.
    pub fn bits_are_unique(&self) -> bool {
        let mut seen = 0u32;
        for (_, deployment) in self.iter() {
            let Some(mask) = deployment.mask() else {
                return false;
            };
            if seen & mask != 0 {
                return false;
            }
            seen |= mask;
        }
        true
    }
}

impl Index<DeploymentId> for Deployments {
    type Output = Deployment;

    fn index(&self, id: DeploymentId) -> &Self::Output {
        self.get(id)
    }
}
