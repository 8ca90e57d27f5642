//! Selection of the active network.
//!
//! A [`ChainRegistry`] owns the three prebuilt parameter sets and a
//! write-once selection. The selection starts out empty and can be set once;
//! after that every subsystem reads the same [`NetworkParams`] without
//! locking. Independent registries can be built for tests, while
//! [`global`] holds the instance shared by the whole process.

use std::sync::OnceLock;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::chain::{
    chainparams::{ChainParamsError, NetworkParams},
    consensus::DeploymentId,
    network::{Network, UnknownNetworkError},
};

/// Errors returned by the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The name does not match any network.
    #[error(transparent)]
    UnknownNetwork(#[from] UnknownNetworkError),
    /// A different network was selected earlier.
    #[error("Network {selected} is already selected, cannot select {requested}")]
    AlreadySelected {
        /// The network selected first
        selected: Network,
        /// The network asked for now
        requested: Network,
    },
    /// A built-in parameter set failed validation.
    #[error("Failed to build network parameters: {0}")]
    Params(#[from] ChainParamsError),
    /// [`global::install`] was called after the registry was set.
    #[error("A process-wide registry is already installed")]
    AlreadyInstalled,
}

/// All network parameter sets plus the process's network selection.
#[derive(Debug)]
pub struct ChainRegistry {
    mainnet: NetworkParams,
    testnet: NetworkParams,
    regtest: NetworkParams,
    selected: OnceLock<Network>,
}

impl ChainRegistry {
    /// Builds and validates the parameter sets of every network. No network
    /// is selected yet.
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            mainnet: NetworkParams::mainnet()?,
            testnet: NetworkParams::testnet()?,
            regtest: NetworkParams::regtest()?,
            selected: OnceLock::new(),
        })
    }

    /// Returns the parameters of `network`, regardless of the selection.
    pub fn get(&self, network: Network) -> &NetworkParams {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
            Network::Regtest => &self.regtest,
        }
    }

    /// Looks up a network's parameters by name without changing the selection.
    ///
    /// # Arguments
    ///
    /// * `name` - `"main"`, `"test"` or `"regtest"` (or `"mainnet"`,
    ///   `"testnet"`)
    pub fn lookup(&self, name: &str) -> Result<&NetworkParams, RegistryError> {
        let network = Network::try_from(name)?;
        Ok(self.get(network))
    }

    /// Selects the active network. The selection can only be made once;
    /// selecting the already selected network again succeeds.
    ///
    /// # Returns
    ///
    /// * `Ok(&NetworkParams)` - The parameters of the selected network
    /// * `Err(RegistryError::UnknownNetwork)` - If `name` is not a network;
    ///   the selection is left unchanged
    /// * `Err(RegistryError::AlreadySelected)` - If a different network was
    ///   selected before
    pub fn select_network(&self, name: &str) -> Result<&NetworkParams, RegistryError> {
        let requested = Network::try_from(name).inspect_err(|err| {
            warn!(network = name, "Rejected network selection: {err}");
        })?;

        let selected = *self.selected.get_or_init(|| {
            info!(network = %requested, "Selected network");
            requested
        });
        if selected != requested {
            warn!(%selected, %requested, "Network already selected");
            return Err(RegistryError::AlreadySelected {
                selected,
                requested,
            });
        }

        Ok(self.get(selected))
    }

    /// Returns the selected network, if any.
    pub fn selected(&self) -> Option<Network> {
        self.selected.get().copied()
    }

    /// Returns the parameters of the selected network.
    ///
    /// # Panics
    ///
    /// Panics if no network has been selected. Nothing may consult the
    /// active parameters before selection, so this is a sequencing bug.
    #[allow(clippy::panic, reason = "Reading parameters before selection is a bug")]
    pub fn active_params(&self) -> &NetworkParams {
        match self.selected.get() {
            Some(network) => self.get(*network),
            None => {
                error!("Network parameters requested before a network was selected");
                panic!("active_params called before select_network");
            }
        }
    }

    /// Replaces the signalling window of a regtest deployment.
    ///
    /// Requires exclusive access, so it can only run during setup, before the
    /// registry is shared with other threads.
    pub fn override_regtest_deployment(&mut self, id: DeploymentId, start_time: i64, timeout: i64) {
        info!(deployment = %id, start_time, timeout, "Overriding regtest deployment");
        self.regtest.set_deployment_window(id, start_time, timeout);
    }
}

/// The process-wide registry.
pub mod global {
    use std::sync::OnceLock;

    use tracing::error;

    use super::{ChainRegistry, RegistryError};
    use crate::chain::chainparams::NetworkParams;

    static REGISTRY: OnceLock<ChainRegistry> = OnceLock::new();

    /// Installs `registry` as the process-wide registry, typically after
    /// overriding regtest deployments. Must run before the first call to
    /// [`registry`].
    pub fn install(registry: ChainRegistry) -> Result<(), RegistryError> {
        REGISTRY
            .set(registry)
            .map_err(|_| RegistryError::AlreadyInstalled)
    }

    /// Returns the process-wide registry, building the default one on first
    /// use.
    ///
    /// # Panics
    ///
    /// Panics if the built-in parameters fail validation; the node must not
    /// start with corrupted constants.
    #[allow(clippy::panic, reason = "Corrupted constants must stop the process")]
    pub fn registry() -> &'static ChainRegistry {
        REGISTRY.get_or_init(|| match ChainRegistry::new() {
            Ok(registry) => registry,
            Err(err) => {
                error!("Invalid built-in network parameters: {err}");
                panic!("invalid built-in network parameters: {err}");
            }
        })
    }

    /// Selects the process-wide active network.
    pub fn select_network(name: &str) -> Result<&'static NetworkParams, RegistryError> {
        registry().select_network(name)
    }

    /// Returns the process-wide active parameters.
    ///
    /// # Panics
    ///
    /// Panics if no network has been selected.
    pub fn params() -> &'static NetworkParams {
        registry().active_params()
    }

    /// Looks up a network's parameters by name without changing the
    /// selection.
    pub fn params_for(name: &str) -> Result<&'static NetworkParams, RegistryError> {
        registry().lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::consensus::Deployment;

    #[test]
    fn test_new_registry_is_unselected() {
        let registry = ChainRegistry::new().unwrap();
        assert_eq!(registry.selected(), None);
        for network in Network::ALL {
            assert_eq!(registry.get(network).network(), network);
        }
    }

    #[test]
    #[should_panic(expected = "active_params called before select_network")]
    fn test_active_params_before_selection_panics() {
        let registry = ChainRegistry::new().unwrap();
        registry.active_params();
    }

    #[test]
    fn test_select_network() {
        let registry = ChainRegistry::new().unwrap();
        let params = registry.select_network("test").unwrap();
        assert_eq!(params.network(), Network::Testnet);
        assert_eq!(registry.selected(), Some(Network::Testnet));
        assert_eq!(registry.active_params().network(), Network::Testnet);

        // Same network again, including through an alias.
        assert!(registry.select_network("testnet").is_ok());

        assert!(matches!(
            registry.select_network("main"),
            Err(RegistryError::AlreadySelected {
                selected: Network::Testnet,
                requested: Network::Mainnet,
            })
        ));
        assert_eq!(registry.selected(), Some(Network::Testnet));
    }

    #[test]
    fn test_unknown_network_leaves_state_unchanged() {
        let registry = ChainRegistry::new().unwrap();
        let err = registry.select_network("bogus").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownNetwork(_)));
        assert_eq!(err.to_string(), "Unknown network: bogus");
        assert_eq!(registry.selected(), None);

        registry.select_network("regtest").unwrap();
        assert!(registry.select_network("bogus").is_err());
        assert_eq!(registry.selected(), Some(Network::Regtest));
    }

    #[test]
    fn test_lookup_ignores_selection() {
        let registry = ChainRegistry::new().unwrap();
        assert_eq!(registry.lookup("main").unwrap().default_port(), 16178);
        assert_eq!(registry.lookup("mainnet").unwrap().default_port(), 16178);
        assert_eq!(registry.selected(), None);

        registry.select_network("regtest").unwrap();
        assert_eq!(registry.lookup("test").unwrap().default_port(), 26178);
        assert!(matches!(
            registry.lookup("bogus"),
            Err(RegistryError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_override_regtest_deployment() {
        let mut registry = ChainRegistry::new().unwrap();
        let untouched_main = *registry.get(Network::Mainnet).consensus();
        let untouched_test = *registry.get(Network::Testnet).consensus();

        registry.override_regtest_deployment(DeploymentId::SegWit, 0, 999_999_999_999);
        registry.override_regtest_deployment(DeploymentId::Csv, 100, 200);

        let regtest = registry.get(Network::Regtest).consensus();
        assert_eq!(
            regtest.deployments[DeploymentId::SegWit],
            Deployment::new(1, 0, 999_999_999_999)
        );
        assert_eq!(
            regtest.deployments[DeploymentId::Csv],
            Deployment::new(0, 100, 200)
        );
        assert_eq!(*registry.get(Network::Mainnet).consensus(), untouched_main);
        assert_eq!(*registry.get(Network::Testnet).consensus(), untouched_test);
    }

    // The only test that touches the process-wide registry.
    #[test]
    fn test_global_registry() {
        let mut registry = ChainRegistry::new().unwrap();
        registry.override_regtest_deployment(DeploymentId::TestDummy, 10, 20);
        global::install(registry).unwrap();
        assert!(matches!(
            global::install(ChainRegistry::new().unwrap()),
            Err(RegistryError::AlreadyInstalled)
        ));

        assert_eq!(
            global::params_for("main").unwrap().network(),
            Network::Mainnet
        );
        assert_eq!(global::registry().selected(), None);

        let params = global::select_network("regtest").unwrap();
        assert_eq!(params.network(), Network::Regtest);
        let deployments = &global::params().consensus().deployments;
        assert_eq!(
            deployments[DeploymentId::TestDummy],
            Deployment::new(28, 10, 20)
        );
    }
}
