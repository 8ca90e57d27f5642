mod deployment;
mod params;

pub use deployment::{Deployment, DeploymentId, Deployments};
pub use params::ConsensusParams;
