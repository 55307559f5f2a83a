mod block;
mod chain;
pub mod deployment;
pub mod format;
mod indexer;
mod packet;
mod rpc;

pub use block::*;
pub use chain::*;
pub use deployment::{DeploymentArtifact, HardhatArtifact, IgnitionDeployment};
pub use indexer::*;
pub use packet::*;
pub use rpc::*;
