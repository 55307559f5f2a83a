//! Documents exchanged between the deployment tooling and the client.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum DeploymentError {
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Malformed JSON in {}: {source}", path.display()))]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("No deployment found at {}. Please deploy first.", path.display()))]
    NotDeployed { path: PathBuf },

    #[snafu(display("{key} is missing from {}", path.display()))]
    MissingFutureId { key: String, path: PathBuf },
}

pub type Result<T, E = DeploymentError> = std::result::Result<T, E>;

/// Address and ABI of a deployed contract, written after every deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentArtifact {
    pub address: Address,
    pub abi: Vec<serde_json::Value>,
}

impl DeploymentArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Writes the artifact as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context(WriteSnafu { path: parent })?;
        }
        let json = serde_json::to_string_pretty(self).context(JsonSnafu { path })?;
        fs::write(path, json).context(WriteSnafu { path })
    }
}

/// The subset of a compiled contract artifact the tooling needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardhatArtifact {
    pub contract_name: String,
    pub abi: Vec<serde_json::Value>,
    #[serde(default)]
    pub bytecode: Bytes,
}

impl HardhatArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }
}

/// Locates one contract inside an ignition deployment directory.
#[derive(Debug, Clone)]
pub struct IgnitionDeployment {
    pub root: PathBuf,
    pub chain_id: u64,
    pub module: String,
    pub contract: String,
}

impl IgnitionDeployment {
    /// `<root>/deployments/chain-<id>`
    pub fn chain_dir(&self) -> PathBuf {
        self.root
            .join("deployments")
            .join(format!("chain-{}", self.chain_id))
    }

    /// Key under which ignition records the contract, e.g. `RedPacket#RedPacket`.
    pub fn future_id(&self) -> String {
        format!("{}#{}", self.module, self.contract)
    }

    pub fn deployed_addresses_path(&self) -> PathBuf {
        self.chain_dir().join("deployed_addresses.json")
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.chain_dir()
            .join("artifacts")
            .join(format!("{}.json", self.future_id()))
    }

    /// Reads the deployed address and ABI and writes `<out_dir>/<Contract>.json`.
    pub fn export(&self, out_dir: impl AsRef<Path>) -> Result<(DeploymentArtifact, PathBuf)> {
        let addresses_path = self.deployed_addresses_path();
        snafu::ensure!(
            addresses_path.exists(),
            NotDeployedSnafu {
                path: addresses_path.clone()
            }
        );

        let addresses: std::collections::HashMap<String, Address> = read_json(&addresses_path)?;
        let key = self.future_id();
        let address = *addresses.get(&key).ok_or_else(|| DeploymentError::MissingFutureId {
            key: key.clone(),
            path: addresses_path.clone(),
        })?;
        let compiled = HardhatArtifact::load(self.artifact_path())?;

        let artifact = DeploymentArtifact {
            address,
            abi: compiled.abi,
        };
        let out_path = out_dir.as_ref().join(format!("{}.json", self.contract));
        artifact.save(&out_path)?;

        Ok((artifact, out_path))
    }
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).context(ReadSnafu { path })?;
    serde_json::from_str(&raw).context(JsonSnafu { path })
}
