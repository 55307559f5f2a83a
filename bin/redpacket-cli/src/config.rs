use std::str::FromStr;

use alloy::primitives::Address;
use redpacket_models::ChainInfo;
use serde::Serialize;
use snafu::{ensure, OptionExt, Snafu};

use crate::args::Args;

/// A configuration value the process reads from its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    EvmRpcUrl,
    RedPacketContract,
    LoggerContract,
    GraphUrl,
    PrivateKey,
}

impl Setting {
    pub fn env_var(self) -> &'static str {
        match self {
            Setting::EvmRpcUrl => "EVM_RPC_URL",
            Setting::RedPacketContract => "RED_PACKET_CONTRACT",
            Setting::LoggerContract => "LOGGER_CONTRACT",
            Setting::GraphUrl => "GRAPH_URL",
            Setting::PrivateKey => "PRIVATE_KEY",
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Missing configuration: set {}", setting.env_var()))]
    ConfigMissing { setting: Setting },

    #[snafu(display("{} is not a valid address: {value:?}", setting.env_var()))]
    InvalidContractAddress { setting: Setting, value: String },
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_level: String,
    pub chain_id: u64,
    evm_rpc_url: Option<String>,
    red_packet_contract: Option<Address>,
    logger_contract: Option<Address>,
    graph_url: Option<String>,
    walletconnect_project_id: Option<String>,
    private_key: Option<String>,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            log_level: args.log_level.clone(),
            chain_id: args.chain_id,
            evm_rpc_url: non_empty(&args.evm_rpc_url),
            red_packet_contract: parse_contract(
                Setting::RedPacketContract,
                &args.red_packet_contract,
            )?,
            logger_contract: parse_contract(Setting::LoggerContract, &args.logger_contract)?,
            graph_url: non_empty(&args.graph_url),
            walletconnect_project_id: non_empty(&args.walletconnect_project_id),
            private_key: non_empty(&args.private_key),
        })
    }

    /// Fails on the first required setting that is absent.
    pub fn require(&self, settings: &[Setting]) -> Result<()> {
        for &setting in settings {
            ensure!(self.is_set(setting), ConfigMissingSnafu { setting });
        }
        Ok(())
    }

    fn is_set(&self, setting: Setting) -> bool {
        match setting {
            Setting::EvmRpcUrl => self.evm_rpc_url.is_some(),
            Setting::RedPacketContract => self.red_packet_contract.is_some(),
            Setting::LoggerContract => self.logger_contract.is_some(),
            Setting::GraphUrl => self.graph_url.is_some(),
            Setting::PrivateKey => self.private_key.is_some(),
        }
    }

    pub fn evm_rpc_url(&self) -> Result<&str> {
        self.evm_rpc_url.as_deref().context(ConfigMissingSnafu {
            setting: Setting::EvmRpcUrl,
        })
    }

    pub fn red_packet_contract(&self) -> Result<Address> {
        self.red_packet_contract.context(ConfigMissingSnafu {
            setting: Setting::RedPacketContract,
        })
    }

    pub fn logger_contract(&self) -> Result<Address> {
        self.logger_contract.context(ConfigMissingSnafu {
            setting: Setting::LoggerContract,
        })
    }

    pub fn graph_url(&self) -> Result<&str> {
        self.graph_url.as_deref().context(ConfigMissingSnafu {
            setting: Setting::GraphUrl,
        })
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    pub fn chain(&self) -> Option<ChainInfo> {
        ChainInfo::by_id(self.chain_id)
    }

    /// What `config` prints. The private key is never shown.
    pub fn summary(&self) -> SettingsSummary {
        SettingsSummary {
            chain_id: self.chain_id,
            chain_name: self.chain().map(|chain| chain.name),
            evm_rpc_url: self.evm_rpc_url.clone(),
            red_packet_contract: self.red_packet_contract,
            logger_contract: self.logger_contract,
            graph_url: self.graph_url.clone(),
            walletconnect_project_id: self.walletconnect_project_id.clone(),
            private_key_set: self.private_key.is_some(),
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSummary {
    chain_id: u64,
    chain_name: Option<&'static str>,
    evm_rpc_url: Option<String>,
    red_packet_contract: Option<Address>,
    logger_contract: Option<Address>,
    graph_url: Option<String>,
    walletconnect_project_id: Option<String>,
    private_key_set: bool,
    log_level: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_contract(setting: Setting, value: &Option<String>) -> Result<Option<Address>> {
    non_empty(value)
        .map(|raw| {
            Address::from_str(&raw)
                .map_err(|_| ConfigError::InvalidContractAddress { setting, value: raw })
        })
        .transpose()
}
