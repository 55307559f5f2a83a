use std::path::PathBuf;

use clap::{Parser, Subcommand};
use redpacket_models::{CreatePacketForm, PacketId};

use crate::config::Setting;

#[derive(Parser, Debug, Clone)]
#[command(name = "redpacket")]
#[command(about = "Create, grab and inspect on-chain red packets")]
pub struct Args {
    /// Path to .env file to load environment variables from
    #[arg(long, env = "ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Global log level (e.g. trace, debug, info)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// JSON-RPC endpoint of the EVM node
    #[arg(long, env = "EVM_RPC_URL")]
    pub evm_rpc_url: Option<String>,

    /// Address of the deployed RedPacket contract
    #[arg(long, env = "RED_PACKET_CONTRACT")]
    pub red_packet_contract: Option<String>,

    /// Address of the deployed Logger contract
    #[arg(long, env = "LOGGER_CONTRACT")]
    pub logger_contract: Option<String>,

    /// GraphQL endpoint of the indexing service
    #[arg(long, env = "GRAPH_URL")]
    pub graph_url: Option<String>,

    /// WalletConnect project identifier
    #[arg(long, env = "WALLETCONNECT_PROJECT_ID")]
    pub walletconnect_project_id: Option<String>,

    /// Hex private key of the signing account
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Chain the node serves
    #[arg(long, env = "CHAIN_ID", default_value = "11155111")]
    pub chain_id: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the resolved configuration
    Config,
    /// Show the signing account, its network and balance
    Wallet,
    /// Query the ether balance of an address
    Balance { address: String },
    /// Query a block by number
    Block { number: u64 },
    /// Create a red packet
    Create {
        /// Number of shares the packet splits into
        #[arg(long, default_value_t = CreatePacketForm::default().total_shares)]
        shares: String,

        /// Split the amount equally instead of randomly
        #[arg(long)]
        equal: bool,

        /// Total amount in ether
        #[arg(long, default_value_t = CreatePacketForm::default().amount)]
        amount: String,
    },
    /// Claim one share of a red packet
    Grab { id: PacketId },
    /// Show the details of a red packet
    Check { id: PacketId },
    /// List every red packet, newest first
    List,
    /// Show the most recent Logger entries from the indexer
    Events,
    /// Write a value and note to the Logger contract
    WriteLog {
        #[arg(long)]
        value: u64,

        #[arg(long)]
        note: String,
    },
    /// Deploy a compiled contract artifact and export its address and ABI
    Deploy {
        /// Path to the compiled contract artifact JSON
        #[arg(long)]
        artifact: PathBuf,

        #[arg(long, default_value = "deployments")]
        out_dir: PathBuf,
    },
    /// Export an ignition deployment as `{address, abi}`
    ExportDeployment {
        /// Ignition directory; deployments live under `deployments/chain-<id>`
        #[arg(long, default_value = "ignition")]
        ignition_root: PathBuf,

        /// Ignition module id, the first half of `<module>#<contract>`
        #[arg(long, default_value = "Logger")]
        module: String,

        #[arg(long, default_value = "Logger")]
        contract: String,

        #[arg(long, default_value = "deployments")]
        out_dir: PathBuf,
    },
    /// Poll the signing account's balance until interrupted
    WatchBalance,
}

impl Command {
    /// Settings that must be present before the command makes any request.
    pub fn requirements(&self) -> &'static [Setting] {
        use Setting::*;
        match self {
            Command::Config | Command::ExportDeployment { .. } => &[],
            Command::Balance { .. } | Command::Block { .. } => &[EvmRpcUrl],
            Command::Wallet | Command::Deploy { .. } => &[EvmRpcUrl, PrivateKey],
            Command::Check { .. } | Command::List => &[EvmRpcUrl, RedPacketContract],
            Command::Create { .. } | Command::Grab { .. } | Command::WatchBalance => {
                &[EvmRpcUrl, RedPacketContract, PrivateKey]
            }
            Command::Events => &[GraphUrl],
            Command::WriteLog { .. } => &[EvmRpcUrl, LoggerContract, PrivateKey],
        }
    }
}
