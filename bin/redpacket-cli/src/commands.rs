use std::sync::Arc;

use alloy::{
    primitives::{Address, U256},
    providers::{DynProvider, Provider},
};
use blockchain_utils::{
    create_http_provider, create_wallet_provider, handle_background_thread_result,
    shutdown_signal,
};
use graph_client::GraphClient;
use redpacket_app::{
    ActionOutcome, BalanceCache, BalancePoller, PageController, Submission,
};
use redpacket_chains::{
    classify_rpc_error, deploy, EvmRedPacketService, LoggerClient, RedPacketService,
    RpcQueryClient,
};
use redpacket_models::{
    format, CreatePacketForm, DataWrittenRecord, HardhatArtifact, IgnitionDeployment,
    PacketDetail,
};
use serde::Serialize;
use snafu::ResultExt;
use tokio::task::JoinSet;
use tracing::info;

use crate::args::Command;
use crate::config::{ConfigError, Setting, Settings};
use crate::{
    ActionFailedSnafu, BackgroundSnafu, ChainSnafu, CliError, ConfigSnafu, DeploymentSnafu,
    GraphSnafu, ProviderSnafu, RenderSnafu,
};

type Result<T, E = CliError> = std::result::Result<T, E>;

pub async fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Config => print_json(&settings.summary()),
        Command::Wallet => show_wallet(settings).await,
        Command::Balance { address } => {
            let client = RpcQueryClient::new(read_provider(settings)?);
            let response = client.get_balance(&address).await;
            print_json(&response)?;
            if let Some(wei) = response.data.as_deref().and_then(|wei| wei.parse::<U256>().ok()) {
                println!("{} ETH", ether(wei));
            }
            Ok(())
        }
        Command::Block { number } => {
            let client = RpcQueryClient::new(read_provider(settings)?);
            print_json(&client.get_block(number).await)
        }
        Command::Create {
            shares,
            equal,
            amount,
        } => {
            let controller = PageController::new(red_packet_service(settings)?);
            let form = CreatePacketForm {
                total_shares: shares,
                is_equal: equal,
                amount,
            };
            report(controller.create(&form).await)
        }
        Command::Grab { id } => {
            let controller = PageController::new(red_packet_service(settings)?);
            report(controller.grab(id).await)?;
            if let Some(balance) = controller.state().balance {
                println!("Balance: {} ETH", balance.display());
            }
            Ok(())
        }
        Command::Check { id } => {
            let controller = PageController::new(red_packet_service(settings)?);
            report(controller.check(id).await)?;
            if let Some(detail) = controller.state().detail {
                print_packet(&detail, controller.account());
            }
            Ok(())
        }
        Command::List => {
            let service = red_packet_service(settings)?;
            let packets = service.list_packets().await.context(ChainSnafu)?;
            if packets.is_empty() {
                println!("No red packets yet");
            }
            for packet in &packets {
                print_packet(packet, service.account());
            }
            Ok(())
        }
        Command::Events => show_events(settings).await,
        Command::WriteLog { value, note } => {
            let (provider, account) = wallet_provider(settings)?;
            let logger = LoggerClient::new(
                provider,
                settings.logger_contract().context(ConfigSnafu)?,
                Some(account),
            );
            let entries = logger
                .write_data(U256::from(value), &note)
                .await
                .context(ChainSnafu)?;
            print_json(&entries)
        }
        Command::Deploy { artifact, out_dir } => {
            let artifact = HardhatArtifact::load(&artifact).context(DeploymentSnafu)?;
            let (provider, account) = wallet_provider(settings)?;
            let (exported, path) = deploy::deploy_and_export(&provider, &artifact, account, out_dir)
                .await
                .context(ChainSnafu)?;
            println!("{} deployed at {}", artifact.contract_name, exported.address);
            println!("Artifact written to {}", path.display());
            Ok(())
        }
        Command::ExportDeployment {
            ignition_root,
            module,
            contract,
            out_dir,
        } => {
            let deployment = IgnitionDeployment {
                root: ignition_root,
                chain_id: settings.chain_id,
                module,
                contract,
            };
            let (exported, path) = deployment.export(out_dir).context(DeploymentSnafu)?;
            println!("{} at {}", deployment.future_id(), exported.address);
            println!("Artifact written to {}", path.display());
            Ok(())
        }
        Command::WatchBalance => watch_balance(settings).await,
    }
}

fn read_provider(settings: &Settings) -> Result<DynProvider> {
    create_http_provider(settings.evm_rpc_url().context(ConfigSnafu)?).context(ProviderSnafu)
}

fn wallet_provider(settings: &Settings) -> Result<(DynProvider, Address)> {
    let rpc_url = settings.evm_rpc_url().context(ConfigSnafu)?;
    let private_key = settings.private_key().ok_or_else(missing_private_key)?;
    create_wallet_provider(rpc_url, private_key).context(ProviderSnafu)
}

fn missing_private_key() -> CliError {
    CliError::Config {
        source: ConfigError::ConfigMissing {
            setting: Setting::PrivateKey,
        },
    }
}

/// Signs with the configured key when there is one, read-only otherwise.
fn red_packet_service(settings: &Settings) -> Result<Arc<EvmRedPacketService>> {
    let contract = settings.red_packet_contract().context(ConfigSnafu)?;
    let (provider, account) = match settings.private_key() {
        Some(_) => {
            let (provider, account) = wallet_provider(settings)?;
            (provider, Some(account))
        }
        None => (read_provider(settings)?, None),
    };
    Ok(Arc::new(EvmRedPacketService::new(provider, contract, account)))
}

async fn show_wallet(settings: &Settings) -> Result<()> {
    let (provider, account) = wallet_provider(settings)?;
    let balance = provider
        .get_balance(account)
        .await
        .map_err(|e| classify_rpc_error(e, None))
        .context(ChainSnafu)?;

    let address = account.to_string();
    println!("Account:  {} ({address})", format::truncate_address(&address));
    match settings.chain() {
        Some(chain) => {
            println!("Network:  {} ({})", chain.name, chain.id);
            println!("Explorer: {}", chain.explorer_address_url(&address));
        }
        None => println!("Network:  chain {}", settings.chain_id),
    }
    println!("Balance:  {} ETH", format::format_balance(balance));
    Ok(())
}

async fn show_events(settings: &Settings) -> Result<()> {
    let client = GraphClient::new(settings.graph_url().context(ConfigSnafu)?).context(GraphSnafu)?;
    let records = client.recent_data_writtens().await.context(GraphSnafu)?;
    if records.is_empty() {
        println!("No logger entries indexed yet");
    }
    for record in &records {
        println!("{}", event_line(record));
    }
    Ok(())
}

fn event_line(record: &DataWrittenRecord) -> String {
    let time = record
        .block_timestamp
        .parse::<u64>()
        .map(format::format_timestamp)
        .unwrap_or_else(|_| record.block_timestamp.clone());
    format!(
        "{time}  {}  value={}  {}",
        format::truncate_address(&record.sender),
        record.value,
        record.note
    )
}

async fn watch_balance(settings: &Settings) -> Result<()> {
    let service = red_packet_service(settings)?;
    let Some(account) = service.account() else {
        return Err(missing_private_key());
    };

    let controller = PageController::new(service.clone());
    let cache = Arc::new(BalanceCache::new(service));
    let mut join_set = JoinSet::new();
    BalancePoller::new(cache, controller.clone(), account).spawn(&mut join_set);
    info!("Watching balance of {account}");

    let mut rx = controller.subscribe();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(balance) = rx.borrow_and_update().balance {
                    println!("{} ETH", balance.display());
                }
            }
            res = join_set.join_next() => {
                if let Err(e) = handle_background_thread_result(res) {
                    return BackgroundSnafu { message: e.to_string() }.fail();
                }
            }
        }
    }

    join_set.abort_all();
    Ok(())
}

fn report(submission: Submission) -> Result<()> {
    match submission {
        Submission::Completed(ActionOutcome::Succeeded { message }) => {
            println!("{message}");
            Ok(())
        }
        Submission::Completed(ActionOutcome::Failed { message, .. }) => {
            ActionFailedSnafu { message }.fail()
        }
        Submission::Ignored => {
            println!("Action already pending");
            Ok(())
        }
    }
}

fn print_packet(packet: &PacketDetail, account: Option<Address>) {
    let sender = packet.sender().to_string();
    let status = if packet.is_exhausted() {
        "exhausted"
    } else if packet.can_grab(account) {
        "available"
    } else {
        "available (connect a wallet to grab)"
    };

    println!("Red packet #{}", packet.id());
    println!("  Sender:       {}", format::truncate_address(&sender));
    println!("  Distribution: {}", packet.distribution().label());
    println!("  Total:        {} ETH", ether(packet.total_amount()));
    println!("  Remaining:    {} ETH", ether(packet.remaining_amount()));
    println!(
        "  Shares:       {} / {} claimed ({:.1}%)",
        packet.claimed_shares(),
        packet.total_shares(),
        packet.progress_percent()
    );
    println!("  Status:       {status}");
}

fn ether(wei: U256) -> String {
    format::format_ether(wei).unwrap_or_else(|_| wei.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context(RenderSnafu)?;
    println!("{json}");
    Ok(())
}
