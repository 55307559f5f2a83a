use crate::contracts::RedPacket::{self, RedPacketInstance};
use crate::error::{classify_contract_error, classify_rpc_error, PendingTransactionSnafu};
use crate::traits::{CreatedPacket, RedPacketService};
use crate::{Error, Result};
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use redpacket_models::{format, CreatePacketRequest, PacketDetail, PacketId, PacketRecord};
use snafu::{ensure, ResultExt};
use tracing::{debug, info, warn};

/// Packet reads in flight at once while listing.
const LIST_CONCURRENCY: usize = 8;

pub struct EvmRedPacketService {
    provider: DynProvider,
    contract: RedPacketInstance<DynProvider>,
    account: Option<Address>,
}

impl EvmRedPacketService {
    /// `account` is the address the provider's wallet signs for; pass `None`
    /// for a read-only service.
    pub fn new(provider: DynProvider, contract_address: Address, account: Option<Address>) -> Self {
        let contract = RedPacket::new(contract_address, provider.clone());
        Self {
            provider,
            contract,
            account,
        }
    }

    pub fn contract_address(&self) -> Address {
        *self.contract.address()
    }

    fn signer(&self) -> Result<Address> {
        self.account.ok_or(Error::WalletNotConnected)
    }

    /// Fails with `InsufficientFunds` when the signer cannot cover `value` plus
    /// the estimated fee of a transaction using `gas` units.
    async fn ensure_affordable(&self, signer: Address, value: U256, gas: u64) -> Result<()> {
        let balance = self
            .provider
            .get_balance(signer)
            .await
            .map_err(|e| classify_rpc_error(e, None))?;
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| classify_rpc_error(e, None))?;

        let fee = U256::from(gas) * U256::from(gas_price);
        let required = value.saturating_add(fee);
        ensure!(
            balance >= required,
            crate::error::InsufficientFundsSnafu {
                message: format!(
                    "required {} ETH (value plus estimated fee), available {} ETH",
                    format::format_ether(required).unwrap_or_else(|_| required.to_string()),
                    format::format_ether(balance).unwrap_or_else(|_| balance.to_string()),
                ),
            }
        );
        Ok(())
    }

    async fn read_packet(&self, id: PacketId) -> Result<PacketDetail> {
        let packet = self
            .contract
            .getPacket(U256::from(id))
            .call()
            .await
            .map_err(|e| classify_contract_error(e, Some(id)))?;

        let record = PacketRecord {
            id,
            sender: packet.sender,
            total_amount: packet.totalAmount,
            remaining_amount: packet.remainingAmount,
            total_shares: packet.totalShares,
            remaining_shares: packet.remainingShares,
            is_equal: packet.isEqual,
        };
        Ok(PacketDetail::try_from_record(record)?)
    }
}

#[async_trait]
impl RedPacketService for EvmRedPacketService {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn submit_create(&self, request: CreatePacketRequest) -> Result<CreatedPacket> {
        let signer = self.signer()?;
        let call = self
            .contract
            .createPacket(
                U256::from(request.total_shares),
                request.distribution.is_equal(),
            )
            .from(signer)
            .value(request.amount_wei);

        let gas = call
            .estimate_gas()
            .await
            .map_err(|e| classify_contract_error(e, None))?;
        self.ensure_affordable(signer, request.amount_wei, gas).await?;

        info!(
            "Creating red packet: {} shares, {:?}, {} wei",
            request.total_shares, request.distribution, request.amount_wei
        );

        let receipt = call
            .send()
            .await
            .map_err(|e| classify_contract_error(e, None))?
            .get_receipt()
            .await
            .context(PendingTransactionSnafu)?;

        let tx_hash = receipt.transaction_hash;
        ensure!(
            receipt.status(),
            crate::error::RevertedSnafu {
                action: "create a red packet",
                tx_hash
            }
        );

        let id = created_packet_id(&receipt);
        info!("Red packet created in {tx_hash} with id {id:?}");

        Ok(CreatedPacket { tx_hash, id })
    }

    async fn grab_packet(&self, id: PacketId) -> Result<TxHash> {
        let signer = self.signer()?;
        let call = self.contract.grabPacket(U256::from(id)).from(signer);

        // Estimation reverts on an exhausted packet before anything is signed.
        let gas = call
            .estimate_gas()
            .await
            .map_err(|e| classify_contract_error(e, Some(id)))?;
        self.ensure_affordable(signer, U256::ZERO, gas).await?;

        info!("Grabbing red packet {id}");

        let receipt = call
            .send()
            .await
            .map_err(|e| classify_contract_error(e, Some(id)))?
            .get_receipt()
            .await
            .context(PendingTransactionSnafu)?;

        // A claim can still lose the race for the last share once mined.
        ensure!(receipt.status(), crate::error::PacketExhaustedSnafu { id });

        info!("Grabbed red packet {id} in {}", receipt.transaction_hash);
        Ok(receipt.transaction_hash)
    }

    async fn check_packet(&self, id: PacketId) -> Result<PacketDetail> {
        debug!("Checking red packet {id}");
        self.read_packet(id).await
    }

    async fn list_packets(&self) -> Result<Vec<PacketDetail>> {
        let count = self
            .contract
            .packetCount()
            .call()
            .await
            .map_err(|e| classify_contract_error(e, None))?;
        let count: u64 = count.saturating_to();

        debug!("Listing {count} red packets");

        let reads: Vec<Result<PacketDetail>> = stream::iter((0..count).rev())
            .map(|id| self.read_packet(id))
            .buffered(LIST_CONCURRENCY)
            .collect()
            .await;

        let mut packets = Vec::with_capacity(reads.len());
        for read in reads {
            match read {
                Ok(packet) => packets.push(packet),
                Err(Error::MalformedResponse { source }) => {
                    warn!("Skipping red packet: {source}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(packets)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| classify_rpc_error(e, None))
    }
}

fn created_packet_id(receipt: &TransactionReceipt) -> Option<PacketId> {
    receipt
        .logs()
        .iter()
        .filter_map(|log| log.log_decode::<RedPacket::PacketCreated>().ok())
        .map(|log| log.inner.data.id.saturating_to())
        .next()
}
